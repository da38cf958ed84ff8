//! Server-rendered pages. Plain functions returning markup; every page goes
//! through [`layout`], which also renders the pending flash messages.

use crate::auth::session::Flash;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn flash_block(flashes: &[Flash]) -> String {
    if flashes.is_empty() {
        return String::new();
    }
    let items: String = flashes
        .iter()
        .map(|f| {
            format!(
                "<li class=\"flash {}\">{}</li>",
                f.level.css_class(),
                escape(&f.text)
            )
        })
        .collect();
    format!("<ul class=\"flashes\">{items}</ul>")
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{flashes}{body}\n</body>\n\
         </html>\n",
        title = escape(title),
        flashes = flash_block(flashes),
        body = body,
    )
}

pub fn home(flashes: &[Flash]) -> String {
    layout(
        "Home",
        flashes,
        "<h1>Welcome</h1>\n\
         <nav>\n\
         <a href=\"/signup\">Sign up</a>\n\
         <a href=\"/login\">Log in</a>\n\
         <a href=\"/dashboard\">Dashboard</a>\n\
         </nav>",
    )
}

pub fn signup(flashes: &[Flash]) -> String {
    layout(
        "Sign up",
        flashes,
        "<h1>Sign up</h1>\n\
         <form method=\"post\" action=\"/signup\">\n\
         <label>Full name <input type=\"text\" name=\"full_name\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <label>Confirm password <input type=\"password\" name=\"confirm_password\" required></label>\n\
         <button type=\"submit\">Sign up</button>\n\
         </form>\n\
         <p><a href=\"/login\">Already have an account? Log in</a></p>",
    )
}

pub fn login(flashes: &[Flash]) -> String {
    layout(
        "Log in",
        flashes,
        "<h1>Log in</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n\
         </form>\n\
         <p><a href=\"/forgot_password\">Forgot password?</a></p>\n\
         <p><a href=\"/signup\">Need an account? Sign up</a></p>",
    )
}

pub fn dashboard(flashes: &[Flash], user_name: &str) -> String {
    let body = format!(
        "<h1>Dashboard</h1>\n\
         <p>Hello, {}!</p>\n\
         <p><a href=\"/logout\">Log out</a></p>",
        escape(user_name)
    );
    layout("Dashboard", flashes, &body)
}

pub fn forgot_password(flashes: &[Flash]) -> String {
    layout(
        "Forgot password",
        flashes,
        "<h1>Forgot password</h1>\n\
         <form method=\"post\" action=\"/forgot_password\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <button type=\"submit\">Send reset link</button>\n\
         </form>\n\
         <p><a href=\"/login\">Back to login</a></p>",
    )
}

pub fn reset_password(flashes: &[Flash], token: &str) -> String {
    let body = format!(
        "<h1>Reset password</h1>\n\
         <form method=\"post\" action=\"/reset_password/{}\">\n\
         <label>New password <input type=\"password\" name=\"password\" required></label>\n\
         <label>Confirm password <input type=\"password\" name=\"confirm_password\" required></label>\n\
         <button type=\"submit\">Reset password</button>\n\
         </form>",
        escape(token)
    );
    layout("Reset password", flashes, &body)
}

#[cfg(test)]
mod view_tests {
    use super::*;
    use crate::auth::session::Flash;

    #[test]
    fn dashboard_echoes_user_name() {
        let html = dashboard(&[], "Ada Lovelace");
        assert!(html.contains("Hello, Ada Lovelace!"));
    }

    #[test]
    fn user_supplied_text_is_escaped() {
        let html = dashboard(&[], "<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn flashes_are_rendered_with_level_class() {
        let flashes = vec![Flash::danger("Invalid email or password!")];
        let html = login(&flashes);
        assert!(html.contains("class=\"flash danger\""));
        assert!(html.contains("Invalid email or password!"));
    }

    #[test]
    fn pages_without_flashes_have_no_flash_list() {
        assert!(!home(&[]).contains("class=\"flashes\""));
    }

    #[test]
    fn reset_form_posts_back_to_the_same_token() {
        let html = reset_password(&[], "abc.def.ghi");
        assert!(html.contains("action=\"/reset_password/abc.def.ghi\""));
    }
}
