use serde::Deserialize;

/// Form body for registration.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Form body for login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Form body for requesting a reset link.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Form body for submitting a new password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

#[cfg(test)]
mod dto_tests {
    use super::*;

    #[test]
    fn signup_form_deserializes_all_fields() {
        let form: SignupForm = serde_json::from_value(serde_json::json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "p1",
            "confirm_password": "p1",
        }))
        .unwrap();
        assert_eq!(form.full_name, "Ada Lovelace");
        assert_eq!(form.email, "ada@example.com");
        assert_eq!(form.password, form.confirm_password);
    }
}
