use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ResetTokenConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub base_url: String,
    pub reset: ResetTokenConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let reset = ResetTokenConfig {
            secret: std::env::var("SECRET_KEY")?,
            issuer: std::env::var("RESET_TOKEN_ISSUER").unwrap_or_else(|_| "gatehouse".into()),
            ttl_secs: std::env::var("RESET_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1800),
        };
        let username = std::env::var("MAIL_USERNAME")?;
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".into()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            password: std::env::var("MAIL_PASSWORD")?,
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| username.clone()),
            username,
        };
        Ok(Self {
            database_url,
            base_url,
            reset,
            mail,
        })
    }
}
