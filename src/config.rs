use std::env;

/// All runtime configuration comes from environment variables; there is no
/// config file layer. Defaults are for local development only.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub admin_password: String,
    pub stripe_secret_key: String,
    pub resend_api_key: Option<String>,
    pub from_email: String,
    pub notification_email: String,
    pub domain: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "ws://localhost:8050".to_string()),
            db_username: env::var("DATABASE_USER").ok(),
            db_password: env::var("DATABASE_PASS").ok(),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            from_email: env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "hello@pegrio.com".to_string()),
            notification_email: env::var("NOTIFICATION_EMAIL")
                .unwrap_or_else(|_| "hello@pegrio.com".to_string()),
            domain: env::var("DOMAIN").unwrap_or_else(|_| "localhost:3000".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3587),
        }
    }
}
