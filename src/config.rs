use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Lower-cased emails that receive the admin role at register/login.
    pub admin_emails: Vec<String>,
    pub low_stock_threshold: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let admin_emails = parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default());
        let low_stock_threshold = env::var("LOW_STOCK_THRESHOLD")
            .ok()
            .and_then(|t| t.parse::<i32>().ok())
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            admin_emails,
            low_stock_threshold,
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_emails_are_trimmed_and_lowercased() {
        let emails = parse_admin_emails(" Admin@Shop.test, ,seller@shop.test ");
        assert_eq!(emails, vec!["admin@shop.test", "seller@shop.test"]);
    }

    #[test]
    fn admin_check_ignores_case() {
        let config = AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            jwt_secret: "secret".into(),
            admin_emails: parse_admin_emails("admin@shop.test"),
            low_stock_threshold: 10,
        };
        assert!(config.is_admin_email("ADMIN@shop.test"));
        assert!(!config.is_admin_email("buyer@shop.test"));
    }
}
