/// Configuration management for auth-service
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub cookies: CookieConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    /// Empty host switches the mailer into no-op mode (logs only).
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub use_starttls: bool,
    /// Base URL of the frontend that activation and reset links point at.
    pub site_url: String,
    pub site_name: String,
}

#[derive(Clone, Debug)]
pub struct CookieConfig {
    /// Cookie domain; unset scopes cookies to the serving host.
    pub domain: Option<String>,
    pub secure: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("AUTH_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("AUTH_SERVICE_PORT")
                    .unwrap_or_else(|_| "8081".to_string())
                    .parse()
                    .unwrap_or(8081),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/streamforge".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
            },
            email: EmailConfig {
                smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
                smtp_port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .unwrap_or(587),
                smtp_username: std::env::var("SMTP_USERNAME").ok(),
                smtp_password: std::env::var("SMTP_PASSWORD").ok(),
                smtp_from: std::env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "Streamforge <no-reply@streamforge.dev>".to_string()),
                use_starttls: std::env::var("SMTP_STARTTLS")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(true),
                site_url: std::env::var("SITE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                site_name: std::env::var("SITE_NAME")
                    .unwrap_or_else(|_| "Streamforge".to_string()),
            },
            cookies: CookieConfig {
                domain: std::env::var("AUTH_COOKIE_DOMAIN").ok(),
                secure: std::env::var("AUTH_COOKIE_SECURE")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(true),
            },
        })
    }
}
