/// Email service for activation and password-reset mail
///
/// Wraps an async SMTP transport. An empty SMTP host switches the service
/// into no-op mode where mails are only logged, which keeps development
/// and tests free of email infrastructure.
use std::sync::Arc;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::error::{AuthError, Result};

#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    site_url: String,
    site_name: String,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AuthError::Internal(format!("Invalid SMTP_FROM address: {e}")))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; email service will operate in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| AuthError::Internal(format!("Failed to configure SMTP transport: {e}")))?
            .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            site_url: config.site_url.trim_end_matches('/').to_string(),
            site_name: config.site_name.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Activation link pointing at the frontend's activation page.
    pub fn activation_link(&self, uid: &str, token: &str) -> String {
        format!(
            "{}/pages/auth/activate.html?uid={uid}&token={token}",
            self.site_url
        )
    }

    /// Reset link pointing at the frontend's password confirmation page.
    pub fn password_reset_link(&self, uid: &str, token: &str) -> String {
        format!(
            "{}/pages/auth/confirm_password.html?uid={uid}&token={token}",
            self.site_url
        )
    }

    pub async fn send_activation_email(
        &self,
        recipient: &str,
        uid: &str,
        token: &str,
    ) -> Result<()> {
        let link = self.activation_link(uid, token);
        let subject = format!("Confirm your {} account", self.site_name);
        let body = format!(
            "Welcome to {}!\n\nPlease click the following link to activate your account:\n{}\n\nIf you did not register, please ignore this email.",
            self.site_name, link
        );
        self.send_mail(recipient, &subject, &body).await
    }

    pub async fn send_password_reset_email(
        &self,
        recipient: &str,
        uid: &str,
        token: &str,
    ) -> Result<()> {
        let link = self.password_reset_link(uid, token);
        let subject = format!("{} password reset", self.site_name);
        let body = format!(
            "We received a request to reset your password.\n\nUse the following link to choose a new one:\n{}\n\nThis link expires in 1 hour. If you did not request a reset, please ignore this email.",
            link
        );
        self.send_mail(recipient, &subject, &body).await
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            info!(%recipient, %subject, "email suppressed (no-op mode)");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AuthError::Internal(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| AuthError::Internal(format!("Failed to build email: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| AuthError::Internal(format!("Failed to send email: {e}")))?;

        info!(%recipient, %subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;

    fn noop_service() -> EmailService {
        EmailService::new(&EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "Streamforge <no-reply@streamforge.dev>".to_string(),
            use_starttls: true,
            site_url: "https://app.example.com/".to_string(),
            site_name: "Streamforge".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_links_are_built_against_the_site_url() {
        let service = noop_service();
        assert_eq!(
            service.activation_link("dXNlcg", "tok123"),
            "https://app.example.com/pages/auth/activate.html?uid=dXNlcg&token=tok123"
        );
        assert_eq!(
            service.password_reset_link("dXNlcg", "tok123"),
            "https://app.example.com/pages/auth/confirm_password.html?uid=dXNlcg&token=tok123"
        );
    }

    #[tokio::test]
    async fn test_noop_mode_swallows_sends() {
        let service = noop_service();
        assert!(!service.is_enabled());
        service
            .send_activation_email("user@example.com", "uid", "token")
            .await
            .unwrap();
    }
}
