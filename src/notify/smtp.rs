use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};

use crate::{config::SmtpConfig, error::Result};

use super::MailTransport;

const PLAIN_TEXT_FALLBACK: &str = "View this email in an HTML-capable email client.";

/// 通过 SMTP 发送邮件
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// 按配置创建发送器
    ///
    /// 开启 TLS 时使用 STARTTLS；同时配置了用户名和密码时进行认证。
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);

        if !config.user.is_empty() && !config.password.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.parse()?,
        })
    }
}

impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                PLAIN_TEXT_FALLBACK.to_string(),
                html.to_string(),
            ))?;

        self.transport.send(message).await?;
        tracing::debug!(to, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            from: "ChangePost <noreply@changepost.app>".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_new_parses_sender() {
        let mailer = SmtpMailer::new(&config()).expect("创建发送器失败");
        assert_eq!(mailer.from.email.to_string(), "noreply@changepost.app");
    }

    #[tokio::test]
    async fn test_new_rejects_bad_sender() {
        let config = SmtpConfig {
            from: "not an address".to_string(),
            tls: false,
            ..config()
        };
        assert!(SmtpMailer::new(&config).is_err());
    }
}
