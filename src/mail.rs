use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers mail through an HTTP relay (Resend-compatible payload).
#[derive(Clone)]
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: String,
}

impl HttpMailer {
    pub fn new(http: reqwest::Client, config: &MailConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let payload = OutgoingMail {
            from: &self.sender,
            to,
            subject,
            text: body,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("send mail request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            error!(status = %status, body = %error_body, "mail relay returned error status");
            return Err(anyhow!("mail relay returned status {}", status));
        }

        debug!(to = %to, subject = %subject, "mail accepted by relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serial_test::serial;

    fn mailer_for(api_url: String) -> HttpMailer {
        HttpMailer::new(
            reqwest::Client::new(),
            &MailConfig {
                api_url,
                api_key: "mail-key".into(),
                sender: "noreply@example.com".into(),
            },
        )
    }

    #[tokio::test]
    #[serial]
    async fn send_posts_expected_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer mail-key")
            .match_body(Matcher::Json(serde_json::json!({
                "from": "noreply@example.com",
                "to": "user@example.com",
                "subject": "Email Verification",
                "text": "Your verification code is: 123456",
            })))
            .with_status(200)
            .with_body(r#"{"id": "msg_1"}"#)
            .create_async()
            .await;

        let result = mailer_for(format!("{}/emails", server.url()))
            .send(
                "user@example.com",
                "Email Verification",
                "Your verification code is: 123456",
            )
            .await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn send_surfaces_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .with_status(500)
            .with_body(r#"{"error": "provider down"}"#)
            .create_async()
            .await;

        let result = mailer_for(format!("{}/emails", server.url()))
            .send("user@example.com", "Email Verification", "code")
            .await;

        mock.assert_async().await;
        assert!(result.unwrap_err().to_string().contains("500"));
    }
}
