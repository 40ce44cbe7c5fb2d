// src/services/email.rs
//! Outbound email via AWS SESv2
//!
//! Delivery is best-effort: callers in the registration and password-reset
//! flows log failures and proceed, they never surface them to the user.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use tracing::{error, info};

use crate::common::{safe_email_log, AppConfig};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email sending is not configured: {0}")]
    NotConfigured(String),

    #[error("failed to build message: {0}")]
    InvalidMessage(String),

    #[error("SES send failed: {0}")]
    SendFailed(String),
}

pub struct EmailService {
    from_email: Option<String>,
    region: String,
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            from_email: config.ses_from_email.clone(),
            region: config.ses_region.clone(),
        }
    }

    async fn client(&self) -> SesClient {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .load()
            .await;
        SesClient::new(&aws_config)
    }

    /// Send an HTML email via SES
    pub async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let from = self.from_email.as_ref().ok_or_else(|| {
            EmailError::NotConfigured("SES_FROM_EMAIL is not set".to_string())
        })?;

        let client = self.client().await;

        let destination = Destination::builder().to_addresses(to).build();

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::InvalidMessage(format!("Failed to build subject: {}", e)))?;

        let body_content = Content::builder()
            .data(html_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::InvalidMessage(format!("Failed to build body: {}", e)))?;

        let ses_body = Body::builder().html(body_content).build();

        let message = Message::builder()
            .subject(subject_content)
            .body(ses_body)
            .build();

        let email_content = EmailContent::builder().simple(message).build();

        let result = client
            .send_email()
            .from_email_address(from)
            .destination(destination)
            .content(email_content)
            .send()
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    to = %safe_email_log(to),
                    "Failed to send email via SES"
                );
                EmailError::SendFailed(e.to_string())
            })?;

        info!(
            to = %safe_email_log(to),
            message_id = ?result.message_id(),
            "Email sent successfully via SES"
        );

        Ok(())
    }
}

/// HTML body for the registration verification email
pub fn verification_email_body(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #4F46E5; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .code {{ font-size: 32px; letter-spacing: 8px; font-weight: bold; text-align: center; padding: 20px; background-color: #fff; border: 1px dashed #4F46E5; margin: 20px 0; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Confirm your registration</h1>
        </div>
        <div class="content">
            <p>Enter this code to finish creating your account:</p>
            <div class="code">{}</div>
            <p>The code is valid for 10 minutes. If you did not request it, you can safely ignore this email.</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        code
    )
}

/// HTML body for the password reset email
pub fn password_reset_email_body(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #10B981; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .code {{ font-size: 32px; letter-spacing: 8px; font-weight: bold; text-align: center; padding: 20px; background-color: #fff; border: 1px dashed #10B981; margin: 20px 0; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Password reset</h1>
        </div>
        <div class="content">
            <p>Use this code to set a new password:</p>
            <div class="code">{}</div>
            <p>The code is valid for 10 minutes. If you did not request a reset, your password is unchanged and you can ignore this email.</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_bodies_contain_code() {
        let body = verification_email_body("482913");
        assert!(body.contains("482913"));
        assert!(body.contains("Confirm your registration"));

        let body = password_reset_email_body("109283");
        assert!(body.contains("109283"));
        assert!(body.contains("Password reset"));
    }

    #[tokio::test]
    async fn test_send_requires_configuration() {
        let service = EmailService::new(&AppConfig::default());
        let result = service.send("user@example.com", "Subject", "<p>hi</p>").await;
        assert!(matches!(result, Err(EmailError::NotConfigured(_))));
    }
}
