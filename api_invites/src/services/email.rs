use common::{
    env_config::EmailConfig,
    error::{AppError, Res},
};
use reqwest::{Client, StatusCode};
use serde::Serialize;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Invitation message for a single recipient.
pub struct InviteEmail {
    pub to: String,
    pub inviter_name: String,
    pub invite_url: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
    text: String,
}

impl InviteEmail {
    pub fn subject(&self) -> String {
        format!("{} invited you to join Referrly", self.inviter_name)
    }

    pub fn html(&self) -> String {
        let inviter = escape_html(&self.inviter_name);
        let url = escape_html(&self.invite_url);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>You're Invited!</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1>You're Invited!</h1>
  <p><strong>{inviter}</strong> has invited you to join <strong>Referrly</strong>, a place to share and track your referrals.</p>
  <p style="text-align: center; margin: 32px 0;">
    <a href="{url}" style="background: #667eea; color: white; padding: 14px 36px; text-decoration: none; border-radius: 8px; font-weight: bold;">Accept Invitation</a>
  </p>
  <p style="font-size: 14px; color: #666;">Or paste this link into your browser:</p>
  <p style="font-size: 14px; word-break: break-all;">{url}</p>
  <p style="font-size: 12px; color: #999;">This invitation was sent by {inviter}. If you were not expecting it you can ignore this email.</p>
</body>
</html>"#
        )
    }

    pub fn text(&self) -> String {
        format!(
            "You're Invited!\n\n\
             {inviter} has invited you to join Referrly, a place to share and track your referrals.\n\n\
             Sign up here:\n{url}\n\n\
             This invitation was sent by {inviter}. If you were not expecting it you can ignore this email.",
            inviter = self.inviter_name,
            url = self.invite_url,
        )
    }
}

/// Sends the invitation through the Resend API. Without an API key the
/// message is written to the log instead.
pub async fn send_invite_email(config: &EmailConfig, email: &InviteEmail) -> Res<()> {
    let Some(api_key) = config.api_key.as_deref() else {
        log::info!(
            "Email delivery disabled, invite for {} not sent.\nSubject: {}\n{}",
            email.to,
            email.subject(),
            email.text()
        );
        return Ok(());
    };

    let body = SendEmailRequest {
        from: &config.from_address,
        to: [&email.to],
        subject: email.subject(),
        html: email.html(),
        text: email.text(),
    };

    let response = Client::new()
        .post(RESEND_API_URL)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        let error_response = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::json!({ "message": "Unknown error" }));
        let message = error_response["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();
        return Err(AppError::Internal(format!(
            "Email API responded {}: {}",
            status, message
        )));
    }

    log::info!("Invite email sent to {}", email.to);
    Ok(())
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
