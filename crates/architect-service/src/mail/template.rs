//! HTML mail carrying a password-reset code.

use architect_core::config::MailConfig;
use architect_core::types::OutgoingMail;

/// Subject line of every password-reset mail.
pub const OTP_SUBJECT: &str = "Password Reset: OTP Verification Code";

/// Placeholder replaced by the code.
const CODE_PLACEHOLDER: &str = "{{OTP_CODE}}";

const OTP_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>OTP Verification</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f9f9f9; }
    .container { max-width: 600px; margin: 40px auto; background: #ffffff; padding: 20px;
                 border-radius: 8px; border: 1px solid #e3e3e3; }
    .header { text-align: center; padding: 20px 0; }
    .header h1 { color: #2c3e50; font-size: 24px; }
    .code { text-align: center; margin: 30px 0; font-size: 28px; color: #3498db; letter-spacing: 4px; }
    .content { font-size: 16px; color: #7f8c8d; line-height: 1.6; text-align: center; }
    .footer { text-align: center; margin-top: 30px; font-size: 14px; color: #bdc3c7; }
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><h1>Architect Developers</h1></div>
    <div class="content">
      <p>Hello,</p>
      <p>Use the code below to reset your password. It expires in a few minutes.</p>
    </div>
    <div class="code"><strong>{{OTP_CODE}}</strong></div>
    <div class="content"><p>If you didn't request this code, you can ignore this e-mail.</p></div>
    <div class="footer"><p>&copy; Architect Developers</p></div>
  </div>
</body>
</html>
"#;

/// Composes password-reset mail from the configured sender.
#[derive(Debug, Clone)]
pub struct OtpMailTemplate {
    from: String,
}

impl OtpMailTemplate {
    /// Creates a template sending from `config.from`.
    pub fn new(config: &MailConfig) -> Self {
        Self {
            from: config.from.clone(),
        }
    }

    /// Renders the HTML body for `code`.
    pub fn render(&self, code: u32) -> String {
        OTP_HTML.replace(CODE_PLACEHOLDER, &format!("{code:06}"))
    }

    /// Builds the complete message for `to`.
    pub fn compose(&self, to: &str, code: u32) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: OTP_SUBJECT.to_string(),
            html: self.render(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_fills_code_and_headers() {
        let template = OtpMailTemplate::new(&MailConfig::default());
        let mail = template.compose("hod@college.edu", 482913);

        assert_eq!(mail.to, "hod@college.edu");
        assert_eq!(mail.subject, "Password Reset: OTP Verification Code");
        assert_eq!(mail.from, MailConfig::default().from);
        assert!(mail.html.contains("<strong>482913</strong>"));
        assert!(!mail.html.contains(CODE_PLACEHOLDER));
    }
}
