//! Mail transport configuration.

/// SMTP settings for outgoing target mail
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP port; 587 uses STARTTLS, anything else implicit TLS
    pub smtp_port: u16,

    /// Address mail is sent from, also the SMTP username
    pub sender_email: String,

    /// SMTP password (application password for Gmail)
    pub app_password: String,

    /// Timeout for a single SMTP exchange in seconds
    pub timeout_secs: u64,
}

impl MailConfig {
    pub const DEFAULT_HOST: &'static str = "smtp.gmail.com";
    pub const DEFAULT_PORT: u16 = 465;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Configuration for the default relay with the given credentials
    pub fn gmail(sender_email: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            smtp_host: Self::DEFAULT_HOST.to_string(),
            smtp_port: Self::DEFAULT_PORT,
            sender_email: sender_email.into(),
            app_password: app_password.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Whether the connection is upgraded with STARTTLS instead of wrapped in TLS
    pub fn uses_starttls(&self) -> bool {
        self.smtp_port == 587
    }
}
