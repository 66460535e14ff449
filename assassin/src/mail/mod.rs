//! Mail delivery of targets.
//!
//! Each player gets exactly one message naming their own target. The host
//! gets a confirmation with the player count, never the chain.
//!
//! ## Example
//!
//! ```no_run
//! use assassin::chain::{ChainGenerator, Participant};
//! use assassin::mail::{MailConfig, SmtpMailer, TargetNotifier};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MailConfig::gmail("host@example.com", "app-password");
//!     let notifier = TargetNotifier::new(Arc::new(SmtpMailer::new(&config)?));
//!
//!     let players = vec![
//!         Participant::new("Ana", "ana@example.com"),
//!         Participant::new("Ben", "ben@example.com"),
//!     ];
//!     let chain = ChainGenerator::from_os_rng().generate(&players)?.to_chain();
//!
//!     let report = notifier.deliver(&chain, "host@example.com").await?;
//!     println!("{} players notified", report.players_notified);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod mailer;
pub mod notifier;

pub use config::MailConfig;
pub use errors::{MailError, MailResult};
pub use mailer::{Mailer, OutgoingMail, SmtpMailer, is_valid_address};
pub use notifier::{DeliveryReport, TargetNotifier, host_mail, target_mail};
