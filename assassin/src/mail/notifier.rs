//! Target notification for a whole chain.

use super::errors::{MailError, MailResult};
use super::mailer::{Mailer, OutgoingMail};
use crate::chain::{Chain, TargetInfo};
use std::sync::Arc;

/// Subject of every target message
pub const TARGET_SUBJECT: &str = "Target";

/// Subject of the host confirmation
pub const HOST_SUBJECT: &str = "Assassin chain sent";

/// Outcome of a delivered batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Players who received their target
    pub players_notified: usize,
    /// Whether the host confirmation went out
    pub host_notified: bool,
}

/// Sends every player their own target, and nothing else
#[derive(Clone)]
pub struct TargetNotifier {
    mailer: Arc<dyn Mailer>,
}

impl TargetNotifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Mail each player their target, one message at a time.
    ///
    /// Stops at the first failure; messages already sent are not recalled and
    /// nothing is retried.
    ///
    /// # Returns
    ///
    /// * `MailResult<usize>` - Number of players notified
    ///
    /// # Errors
    ///
    /// * `MailError::Delivery` - A message could not be sent
    pub async fn notify_players(&self, chain: &Chain) -> MailResult<usize> {
        let mut sent = 0;
        for (player, info) in chain.iter() {
            let mail = target_mail(player, info);
            let recipient = mail.to.clone();
            self.mailer
                .send(mail)
                .await
                .map_err(|source| MailError::Delivery {
                    recipient,
                    sent,
                    source: Box::new(source),
                })?;
            sent += 1;
        }
        log::info!("Sent target mail to {} players", sent);
        Ok(sent)
    }

    /// Confirm to the host that the chain went out, without revealing it
    pub async fn notify_host(&self, host_email: &str, player_count: usize) -> MailResult<()> {
        self.mailer.send(host_mail(host_email, player_count)).await
    }

    /// Notify all players, then the host.
    ///
    /// A failed host confirmation is logged but does not fail the batch since
    /// every player already has their target.
    pub async fn deliver(&self, chain: &Chain, host_email: &str) -> MailResult<DeliveryReport> {
        let players_notified = self.notify_players(chain).await?;

        let host_notified = match self.notify_host(host_email, players_notified).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Host confirmation to {} failed: {}", host_email, e);
                false
            }
        };

        Ok(DeliveryReport {
            players_notified,
            host_notified,
        })
    }
}

/// Message telling `player` who their target is
pub fn target_mail(player: &str, info: &TargetInfo) -> OutgoingMail {
    let html_body = format!(
        "<p>Hi {}! Assassin is starting, get ready because your target is \
         <span style=\"color: #0066cc; font-weight: bold; font-style: italic;\">{}</span></p>",
        escape_html(player),
        escape_html(&info.target_name),
    );

    OutgoingMail {
        to: info.player_email.clone(),
        subject: TARGET_SUBJECT.to_string(),
        html_body,
    }
}

/// Confirmation for the host; carries the player count only
pub fn host_mail(host_email: &str, player_count: usize) -> OutgoingMail {
    OutgoingMail {
        to: host_email.to_string(),
        subject: HOST_SUBJECT.to_string(),
        html_body: format!(
            "<p>Your assassin game is live. {player_count} players have been sent their targets.</p>\
             <p>The chain itself stays secret.</p>"
        ),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
