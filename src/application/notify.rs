//! Notification fan-out for high-severity signals.
//!
//! Delivery contract: a signal is dispatched at most once. The flow is
//! read-fresh → send → conditional mark (`mark_notified` only flips
//! `telegram_sent` when it is still false), so repeated calls against a
//! stale `Signal` value are no-ops and a failed send leaves the flag false
//! for the next scheduled pass to retry. Two processes racing between the
//! fresh read and the mark can still double-send; that narrow best-effort
//! window is accepted here instead of a cross-service transaction.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::notifier::Notifier;
use crate::domain::ports::signal_repository::SignalRepository;

/// Render a signal as an outbound message: severity icon + bold title,
/// severity label, optional sector, description, optional symbols line and
/// source attribution.
pub fn format_signal_message(signal: &Signal) -> String {
    let mut lines = vec![
        format!("{} *{}*", signal.severity.emoji(), signal.title),
        String::new(),
        format!(
            "\u{1F4CA} Severity: {}",
            signal.severity.to_string().to_uppercase()
        ),
    ];

    if let Some(sector) = &signal.sector {
        lines.push(format!("\u{1F4C1} Sector: {sector}"));
    }

    lines.push(String::new());
    lines.push(signal.description.clone());

    if !signal.related_symbols.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "\u{1F3F7}\u{FE0F} Symbols: {}",
            signal.related_symbols.join(", ")
        ));
    }

    lines.push(String::new());
    lines.push(format!("_Source: {}_", signal.source));

    lines.join("\n")
}

pub struct NotificationFanout {
    repo: Arc<dyn SignalRepository>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationFanout {
    pub fn new(repo: Arc<dyn SignalRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Dispatch one signal if it is eligible. Returns whether a message was
    /// actually sent. Send failures are logged and reported as "not sent";
    /// only store failures propagate.
    pub async fn dispatch(&self, signal: &Signal) -> Result<bool, DomainError> {
        if !signal.severity.is_notifiable() {
            return Ok(false);
        }
        if !self.notifier.is_enabled() {
            debug!("notification channel disabled");
            return Ok(false);
        }

        // Re-read persisted state: the caller's copy may predate an earlier
        // delivery, and `telegram_sent` never resets once true.
        let current = self
            .repo
            .get_by_id(signal.id)?
            .ok_or_else(|| DomainError::NotFound(format!("signal {}", signal.id)))?;
        if current.telegram_sent {
            debug!(signal = signal.id, "already delivered, skipping");
            return Ok(false);
        }
        if current.is_expired(Utc::now()) {
            debug!(signal = signal.id, "expired, skipping");
            return Ok(false);
        }

        let message = format_signal_message(&current);
        if let Err(e) = self.notifier.send(&message).await {
            warn!(signal = signal.id, error = %e, "notification send failed");
            return Ok(false);
        }

        let won = self.repo.mark_notified(signal.id, Utc::now())?;
        if won {
            info!(signal = signal.id, "notification delivered");
        }
        Ok(won)
    }

    /// Dispatch a batch of freshly created signals; returns how many
    /// messages went out.
    pub async fn dispatch_batch(&self, signals: &[Signal]) -> Result<usize, DomainError> {
        let mut sent = 0usize;
        for signal in signals {
            if self.dispatch(signal).await? {
                sent += 1;
            }
        }
        Ok(sent)
    }
}
