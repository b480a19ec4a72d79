//! New-mail detection for an opened folder.

use std::sync::Arc;
use std::time::Duration;

use async_imap::types::UnsolicitedResponse;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::State;
use crate::Error;
use crate::client::Notification;

/// Turns EXISTS/EXPUNGE updates into counts of newly arrived messages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExistsTracker {
    exists: u32,
}

impl ExistsTracker {
    pub(crate) const fn new(exists: u32) -> Self {
        Self { exists }
    }

    /// Records an EXISTS count; returns how many messages are new, if any.
    pub(crate) fn on_exists(&mut self, exists: u32) -> Option<u32> {
        let new = exists.checked_sub(self.exists).filter(|&n| n > 0);
        self.exists = exists;
        new
    }

    /// Records one expunged message.
    pub(crate) const fn on_expunge(&mut self) {
        self.exists = self.exists.saturating_sub(1);
    }

    fn observe(&mut self, response: &UnsolicitedResponse) -> Option<u32> {
        match response {
            UnsolicitedResponse::Exists(n) => self.on_exists(*n),
            UnsolicitedResponse::Expunge(_) => {
                self.on_expunge();
                None
            }
            _ => None,
        }
    }
}

/// Issues NOOP every `interval` and publishes [`Notification::Mail`] for
/// every EXISTS growth seen since the last check.
///
/// Stops when the client is destroyed, the session goes away, or a NOOP
/// fails; the last case publishes an error and a close notification.
pub(crate) async fn poll_for_mail(
    state: Arc<Mutex<State>>,
    notifications: broadcast::Sender<Notification>,
    mut destroyed: watch::Receiver<bool>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = destroyed.changed() => {
                if changed.is_err() || *destroyed.borrow() {
                    break;
                }
                continue;
            }
        }

        let mut guard = state.lock().await;
        let inner = &mut *guard;
        let Some(session) = inner.session.as_mut() else {
            break;
        };

        if let Err(e) = session.noop().await {
            warn!(error = %e, "new-mail check failed, closing connection");
            inner.session = None;
            inner.poller = None;
            drop(guard);
            let _ = notifications.send(Notification::Error(Arc::new(Error::from(e))));
            let _ = notifications.send(Notification::Close);
            break;
        }

        while let Ok(response) = session.unsolicited_responses.try_recv() {
            if let Some(count) = inner.tracker.observe(&response) {
                debug!(count, "new mail");
                let _ = notifications.send(Notification::Mail(count));
            }
        }
    }
}
