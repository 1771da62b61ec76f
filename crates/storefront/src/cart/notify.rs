//! Transient confirmation messages shown after cart changes.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};

/// How long a notification stays fully visible.
pub const NOTIFICATION_VISIBLE_FOR: Duration = Duration::from_millis(2500);

/// Length of the fade-out once the visible period ends.
pub const NOTIFICATION_FADE_OUT: Duration = Duration::from_millis(300);

/// A short message for the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub visible_for: Duration,
    pub fade_out: Duration,
}

impl Notification {
    /// A notification with the standard timings.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            visible_for: NOTIFICATION_VISIBLE_FOR,
            fade_out: NOTIFICATION_FADE_OUT,
        }
    }

    #[must_use]
    pub fn added(quantity: u32, name: &str) -> Self {
        Self::new(format!("Added {quantity} {name} to cart"))
    }

    #[must_use]
    pub fn removed(name: &str) -> Self {
        Self::new(format!("Removed {name} from cart"))
    }

    #[must_use]
    pub fn quantity_updated(name: &str, quantity: u32) -> Self {
        Self::new(format!("Updated {name} quantity to {quantity}"))
    }

    #[must_use]
    pub fn empty_cart() -> Self {
        Self::new("Your cart is empty")
    }

    /// Event payload for the browser's notification script.
    #[must_use]
    pub fn to_event(&self) -> Value {
        json!({
            "message": self.message,
            "visibleMs": u64::try_from(self.visible_for.as_millis()).unwrap_or(u64::MAX),
            "fadeMs": u64::try_from(self.fade_out.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Something that can display a notification.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(message = %notification.message, "cart notification");
    }
}

/// Collects notifications so a handler can forward them to the browser.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wording() {
        assert_eq!(Notification::added(2, "Shirt").message, "Added 2 Shirt to cart");
        assert_eq!(Notification::removed("Shirt").message, "Removed Shirt from cart");
        assert_eq!(
            Notification::quantity_updated("Shirt", 4).message,
            "Updated Shirt quantity to 4"
        );
        assert_eq!(Notification::empty_cart().message, "Your cart is empty");
    }

    #[test]
    fn test_standard_timings() {
        let n = Notification::new("hi");
        assert_eq!(n.visible_for, Duration::from_millis(2500));
        assert_eq!(n.fade_out, Duration::from_millis(300));
        assert_eq!(
            n.to_event(),
            json!({"message": "hi", "visibleMs": 2500, "fadeMs": 300})
        );
    }

    #[test]
    fn test_queue_clones_share_state() {
        let queue = NotificationQueue::new();
        let handle = queue.clone();
        handle.notify(Notification::new("one"));
        handle.notify(Notification::new("two"));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "one");
        assert!(queue.is_empty());
    }
}
