//! User-facing notification channel.

use crate::domain::notification::Notification;

pub trait NotificationPort {
    fn notify(&self, notification: &Notification);
}
