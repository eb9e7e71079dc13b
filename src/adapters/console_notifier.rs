//! Notification sink that prints one line per notification.

use crate::domain::notification::Notification;
use crate::ports::notification_port::NotificationPort;
use std::cell::RefCell;
use std::io::{self, Write};
use tracing::{debug, warn};

pub struct ConsoleNotifier<W: Write> {
    out: RefCell<W>,
}

impl ConsoleNotifier<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> NotificationPort for ConsoleNotifier<W> {
    fn notify(&self, notification: &Notification) {
        debug!(level = %notification.level, "{}", notification.message);
        if let Err(e) = writeln!(self.out.borrow_mut(), "{}", notification) {
            warn!(error = %e, "could not print notification");
        }
    }
}
