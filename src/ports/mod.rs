//! Port traits the domain depends on.

pub mod config_port;
pub mod content_port;
pub mod notification_port;
pub mod storage_port;
