//! Concrete adapter implementations for ports.

pub mod console_notifier;
pub mod csv_content_adapter;
pub mod file_config_adapter;
pub mod json_file_adapter;
pub mod memory_storage_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
