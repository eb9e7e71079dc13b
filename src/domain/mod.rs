//! Core domain types and logic: the dashboard layout engine.

pub mod active_tab;
pub mod command_parser;
pub mod config_validation;
pub mod dashboard;
pub mod error;
pub mod geometry;
pub mod groups;
pub mod layouts;
pub mod notification;
pub mod record;
pub mod snapshot;
pub mod widget;
pub mod workspace;
