//! Configuration validation.
//!
//! Validates the `[grid]` and `[storage]` sections before a workspace opens.

use crate::domain::error::TradeboardError;
use crate::domain::geometry::GridSpec;
use crate::ports::config_port::ConfigPort;

pub const STORAGE_BACKENDS: [&str; 3] = ["json", "sqlite", "memory"];
pub const DEFAULT_POOL_SIZE: u32 = 2;
pub const MAX_POOL_SIZE: u32 = 64;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradeboardError> {
    validate_grid_config(config)?;
    validate_storage_config(config)?;
    Ok(())
}

pub fn validate_grid_config(config: &dyn ConfigPort) -> Result<(), TradeboardError> {
    let defaults = GridSpec::default();
    let columns = positive(config, "columns", defaults.columns)?;
    let card_width = positive(config, "card_width", defaults.card_width)?;
    let card_height = positive(config, "card_height", defaults.card_height)?;
    let min_width = positive(config, "min_width", defaults.min_width)?;
    let min_height = positive(config, "min_height", defaults.min_height)?;

    if card_width > columns {
        return Err(invalid("grid", "card_width", "card_width must not exceed columns"));
    }
    if min_width > card_width {
        return Err(invalid("grid", "min_width", "min_width must not exceed card_width"));
    }
    if min_height > card_height {
        return Err(invalid("grid", "min_height", "min_height must not exceed card_height"));
    }
    Ok(())
}

pub fn validate_storage_config(config: &dyn ConfigPort) -> Result<(), TradeboardError> {
    let backend = config
        .get_string("storage", "backend")
        .unwrap_or_else(|| "json".to_string());
    let backend = backend.trim().to_lowercase();
    if !STORAGE_BACKENDS.contains(&backend.as_str()) {
        return Err(invalid(
            "storage",
            "backend",
            &format!("backend must be one of: {}", STORAGE_BACKENDS.join(", ")),
        ));
    }
    if backend == "sqlite" && !cfg!(feature = "sqlite") {
        return Err(invalid(
            "storage",
            "backend",
            "sqlite backend requires the sqlite feature",
        ));
    }
    if backend != "memory" {
        match config.get_string("storage", "path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => {
                return Err(TradeboardError::ConfigMissing {
                    section: "storage".to_string(),
                    key: "path".to_string(),
                });
            }
        }
    }
    if let Some(key) = config.get_string("storage", "key") {
        if key.trim().is_empty() {
            return Err(invalid("storage", "key", "key must not be blank"));
        }
    }
    let pool_size = config.get_int("storage", "pool_size", DEFAULT_POOL_SIZE as i64);
    if pool_size < 1 || pool_size > MAX_POOL_SIZE as i64 {
        return Err(invalid(
            "storage",
            "pool_size",
            &format!("pool_size must be between 1 and {}", MAX_POOL_SIZE),
        ));
    }
    Ok(())
}

fn positive(config: &dyn ConfigPort, key: &str, default: u32) -> Result<u32, TradeboardError> {
    let value = config.get_int("grid", key, default as i64);
    if value < 1 || value > u32::MAX as i64 {
        return Err(invalid("grid", key, &format!("{} must be a positive integer", key)));
    }
    Ok(value as u32)
}

fn invalid(section: &str, key: &str, reason: &str) -> TradeboardError {
    TradeboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
