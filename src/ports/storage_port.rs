//! Durable storage of the named-layout record.

use crate::domain::error::TradeboardError;
use crate::domain::record::LayoutRecord;

/// Reads and writes the single layout record under a fixed key.
pub trait LayoutStoragePort {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<LayoutRecord>, TradeboardError>;

    fn store(&self, record: &LayoutRecord) -> Result<(), TradeboardError>;
}
