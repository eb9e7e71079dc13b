//! In-process layout storage.
//!
//! Clones share one slot, so a caller can keep a handle to inspect what the
//! workspace wrote. Writes can be forced to fail.

use crate::domain::error::TradeboardError;
use crate::domain::record::LayoutRecord;
use crate::ports::storage_port::LayoutStoragePort;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Slot {
    record: Option<LayoutRecord>,
    writes: usize,
    fail_writes: bool,
    fail_reads: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorageAdapter {
    slot: Rc<RefCell<Slot>>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: LayoutRecord) -> Self {
        let adapter = Self::new();
        adapter.slot.borrow_mut().record = Some(record);
        adapter
    }

    pub fn record(&self) -> Option<LayoutRecord> {
        self.slot.borrow().record.clone()
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.slot.borrow().writes
    }

    pub fn fail_writes(&self, fail: bool) {
        self.slot.borrow_mut().fail_writes = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.slot.borrow_mut().fail_reads = fail;
    }
}

impl LayoutStoragePort for MemoryStorageAdapter {
    fn load(&self) -> Result<Option<LayoutRecord>, TradeboardError> {
        let slot = self.slot.borrow();
        if slot.fail_reads {
            return Err(TradeboardError::Storage {
                reason: "storage unavailable".to_string(),
            });
        }
        Ok(slot.record.clone())
    }

    fn store(&self, record: &LayoutRecord) -> Result<(), TradeboardError> {
        let mut slot = self.slot.borrow_mut();
        if slot.fail_writes {
            return Err(TradeboardError::Storage {
                reason: "quota exceeded".to_string(),
            });
        }
        slot.record = Some(record.clone());
        slot.writes += 1;
        Ok(())
    }
}
