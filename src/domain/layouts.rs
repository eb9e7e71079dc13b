//! Named layout store.
//!
//! A collection of named dashboard snapshots plus the name of the layout the
//! live dashboard currently reflects. `"Default"` always exists and cannot be
//! deleted. Edits to the dashboard are not written back into the collection
//! until the active layout is saved.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::domain::dashboard::Dashboard;
use crate::domain::error::LayoutError;
use crate::domain::record::{LayoutRecord, SnapshotRecord};
use crate::domain::snapshot::LayoutSnapshot;

pub const DEFAULT_LAYOUT: &str = "Default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBook {
    layouts: BTreeMap<String, LayoutSnapshot>,
    active: String,
}

impl Default for LayoutBook {
    fn default() -> Self {
        LayoutBook {
            layouts: BTreeMap::new(),
            active: DEFAULT_LAYOUT.to_string(),
        }
    }
}

impl LayoutBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the collection from its durable record.
    ///
    /// Snapshots are taken as stored; they are sanitised when loaded into a
    /// dashboard. Unreadable layouts and unknown widget keys are dropped and
    /// reported.
    pub fn from_record(record: LayoutRecord) -> (Self, Vec<String>) {
        let mut skipped: Vec<String> = record
            .unreadable
            .iter()
            .map(|name| format!("{}: unreadable layout", name))
            .collect();
        let layouts = record
            .layouts
            .into_iter()
            .map(|(name, snapshot)| {
                let (snapshot, dropped) = snapshot.into_snapshot();
                skipped.extend(dropped.into_iter().map(|d| format!("{}: {}", name, d)));
                (name, snapshot)
            })
            .collect();
        let book = LayoutBook {
            layouts,
            active: record.active_layout,
        };
        (book, skipped)
    }

    pub fn to_record(&self) -> LayoutRecord {
        LayoutRecord::new(
            &self.active,
            self.layouts
                .iter()
                .map(|(name, snapshot)| (name.clone(), SnapshotRecord::from(snapshot)))
                .collect(),
        )
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&LayoutSnapshot> {
        self.layouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Establish the startup guarantees: `"Default"` exists and the active
    /// pointer names a present layout. Returns true if anything was added or
    /// redirected.
    pub fn seed(&mut self, dashboard: &Dashboard) -> bool {
        let mut changed = false;
        if !self.layouts.contains_key(DEFAULT_LAYOUT) {
            let snapshot = self
                .layouts
                .get(&self.active)
                .cloned()
                .unwrap_or_else(|| dashboard.snapshot());
            info!(layout = DEFAULT_LAYOUT, "seeding default layout");
            self.layouts.insert(DEFAULT_LAYOUT.to_string(), snapshot);
            changed = true;
        }
        if !self.layouts.contains_key(&self.active) {
            warn!(layout = %self.active, "active layout missing, using default");
            self.active = DEFAULT_LAYOUT.to_string();
            changed = true;
        }
        changed
    }

    /// Load the active layout's snapshot into the dashboard.
    pub fn load_active(&self, dashboard: &mut Dashboard) -> Vec<String> {
        match self.layouts.get(&self.active) {
            Some(snapshot) => dashboard.load(snapshot.clone()),
            None => Vec::new(),
        }
    }

    /// Add a layout and make it the live one.
    pub fn create(
        &mut self,
        name: &str,
        snapshot: LayoutSnapshot,
        dashboard: &mut Dashboard,
    ) -> Result<String, LayoutError> {
        let name = normalize_name(name)?;
        if self.layouts.contains_key(&name) {
            return Err(LayoutError::DuplicateLayoutName { name });
        }
        self.layouts.insert(name.clone(), snapshot.clone());
        self.active = name.clone();
        dashboard.load(snapshot);
        info!(layout = %name, "layout created");
        Ok(name)
    }

    /// Overwrite the active layout with the dashboard's current state.
    pub fn save(&mut self, dashboard: &Dashboard) -> String {
        self.layouts
            .insert(self.active.clone(), dashboard.snapshot());
        info!(layout = %self.active, "layout saved");
        self.active.clone()
    }

    pub fn switch(&mut self, name: &str, dashboard: &mut Dashboard) -> Result<(), LayoutError> {
        let name = name.trim();
        let snapshot = self
            .layouts
            .get(name)
            .ok_or_else(|| LayoutError::UnknownLayout {
                name: name.to_string(),
            })?;
        dashboard.load(snapshot.clone());
        self.active = name.to_string();
        info!(layout = %name, "layout switched");
        Ok(())
    }

    /// Remove a layout. Deleting the live layout falls back to `"Default"`;
    /// the return value says whether that happened.
    pub fn delete(&mut self, name: &str, dashboard: &mut Dashboard) -> Result<bool, LayoutError> {
        let name = name.trim();
        if name == DEFAULT_LAYOUT {
            return Err(LayoutError::ProtectedLayoutDeletion {
                name: name.to_string(),
            });
        }
        if self.layouts.remove(name).is_none() {
            return Err(LayoutError::UnknownLayout {
                name: name.to_string(),
            });
        }
        info!(layout = %name, "layout deleted");

        if self.active != name {
            return Ok(false);
        }
        self.active = DEFAULT_LAYOUT.to_string();
        if let Some(snapshot) = self.layouts.get(DEFAULT_LAYOUT) {
            dashboard.load(snapshot.clone());
        }
        Ok(true)
    }
}

fn normalize_name(name: &str) -> Result<String, LayoutError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LayoutError::InvalidLayoutName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
