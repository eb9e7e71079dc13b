#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub use tradeboard::adapters::memory_storage_adapter::MemoryStorageAdapter;
use tradeboard::domain::dashboard::Dashboard;
use tradeboard::domain::geometry::{CardGeometry, CardId, GridSpec};
use tradeboard::domain::notification::{Level, Notification};
use tradeboard::domain::record::{LayoutRecord, RectRecord, SnapshotRecord};
use tradeboard::domain::widget::{WidgetCatalog, WidgetId};
use tradeboard::domain::workspace::Workspace;
use tradeboard::ports::notification_port::NotificationPort;

/// Collects notifications; clones share the same list.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    pub fn at(&self, level: Level) -> Vec<String> {
        self.seen
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.seen.borrow_mut().push(notification.clone());
    }
}

pub fn card(id: &str) -> CardId {
    CardId::from(id)
}

pub fn mounted_dashboard() -> Dashboard {
    let mut d = Dashboard::new(GridSpec::default(), WidgetCatalog::placeholder());
    d.mount();
    d
}

/// Workspace over `storage`, with handles kept for inspection.
pub fn open_workspace(storage: &MemoryStorageAdapter) -> (Workspace, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let workspace = Workspace::open(
        GridSpec::default(),
        WidgetCatalog::placeholder(),
        Box::new(storage.clone()),
        Box::new(notifier.clone()),
    );
    (workspace, notifier)
}

pub fn rect_record(id: &str, x: u32, y: u32, w: u32, h: u32) -> RectRecord {
    RectRecord {
        i: id.to_string(),
        x,
        y: Some(y),
        w,
        h,
        min_w: 2,
        min_h: 3,
        resizable: true,
    }
}

pub fn snapshot_record(rects: Vec<RectRecord>, groups: &[(&str, &[&str])]) -> SnapshotRecord {
    SnapshotRecord {
        layouts: rects,
        widget_groups: groups
            .iter()
            .map(|(card, widgets)| {
                (
                    card.to_string(),
                    widgets.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect(),
    }
}

pub fn layout_record(active: &str, layouts: Vec<(&str, SnapshotRecord)>) -> LayoutRecord {
    LayoutRecord::new(
        active,
        layouts
            .into_iter()
            .map(|(name, s)| (name.to_string(), s))
            .collect::<BTreeMap<_, _>>(),
    )
}

pub fn geometry_of(dashboard: &Dashboard, id: &str) -> Option<CardGeometry> {
    dashboard.geometry().iter().find(|g| g.card_id.as_str() == id).cloned()
}

pub fn widgets_of(dashboard: &Dashboard, id: &str) -> Vec<WidgetId> {
    dashboard
        .widgets(&card(id))
        .map(|w| w.to_vec())
        .unwrap_or_default()
}
