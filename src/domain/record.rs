//! Durable record shape of the named-layout collection.
//!
//! ```json
//! {
//!   "activeLayout": "Default",
//!   "layouts": {
//!     "Default": {
//!       "layouts": [{ "i": "card-1", "x": 0, "y": 0, "w": 4, "h": 6, "minW": 2, "minH": 3 }],
//!       "widgetGroups": { "card-1": ["chart", "news"] }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::geometry::{CardGeometry, CardId};
use crate::domain::groups::WidgetGroup;
use crate::domain::snapshot::LayoutSnapshot;
use crate::domain::widget::WidgetId;

/// The whole named-layout collection.
///
/// Each layout is read on its own: one that cannot be read is left out of
/// `layouts` and its name is listed in `unreadable` instead of failing the
/// whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRecord")]
pub struct LayoutRecord {
    pub active_layout: String,
    pub layouts: BTreeMap<String, SnapshotRecord>,
    #[serde(skip)]
    pub unreadable: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    active_layout: String,
    #[serde(default)]
    layouts: BTreeMap<String, Value>,
}

impl From<StoredRecord> for LayoutRecord {
    fn from(stored: StoredRecord) -> Self {
        let mut layouts = BTreeMap::new();
        let mut unreadable = Vec::new();
        for (name, value) in stored.layouts {
            match serde_json::from_value::<SnapshotRecord>(value) {
                Ok(snapshot) => {
                    layouts.insert(name, snapshot);
                }
                Err(_) => unreadable.push(name),
            }
        }
        LayoutRecord {
            active_layout: stored.active_layout,
            layouts,
            unreadable,
        }
    }
}

impl LayoutRecord {
    pub fn new(active_layout: &str, layouts: BTreeMap<String, SnapshotRecord>) -> Self {
        LayoutRecord {
            active_layout: active_layout.to_string(),
            layouts,
            unreadable: Vec::new(),
        }
    }

    /// Why replacing this stored value would lose layouts, or `None` when it
    /// reads back completely.
    pub fn lossy_reason(stored: &Value) -> Option<String> {
        match LayoutRecord::deserialize(stored) {
            Ok(record) if record.unreadable.is_empty() => None,
            Ok(record) => Some(format!(
                "unreadable layouts: {}",
                record.unreadable.join(", ")
            )),
            Err(e) => Some(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    /// Unreadable rectangles are skipped; their cards get placed below the
    /// others when the snapshot is sanitised.
    #[serde(default, deserialize_with = "readable_rects")]
    pub layouts: Vec<RectRecord>,
    #[serde(default)]
    pub widget_groups: BTreeMap<String, Vec<String>>,
}

/// One card rectangle. Coordinates accept any JSON number and are clamped
/// into grid units; negative values become 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectRecord {
    pub i: String,
    #[serde(default, deserialize_with = "grid_units")]
    pub x: u32,
    /// `None` (stored as `null`) for a card waiting to be placed below the
    /// existing ones.
    #[serde(default, deserialize_with = "grid_row")]
    pub y: Option<u32>,
    #[serde(default, deserialize_with = "grid_units")]
    pub w: u32,
    #[serde(default, deserialize_with = "grid_units")]
    pub h: u32,
    #[serde(rename = "minW", default, deserialize_with = "grid_units")]
    pub min_w: u32,
    #[serde(rename = "minH", default, deserialize_with = "grid_units")]
    pub min_h: u32,
    #[serde(
        rename = "isResizable",
        default = "resizable_default",
        skip_serializing_if = "is_resizable"
    )]
    pub resizable: bool,
}

fn resizable_default() -> bool {
    true
}

fn is_resizable(value: &bool) -> bool {
    *value
}

// Float to int `as` casts saturate and map NaN to 0.
fn grid_units<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0, |v| v as u32))
}

fn grid_row<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map(|v| v as u32))
}

fn readable_rects<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<RectRecord>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

impl From<&CardGeometry> for RectRecord {
    fn from(g: &CardGeometry) -> Self {
        RectRecord {
            i: g.card_id.to_string(),
            x: g.x,
            y: Some(g.y),
            w: g.w,
            h: g.h,
            min_w: g.min_w,
            min_h: g.min_h,
            resizable: g.resizable,
        }
    }
}

impl RectRecord {
    /// The stored rectangle, or `None` when the card has no row yet.
    pub fn into_geometry(self) -> Option<CardGeometry> {
        Some(CardGeometry {
            card_id: CardId::from(self.i),
            x: self.x,
            y: self.y?,
            w: self.w,
            h: self.h,
            min_w: self.min_w,
            min_h: self.min_h,
            resizable: self.resizable,
        })
    }
}

impl From<&LayoutSnapshot> for SnapshotRecord {
    fn from(snapshot: &LayoutSnapshot) -> Self {
        SnapshotRecord {
            layouts: snapshot.geometry.iter().map(RectRecord::from).collect(),
            widget_groups: snapshot
                .groups
                .iter()
                .map(|g| {
                    (
                        g.card_id.to_string(),
                        g.widgets.iter().map(|w| w.key().to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl SnapshotRecord {
    /// Convert to a snapshot, dropping widget keys this build does not know.
    ///
    /// The snapshot is not sanitised; pair with `LayoutSnapshot::sanitized`.
    pub fn into_snapshot(self) -> (LayoutSnapshot, Vec<String>) {
        let mut skipped = Vec::new();
        let groups = self
            .widget_groups
            .into_iter()
            .map(|(card_id, keys)| {
                let widgets = keys
                    .into_iter()
                    .filter_map(|key| match key.parse::<WidgetId>() {
                        Ok(id) => Some(id),
                        Err(reason) => {
                            skipped.push(format!("{} in card {}", reason, card_id));
                            None
                        }
                    })
                    .collect();
                WidgetGroup {
                    card_id: CardId::from(card_id),
                    widgets,
                }
            })
            .collect();
        let snapshot = LayoutSnapshot {
            geometry: self
                .layouts
                .into_iter()
                .filter_map(RectRecord::into_geometry)
                .collect(),
            groups,
        };
        (snapshot, skipped)
    }
}
