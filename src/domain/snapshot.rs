//! Point-in-time copy of the dashboard: geometry plus widget groups.

use std::collections::HashSet;

use crate::domain::geometry::{CardGeometry, CardId, GeometryStore, GridSpec};
use crate::domain::groups::WidgetGroup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSnapshot {
    pub geometry: Vec<CardGeometry>,
    /// Sorted by card id.
    pub groups: Vec<WidgetGroup>,
}

impl LayoutSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn card_count(&self) -> usize {
        self.groups.len()
    }

    /// Bring a snapshot of unknown provenance back to a consistent shape.
    ///
    /// Returns the repaired snapshot and one line per repair made. A widget
    /// listed twice keeps its first placement, empty groups and orphaned
    /// rectangles are dropped, and groups lacking a rectangle get one below
    /// the existing cards.
    pub fn sanitized(self, grid: &GridSpec) -> (LayoutSnapshot, Vec<String>) {
        let mut repairs = Vec::new();

        let mut groups = self.groups;
        groups.sort_by(|a, b| a.card_id.cmp(&b.card_id));

        let mut placed = HashSet::new();
        let mut cards = HashSet::new();
        let mut kept_groups = Vec::with_capacity(groups.len());
        for mut group in groups {
            if cards.contains(&group.card_id) {
                repairs.push(format!("dropped repeated group for card {}", group.card_id));
                continue;
            }
            group.widgets.retain(|widget| {
                let fresh = placed.insert(*widget);
                if !fresh {
                    repairs.push(format!(
                        "removed duplicate {} from card {}",
                        widget, group.card_id
                    ));
                }
                fresh
            });
            if group.widgets.is_empty() {
                repairs.push(format!("dropped empty card {}", group.card_id));
                continue;
            }
            cards.insert(group.card_id.clone());
            kept_groups.push(group);
        }

        let mut with_rect: HashSet<CardId> = HashSet::new();
        let mut kept_geometry = Vec::with_capacity(self.geometry.len());
        for rect in self.geometry {
            if !cards.contains(&rect.card_id) {
                repairs.push(format!("dropped rectangle of unknown card {}", rect.card_id));
                continue;
            }
            if !with_rect.insert(rect.card_id.clone()) {
                repairs.push(format!("dropped second rectangle of card {}", rect.card_id));
                continue;
            }
            let fitted = rect.clone().fitted(grid);
            if fitted != rect {
                repairs.push(format!("clamped rectangle of card {}", rect.card_id));
            }
            kept_geometry.push(fitted);
        }

        let mut store = GeometryStore::new();
        store.replace(kept_geometry);
        for group in &kept_groups {
            if !with_rect.contains(&group.card_id) {
                repairs.push(format!("placed card {} below the grid", group.card_id));
                store.append_card(group.card_id.clone(), grid);
            }
        }

        let snapshot = LayoutSnapshot {
            geometry: store.cards().to_vec(),
            groups: kept_groups,
        };
        (snapshot, repairs)
    }
}
