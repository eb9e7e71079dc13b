//! Active-tab tracker.
//!
//! One visible widget per card. Entries are repaired after every registry
//! change so that they always point at a member of the card's group.

use std::collections::HashMap;

use crate::domain::error::LayoutError;
use crate::domain::geometry::CardId;
use crate::domain::groups::GroupRegistry;
use crate::domain::widget::WidgetId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveTabs {
    active: HashMap<CardId, WidgetId>,
}

impl ActiveTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, card_id: &CardId) -> Option<WidgetId> {
        self.active.get(card_id).copied()
    }

    /// User tab click. The widget must belong to the card.
    pub fn set(
        &mut self,
        card_id: &CardId,
        widget: WidgetId,
        registry: &GroupRegistry,
    ) -> Result<(), LayoutError> {
        let widgets = registry
            .widgets(card_id)
            .ok_or_else(|| LayoutError::UnknownCard {
                card: card_id.clone(),
            })?;
        if !widgets.contains(&widget) {
            return Err(LayoutError::UnknownWidget {
                card: card_id.clone(),
                widget,
            });
        }
        self.active.insert(card_id.clone(), widget);
        Ok(())
    }

    /// Point a card at a widget the caller just placed into it.
    pub(crate) fn select(&mut self, card_id: &CardId, widget: WidgetId) {
        self.active.insert(card_id.clone(), widget);
    }

    pub(crate) fn forget(&mut self, card_id: &CardId) {
        self.active.remove(card_id);
    }

    /// Drop entries for vanished cards and reset stale entries to the first
    /// widget of their card.
    pub fn repair(&mut self, registry: &GroupRegistry) {
        self.active.retain(|card_id, _| registry.contains_card(card_id));
        for group in registry.groups() {
            let valid = self
                .active
                .get(&group.card_id)
                .is_some_and(|w| group.widgets.contains(w));
            if !valid {
                if let Some(first) = group.widgets.first() {
                    self.active.insert(group.card_id, *first);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
