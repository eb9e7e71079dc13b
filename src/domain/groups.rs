//! Widget group registry.
//!
//! Source of truth for which widgets live in which card. A widget is a
//! singleton resource: it appears in at most one group, which the reverse
//! index `placement` answers in O(1).

use std::collections::{BTreeMap, HashMap};

use crate::domain::error::LayoutError;
use crate::domain::geometry::CardId;
use crate::domain::widget::WidgetId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetGroup {
    pub card_id: CardId,
    pub widgets: Vec<WidgetId>,
}

/// What is left of a card after one widget was taken out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Remaining(Vec<WidgetId>),
    Emptied,
}

#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: BTreeMap<CardId, Vec<WidgetId>>,
    placement: HashMap<WidgetId, CardId>,
    next_seq: u64,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from groups that already satisfy the uniqueness and
    /// non-empty rules (see `LayoutSnapshot::sanitized`).
    pub fn from_groups(groups: impl IntoIterator<Item = WidgetGroup>) -> Self {
        let mut registry = Self::new();
        for group in groups {
            for widget in &group.widgets {
                registry.placement.insert(*widget, group.card_id.clone());
            }
            registry.groups.insert(group.card_id, group.widgets);
        }
        registry.next_seq = registry
            .groups
            .keys()
            .filter_map(|id| id.as_str().strip_prefix("card-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        registry
    }

    pub fn card_of(&self, widget: WidgetId) -> Option<&CardId> {
        self.placement.get(&widget)
    }

    pub fn contains_card(&self, card_id: &CardId) -> bool {
        self.groups.contains_key(card_id)
    }

    pub fn widgets(&self, card_id: &CardId) -> Option<&[WidgetId]> {
        self.groups.get(card_id).map(Vec::as_slice)
    }

    pub fn groups(&self) -> impl Iterator<Item = WidgetGroup> + '_ {
        self.groups.iter().map(|(card_id, widgets)| WidgetGroup {
            card_id: card_id.clone(),
            widgets: widgets.clone(),
        })
    }

    pub fn card_ids(&self) -> impl Iterator<Item = &CardId> {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn ensure_unplaced(&self, widget: WidgetId) -> Result<(), LayoutError> {
        match self.placement.get(&widget) {
            Some(card) => Err(LayoutError::DuplicatePlacement {
                widget,
                card: card.clone(),
            }),
            None => Ok(()),
        }
    }

    fn allocate_card_id(&mut self) -> CardId {
        loop {
            self.next_seq += 1;
            let id = CardId::from(format!("card-{}", self.next_seq));
            if !self.groups.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create a singleton group under a fresh card id.
    pub fn add_as_new_card(&mut self, widget: WidgetId) -> Result<CardId, LayoutError> {
        self.ensure_unplaced(widget)?;
        let card_id = self.allocate_card_id();
        self.groups.insert(card_id.clone(), vec![widget]);
        self.placement.insert(widget, card_id.clone());
        Ok(card_id)
    }

    /// Append a widget to an existing card's tab list.
    pub fn add_to_group(&mut self, card_id: &CardId, widget: WidgetId) -> Result<(), LayoutError> {
        if !self.groups.contains_key(card_id) {
            return Err(LayoutError::UnknownCard {
                card: card_id.clone(),
            });
        }
        self.ensure_unplaced(widget)?;
        if let Some(widgets) = self.groups.get_mut(card_id) {
            widgets.push(widget);
        }
        self.placement.insert(widget, card_id.clone());
        Ok(())
    }

    /// Take a widget out of a card. An emptied group is deleted.
    pub fn remove_from_group(
        &mut self,
        card_id: &CardId,
        widget: WidgetId,
    ) -> Result<Removal, LayoutError> {
        let widgets = self
            .groups
            .get_mut(card_id)
            .ok_or_else(|| LayoutError::UnknownCard {
                card: card_id.clone(),
            })?;
        let idx = widgets
            .iter()
            .position(|w| *w == widget)
            .ok_or_else(|| LayoutError::UnknownWidget {
                card: card_id.clone(),
                widget,
            })?;
        widgets.remove(idx);
        self.placement.remove(&widget);

        if widgets.is_empty() {
            self.groups.remove(card_id);
            Ok(Removal::Emptied)
        } else {
            Ok(Removal::Remaining(widgets.clone()))
        }
    }

    /// Drop a card and every widget in it.
    pub fn delete_card(&mut self, card_id: &CardId) -> Result<Vec<WidgetId>, LayoutError> {
        let widgets = self
            .groups
            .remove(card_id)
            .ok_or_else(|| LayoutError::UnknownCard {
                card: card_id.clone(),
            })?;
        for widget in &widgets {
            self.placement.remove(widget);
        }
        Ok(widgets)
    }
}
