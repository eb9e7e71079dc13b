//! Command dispatcher for the live dashboard.
//!
//! [`Dashboard`] owns the geometry store, the group registry and the
//! active-tab tracker, and is the only writer of all three. Every
//! [`Command`] is validated before anything is mutated, so a rejected
//! command leaves the dashboard exactly as it was.

use tracing::debug;

use crate::domain::active_tab::ActiveTabs;
use crate::domain::error::LayoutError;
use crate::domain::geometry::{CardGeometry, CardId, GeometryStore, GridSpec, ROW_LIMIT};
use crate::domain::groups::{GroupRegistry, Removal};
use crate::domain::notification::Notification;
use crate::domain::snapshot::LayoutSnapshot;
use crate::domain::widget::{WidgetCatalog, WidgetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddWidgetAsNewCard(WidgetId),
    AddWidgetToGroup { card: CardId, widget: WidgetId },
    RemoveWidgetFromGroup { card: CardId, widget: WidgetId },
    DeleteCard(CardId),
    SetActiveTab { card: CardId, widget: WidgetId },
    Reflow(Vec<CardGeometry>),
}

/// What a successful command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CardAdded { card: CardId, widget: WidgetId },
    WidgetGrouped { card: CardId, widget: WidgetId },
    WidgetRemoved {
        card: CardId,
        widget: WidgetId,
        card_removed: bool,
    },
    CardDeleted { card: CardId, widgets: Vec<WidgetId> },
    TabSelected { card: CardId, widget: WidgetId },
    Reflowed { changed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub outcome: Result<Effect, LayoutError>,
    pub notifications: Vec<Notification>,
}

/// Read-only view of one card for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    pub geometry: &'a CardGeometry,
    pub widgets: &'a [WidgetId],
    pub active: WidgetId,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    grid: GridSpec,
    catalog: WidgetCatalog,
    geometry: GeometryStore,
    registry: GroupRegistry,
    tabs: ActiveTabs,
}

impl Dashboard {
    pub fn new(grid: GridSpec, catalog: WidgetCatalog) -> Self {
        Dashboard {
            grid,
            catalog,
            geometry: GeometryStore::new(),
            registry: GroupRegistry::new(),
            tabs: ActiveTabs::new(),
        }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub fn geometry(&self) -> &[CardGeometry] {
        self.geometry.cards()
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn widgets(&self, card: &CardId) -> Option<&[WidgetId]> {
        self.registry.widgets(card)
    }

    pub fn active_tab(&self, card: &CardId) -> Option<WidgetId> {
        self.tabs.get(card)
    }

    pub fn card_count(&self) -> usize {
        self.registry.len()
    }

    /// Enable reflows. Called once the first layout has been loaded.
    pub fn mount(&mut self) {
        self.geometry.mount();
    }

    pub fn is_mounted(&self) -> bool {
        self.geometry.is_mounted()
    }

    /// Cards in geometry order.
    pub fn cards(&self) -> Vec<CardView<'_>> {
        self.geometry
            .cards()
            .iter()
            .filter_map(|geometry| {
                let widgets = self.registry.widgets(&geometry.card_id)?;
                let active = self.tabs.get(&geometry.card_id)?;
                Some(CardView {
                    geometry,
                    widgets,
                    active,
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            geometry: self.geometry.cards().to_vec(),
            groups: self.registry.groups().collect(),
        }
    }

    /// Replace the whole dashboard with a snapshot.
    ///
    /// The snapshot is sanitised first; the returned lines describe any
    /// repairs that were needed. Every card starts on its first tab.
    pub fn load(&mut self, snapshot: LayoutSnapshot) -> Vec<String> {
        let (snapshot, repairs) = snapshot.sanitized(&self.grid);
        self.geometry.replace(snapshot.geometry);
        self.registry = GroupRegistry::from_groups(snapshot.groups);
        self.tabs = ActiveTabs::new();
        self.tabs.repair(&self.registry);
        repairs
    }

    pub fn dispatch(&mut self, command: Command) -> Dispatch {
        debug!(?command, "dispatch");
        let outcome = self.apply(command);
        debug_assert!(self.check_invariants().is_ok());
        let notifications = self.notifications_for(&outcome);
        Dispatch {
            outcome,
            notifications,
        }
    }

    fn apply(&mut self, command: Command) -> Result<Effect, LayoutError> {
        let effect = match command {
            Command::AddWidgetAsNewCard(widget) => {
                let card = self.registry.add_as_new_card(widget)?;
                self.geometry.append_card(card.clone(), &self.grid);
                self.tabs.select(&card, widget);
                Effect::CardAdded { card, widget }
            }
            Command::AddWidgetToGroup { card, widget } => {
                self.registry.add_to_group(&card, widget)?;
                self.tabs.select(&card, widget);
                Effect::WidgetGrouped { card, widget }
            }
            Command::RemoveWidgetFromGroup { card, widget } => {
                let card_removed = match self.registry.remove_from_group(&card, widget)? {
                    Removal::Emptied => {
                        self.geometry.remove_card(&card);
                        self.tabs.forget(&card);
                        true
                    }
                    Removal::Remaining(_) => false,
                };
                Effect::WidgetRemoved {
                    card,
                    widget,
                    card_removed,
                }
            }
            Command::DeleteCard(card) => {
                let widgets = self.registry.delete_card(&card)?;
                self.geometry.remove_card(&card);
                self.tabs.forget(&card);
                Effect::CardDeleted { card, widgets }
            }
            Command::SetActiveTab { card, widget } => {
                self.tabs.set(&card, widget, &self.registry)?;
                Effect::TabSelected { card, widget }
            }
            Command::Reflow(rects) => {
                let changed = self.geometry.reflow(&rects, &self.grid)?;
                Effect::Reflowed { changed }
            }
        };
        self.tabs.repair(&self.registry);
        Ok(effect)
    }

    fn notifications_for(&self, outcome: &Result<Effect, LayoutError>) -> Vec<Notification> {
        match outcome {
            Err(err) if err.is_silent() => Vec::new(),
            Err(err) => vec![Notification::warning(self.describe_error(err))],
            Ok(Effect::WidgetRemoved {
                widget,
                card_removed,
                ..
            }) => {
                let label = self.catalog.label(*widget);
                let message = if *card_removed {
                    format!("{} removed; its card was closed", label)
                } else {
                    format!("{} removed from card", label)
                };
                vec![Notification::info(message)]
            }
            Ok(Effect::CardDeleted { widgets, .. }) => {
                let labels: Vec<&str> = widgets.iter().map(|w| self.catalog.label(*w)).collect();
                vec![Notification::info(format!(
                    "Card deleted ({})",
                    labels.join(", ")
                ))]
            }
            Ok(_) => Vec::new(),
        }
    }

    fn describe_error(&self, err: &LayoutError) -> String {
        match err {
            LayoutError::DuplicatePlacement { widget, .. } => {
                format!("{} is already on the dashboard", self.catalog.label(*widget))
            }
            other => other.to_string(),
        }
    }

    /// Verify the cross-store invariants.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for group in self.registry.groups() {
            if group.widgets.is_empty() {
                return Err(format!("card {} has no widgets", group.card_id));
            }
            for widget in &group.widgets {
                if !seen.insert(*widget) {
                    return Err(format!("{} placed more than once", widget));
                }
                if self.registry.card_of(*widget) != Some(&group.card_id) {
                    return Err(format!("reverse index out of sync for {}", widget));
                }
            }
            let rects = self
                .geometry
                .cards()
                .iter()
                .filter(|g| g.card_id == group.card_id)
                .count();
            if rects != 1 {
                return Err(format!("card {} has {} rectangles", group.card_id, rects));
            }
            match self.tabs.get(&group.card_id) {
                Some(active) if group.widgets.contains(&active) => {}
                _ => return Err(format!("card {} has no valid active tab", group.card_id)),
            }
        }
        for rect in self.geometry.cards() {
            if rect.x.saturating_add(rect.w) > self.grid.columns || rect.bottom() > ROW_LIMIT {
                return Err(format!("card {} lies outside the grid", rect.card_id));
            }
        }
        if self.geometry.len() != self.registry.len() {
            return Err("rectangle without a widget group".to_string());
        }
        if self.tabs.len() != self.registry.len() {
            return Err("active tab for a missing card".to_string());
        }
        Ok(())
    }
}

/// Pure form of [`Dashboard::dispatch`]: `(state, command) -> (state, notifications)`.
pub fn handle(mut state: Dashboard, command: Command) -> (Dashboard, Vec<Notification>) {
    let dispatch = state.dispatch(command);
    (state, dispatch.notifications)
}
