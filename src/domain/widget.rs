//! Widget catalog.
//!
//! Widgets are a closed set: every dashboard capability has a [`WidgetId`]
//! variant, and the [`WidgetCatalog`] maps each one to a human label and an
//! opaque [`RenderHandle`] supplied by a [`ContentPort`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::ports::content_port::ContentPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetId {
    Chart,
    OrderTicket,
    Positions,
    Orders,
    History,
    Watchlist,
    Screener,
    News,
    AccountDetails,
}

impl WidgetId {
    pub const ALL: [WidgetId; 9] = [
        WidgetId::Chart,
        WidgetId::OrderTicket,
        WidgetId::Positions,
        WidgetId::Orders,
        WidgetId::History,
        WidgetId::Watchlist,
        WidgetId::Screener,
        WidgetId::News,
        WidgetId::AccountDetails,
    ];

    /// Stable key used in persisted records and scripts.
    pub fn key(self) -> &'static str {
        match self {
            WidgetId::Chart => "chart",
            WidgetId::OrderTicket => "order-ticket",
            WidgetId::Positions => "positions",
            WidgetId::Orders => "orders",
            WidgetId::History => "history",
            WidgetId::Watchlist => "watchlist",
            WidgetId::Screener => "screener",
            WidgetId::News => "news",
            WidgetId::AccountDetails => "account",
        }
    }

    /// Built-in label, used when the content provider has no override.
    pub fn label(self) -> &'static str {
        match self {
            WidgetId::Chart => "Chart",
            WidgetId::OrderTicket => "Order Ticket",
            WidgetId::Positions => "Positions",
            WidgetId::Orders => "Open Orders",
            WidgetId::History => "Trade History",
            WidgetId::Watchlist => "Watchlist",
            WidgetId::Screener => "Screener",
            WidgetId::News => "News",
            WidgetId::AccountDetails => "Account Details",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WidgetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetId::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| format!("unknown widget '{}'", s))
    }
}

/// Opaque handle to a widget's renderable content.
#[derive(Clone)]
pub struct RenderHandle {
    widget: WidgetId,
    provider: Arc<dyn ContentPort>,
}

impl RenderHandle {
    pub fn render(&self) -> String {
        self.provider.render(self.widget)
    }
}

impl fmt::Debug for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHandle")
            .field("widget", &self.widget)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Widget {
    pub key: WidgetId,
    pub label: String,
    pub content: RenderHandle,
}

#[derive(Debug, Clone)]
pub struct WidgetCatalog {
    widgets: Vec<Widget>,
}

impl WidgetCatalog {
    pub fn new(provider: Arc<dyn ContentPort>) -> Self {
        let widgets = WidgetId::ALL
            .into_iter()
            .map(|key| Widget {
                key,
                label: provider
                    .label(key)
                    .unwrap_or_else(|| key.label().to_string()),
                content: RenderHandle {
                    widget: key,
                    provider: Arc::clone(&provider),
                },
            })
            .collect();
        Self { widgets }
    }

    /// Catalog whose content is just the widget label.
    pub fn placeholder() -> Self {
        Self::new(Arc::new(LabelOnly))
    }

    pub fn get(&self, id: WidgetId) -> &Widget {
        &self.widgets[id.index()]
    }

    pub fn label(&self, id: WidgetId) -> &str {
        &self.get(id).label
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }
}

struct LabelOnly;

impl ContentPort for LabelOnly {
    fn render(&self, widget: WidgetId) -> String {
        format!("[{}]", widget.label())
    }
}
