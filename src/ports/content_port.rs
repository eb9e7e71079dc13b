//! Widget content provider port.

use crate::domain::widget::WidgetId;

/// Supplies what a widget shows. The dashboard never looks inside.
pub trait ContentPort: Send + Sync {
    /// Label override; `None` keeps the built-in label.
    fn label(&self, widget: WidgetId) -> Option<String> {
        let _ = widget;
        None
    }

    fn render(&self, widget: WidgetId) -> String;
}
