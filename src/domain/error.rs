//! Domain error types.

use crate::domain::geometry::CardId;
use crate::domain::widget::WidgetId;

/// A parse error with position information for scripted commands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Rejections raised by the layout state machine.
///
/// None of these is fatal: the operation that raised one performed no
/// mutation, and the session continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{} is already on the dashboard (card {card})", .widget.label())]
    DuplicatePlacement { widget: WidgetId, card: CardId },

    #[error("a layout named \"{name}\" already exists")]
    DuplicateLayoutName { name: String },

    #[error("invalid layout name \"{name}\"")]
    InvalidLayoutName { name: String },

    #[error("the \"{name}\" layout cannot be deleted")]
    ProtectedLayoutDeletion { name: String },

    #[error("no card {card} on the dashboard")]
    UnknownCard { card: CardId },

    #[error("card {card} does not hold {}", .widget.label())]
    UnknownWidget { card: CardId, widget: WidgetId },

    #[error("no layout named \"{name}\"")]
    UnknownLayout { name: String },

    #[error("grid is not mounted yet")]
    NotMounted,

    #[error("layout change may not survive a reload: {reason}")]
    PersistenceWriteFailure { reason: String },
}

impl LayoutError {
    /// Stale references are dropped without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            LayoutError::UnknownCard { .. }
                | LayoutError::UnknownWidget { .. }
                | LayoutError::UnknownLayout { .. }
                | LayoutError::NotMounted
        )
    }
}

/// Top-level error type for tradeboard.
#[derive(Debug, thiserror::Error)]
pub enum TradeboardError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("storage query error: {reason}")]
    StorageQuery { reason: String },

    #[error("malformed layout record: {reason}")]
    Serialization { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Command(#[from] ParseError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TradeboardError {
    fn from(err: serde_json::Error) -> Self {
        TradeboardError::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<&TradeboardError> for std::process::ExitCode {
    fn from(err: &TradeboardError) -> Self {
        let code: u8 = match err {
            TradeboardError::Io(_) => 1,
            TradeboardError::ConfigParse { .. }
            | TradeboardError::ConfigMissing { .. }
            | TradeboardError::ConfigInvalid { .. } => 2,
            TradeboardError::Storage { .. }
            | TradeboardError::StorageQuery { .. }
            | TradeboardError::Serialization { .. } => 3,
            TradeboardError::Command(_) => 4,
            TradeboardError::Layout(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
