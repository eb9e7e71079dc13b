//! The live trading workspace: dashboard, named layouts and their ports.
//!
//! Every verb first commits its in-memory transition, then (for create, save
//! and delete) writes the layout record. A failed write is reported but the
//! in-memory state stays as committed.

use tracing::{info, warn};

use crate::domain::dashboard::{Command, Dashboard, Effect};
use crate::domain::error::LayoutError;
use crate::domain::geometry::{CardGeometry, CardId, GridSpec};
use crate::domain::layouts::LayoutBook;
use crate::domain::notification::Notification;
use crate::domain::widget::{WidgetCatalog, WidgetId};
use crate::ports::notification_port::NotificationPort;
use crate::ports::storage_port::LayoutStoragePort;

/// One user action, as produced by the command parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(WidgetId),
    Merge { card: CardId, widget: WidgetId },
    Remove { card: CardId, widget: WidgetId },
    Delete(CardId),
    Tab { card: CardId, widget: WidgetId },
    Move {
        card: CardId,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    },
    CreateLayout(String),
    SaveLayout,
    SwitchLayout(String),
    DeleteLayout(String),
}

/// Whether the durable write that followed a transition went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    NotNeeded,
    Written,
    Failed(LayoutError),
}

pub struct Workspace {
    dashboard: Dashboard,
    book: LayoutBook,
    storage: Box<dyn LayoutStoragePort>,
    notifier: Box<dyn NotificationPort>,
}

impl Workspace {
    /// Read the stored record and bring up the active layout.
    ///
    /// An unreadable record is logged and replaced by a fresh `"Default"`
    /// layout seeded from the empty dashboard.
    pub fn open(
        grid: GridSpec,
        catalog: WidgetCatalog,
        storage: Box<dyn LayoutStoragePort>,
        notifier: Box<dyn NotificationPort>,
    ) -> Self {
        let mut dashboard = Dashboard::new(grid, catalog);

        let mut book = match storage.load() {
            Ok(Some(record)) => {
                let (book, skipped) = LayoutBook::from_record(record);
                for line in skipped {
                    warn!("skipped stored data: {}", line);
                }
                book
            }
            Ok(None) => LayoutBook::new(),
            Err(e) => {
                warn!(error = %e, "could not read stored layouts, starting fresh");
                LayoutBook::new()
            }
        };
        book.seed(&dashboard);
        for repair in book.load_active(&mut dashboard) {
            warn!(layout = %book.active_name(), "repaired layout: {}", repair);
        }
        dashboard.mount();
        info!(
            layout = %book.active_name(),
            layouts = book.len(),
            cards = dashboard.card_count(),
            "workspace opened"
        );

        Workspace {
            dashboard,
            book,
            storage,
            notifier,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn layouts(&self) -> &LayoutBook {
        &self.book
    }

    pub fn active_layout(&self) -> &str {
        self.book.active_name()
    }

    /// Run a dashboard command and forward its notifications.
    pub fn dispatch(&mut self, command: Command) -> Result<Effect, LayoutError> {
        let dispatch = self.dashboard.dispatch(command);
        for notification in &dispatch.notifications {
            self.notifier.notify(notification);
        }
        dispatch.outcome
    }

    pub fn create_layout(&mut self, name: &str) -> Result<WriteStatus, LayoutError> {
        let snapshot = self.dashboard.snapshot();
        match self.book.create(name, snapshot, &mut self.dashboard) {
            Ok(name) => {
                self.notify(Notification::success(format!("Layout \"{}\" created", name)));
                Ok(self.persist())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn save_layout(&mut self) -> Result<WriteStatus, LayoutError> {
        let name = self.book.save(&self.dashboard);
        self.notify(Notification::success(format!("Layout \"{}\" saved", name)));
        Ok(self.persist())
    }

    pub fn switch_layout(&mut self, name: &str) -> Result<WriteStatus, LayoutError> {
        match self.book.switch(name, &mut self.dashboard) {
            Ok(()) => {
                let message = format!("Switched to layout \"{}\"", self.book.active_name());
                self.notify(Notification::info(message));
                Ok(WriteStatus::NotNeeded)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn delete_layout(&mut self, name: &str) -> Result<WriteStatus, LayoutError> {
        match self.book.delete(name, &mut self.dashboard) {
            Ok(fell_back) => {
                let mut message = format!("Layout \"{}\" deleted", name.trim());
                if fell_back {
                    message.push_str(&format!("; now on \"{}\"", self.book.active_name()));
                }
                self.notify(Notification::info(message));
                Ok(self.persist())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Run one parsed action.
    pub fn perform(&mut self, action: Action) -> Result<WriteStatus, LayoutError> {
        let command = match action {
            Action::Add(widget) => Command::AddWidgetAsNewCard(widget),
            Action::Merge { card, widget } => Command::AddWidgetToGroup { card, widget },
            Action::Remove { card, widget } => Command::RemoveWidgetFromGroup { card, widget },
            Action::Delete(card) => Command::DeleteCard(card),
            Action::Tab { card, widget } => Command::SetActiveTab { card, widget },
            Action::Move { card, x, y, w, h } => Command::Reflow(self.moved(&card, x, y, w, h)?),
            Action::CreateLayout(name) => return self.create_layout(&name),
            Action::SaveLayout => return self.save_layout(),
            Action::SwitchLayout(name) => return self.switch_layout(&name),
            Action::DeleteLayout(name) => return self.delete_layout(&name),
        };
        self.dispatch(command).map(|_| WriteStatus::NotNeeded)
    }

    /// Current geometry with one card's rectangle replaced, as the grid
    /// would report it after a drag or resize.
    fn moved(&self, card: &CardId, x: u32, y: u32, w: u32, h: u32) -> Result<Vec<CardGeometry>, LayoutError> {
        let mut rects = self.dashboard.geometry().to_vec();
        let rect = rects
            .iter_mut()
            .find(|g| &g.card_id == card)
            .ok_or_else(|| LayoutError::UnknownCard { card: card.clone() })?;
        rect.x = x;
        rect.y = y;
        rect.w = w;
        rect.h = h;
        Ok(rects)
    }

    fn persist(&self) -> WriteStatus {
        match self.storage.store(&self.book.to_record()) {
            Ok(()) => WriteStatus::Written,
            Err(e) => {
                warn!(error = %e, "layout write failed");
                let err = LayoutError::PersistenceWriteFailure {
                    reason: e.to_string(),
                };
                self.notify(Notification::error(err.to_string()));
                WriteStatus::Failed(err)
            }
        }
    }

    fn reject(&self, err: LayoutError) -> LayoutError {
        if !err.is_silent() {
            self.notify(Notification::warning(err.to_string()));
        }
        err
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(&notification);
    }
}
