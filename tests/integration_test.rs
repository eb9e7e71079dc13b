//! Integration tests for the workspace: dashboard commands, named layouts
//! and their durable record.
//!
//! Tests cover:
//! - Add, merge and split of widget groups through the workspace
//! - Duplicate placement rejection and silent stale references
//! - Layout lifecycle: create, protected delete, fallback on delete
//! - Save then switch restores the saved state exactly
//! - Failed writes keep the in-memory transition
//! - Startup seeding of the "Default" layout
//! - Sanitisation of inconsistent stored records
//! - Coordinates at the edge of the row range
//! - JSON file storage end to end, including malformed layouts

mod common;

use common::*;
use tradeboard::domain::dashboard::{Command, Effect};
use tradeboard::domain::error::LayoutError;
use tradeboard::domain::geometry::ROW_LIMIT;
use tradeboard::domain::layouts::DEFAULT_LAYOUT;
use tradeboard::domain::notification::Level;
use tradeboard::domain::widget::WidgetId;
use tradeboard::domain::workspace::{Action, WriteStatus};

mod dashboard_scenarios {
    use super::*;

    #[test]
    fn add_merge_and_split() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);

        let effect = ws.dispatch(Command::AddWidgetAsNewCard(WidgetId::Chart)).unwrap();
        let c1 = match effect {
            Effect::CardAdded { card, widget } => {
                assert_eq!(widget, WidgetId::Chart);
                card
            }
            other => panic!("expected CardAdded, got {other:?}"),
        };
        assert_eq!(widgets_of(ws.dashboard(), c1.as_str()), vec![WidgetId::Chart]);

        ws.dispatch(Command::AddWidgetToGroup {
            card: c1.clone(),
            widget: WidgetId::News,
        })
        .unwrap();
        assert_eq!(
            widgets_of(ws.dashboard(), c1.as_str()),
            vec![WidgetId::Chart, WidgetId::News]
        );
        assert_eq!(ws.dashboard().active_tab(&c1), Some(WidgetId::News));

        ws.dispatch(Command::RemoveWidgetFromGroup {
            card: c1.clone(),
            widget: WidgetId::Chart,
        })
        .unwrap();
        assert_eq!(widgets_of(ws.dashboard(), c1.as_str()), vec![WidgetId::News]);
        assert_eq!(ws.dashboard().active_tab(&c1), Some(WidgetId::News));

        let effect = ws
            .dispatch(Command::RemoveWidgetFromGroup {
                card: c1.clone(),
                widget: WidgetId::News,
            })
            .unwrap();
        assert!(matches!(
            effect,
            Effect::WidgetRemoved {
                card_removed: true,
                ..
            }
        ));
        assert_eq!(ws.dashboard().card_count(), 0);
        assert!(geometry_of(ws.dashboard(), c1.as_str()).is_none());
        assert_eq!(ws.dashboard().active_tab(&c1), None);
    }

    #[test]
    fn duplicate_placement_is_rejected_with_warning() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        let before = ws.dashboard().snapshot();

        let err = ws.perform(Action::Add(WidgetId::Chart)).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::DuplicatePlacement {
                widget: WidgetId::Chart,
                ..
            }
        ));
        assert_eq!(ws.dashboard().snapshot(), before);
        assert_eq!(
            notifier.at(Level::Warning),
            vec!["Chart is already on the dashboard".to_string()]
        );
    }

    #[test]
    fn merging_a_placed_widget_is_rejected() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Add(WidgetId::News)).unwrap();

        let err = ws
            .perform(Action::Merge {
                card: card("card-1"),
                widget: WidgetId::News,
            })
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicatePlacement { .. }));
        assert_eq!(widgets_of(ws.dashboard(), "card-1"), vec![WidgetId::Chart]);
        assert_eq!(notifier.at(Level::Warning).len(), 1);
    }

    #[test]
    fn stale_references_are_silent() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();

        assert!(ws.perform(Action::Delete(card("card-9"))).is_err());
        assert!(
            ws.perform(Action::Tab {
                card: card("card-1"),
                widget: WidgetId::News
            })
            .is_err()
        );
        assert!(
            ws.perform(Action::Remove {
                card: card("card-1"),
                widget: WidgetId::Orders
            })
            .is_err()
        );
        assert!(notifier.all().is_empty());
        assert_eq!(ws.dashboard().card_count(), 1);
    }

    #[test]
    fn delete_card_reports_its_widgets() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Merge {
            card: card("card-1"),
            widget: WidgetId::News,
        })
        .unwrap();

        ws.perform(Action::Delete(card("card-1"))).unwrap();
        assert_eq!(ws.dashboard().card_count(), 0);
        assert_eq!(
            notifier.at(Level::Info),
            vec!["Card deleted (Chart, News)".to_string()]
        );
        // the widgets are free again
        ws.perform(Action::Add(WidgetId::News)).unwrap();
        assert_eq!(ws.dashboard().card_count(), 1);
    }

    #[test]
    fn new_cards_stack_below_existing_ones() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Add(WidgetId::News)).unwrap();

        let first = geometry_of(ws.dashboard(), "card-1").unwrap();
        let second = geometry_of(ws.dashboard(), "card-2").unwrap();
        assert_eq!((first.x, first.y, first.w, first.h), (0, 0, 4, 6));
        assert_eq!((second.x, second.y), (0, 6));
    }

    #[test]
    fn move_is_clamped_to_the_grid() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();

        ws.perform(Action::Move {
            card: card("card-1"),
            x: 10,
            y: 2,
            w: 6,
            h: 1,
        })
        .unwrap();
        let g = geometry_of(ws.dashboard(), "card-1").unwrap();
        assert_eq!((g.x, g.y, g.w, g.h), (6, 2, 6, 3));
        assert!(ws.dashboard().check_invariants().is_ok());
    }

    #[test]
    fn move_to_a_far_row_leaves_room_for_new_cards() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Move {
            card: card("card-1"),
            x: 0,
            y: u32::MAX,
            w: 4,
            h: 6,
        })
        .unwrap();
        assert_eq!(geometry_of(ws.dashboard(), "card-1").unwrap().y, ROW_LIMIT - 6);

        ws.perform(Action::Add(WidgetId::News)).unwrap();
        let added = geometry_of(ws.dashboard(), "card-2").unwrap();
        assert_eq!(added.bottom(), ROW_LIMIT);
        assert!(ws.dashboard().check_invariants().is_ok());
    }

    #[test]
    fn dashboard_edits_are_not_written() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Delete(card("card-1"))).unwrap();
        assert_eq!(storage.writes(), 0);
    }
}

mod layout_lifecycle {
    use super::*;

    #[test]
    fn create_protected_delete_and_fallback() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();

        let status = ws.perform(Action::CreateLayout("Scalping".into())).unwrap();
        assert_eq!(status, WriteStatus::Written);
        assert_eq!(ws.active_layout(), "Scalping");
        assert_eq!(storage.record().unwrap().active_layout, "Scalping");

        let err = ws.perform(Action::DeleteLayout(DEFAULT_LAYOUT.into())).unwrap_err();
        assert!(matches!(err, LayoutError::ProtectedLayoutDeletion { .. }));
        assert_eq!(ws.active_layout(), "Scalping");
        assert_eq!(notifier.at(Level::Warning).len(), 1);
        assert_eq!(storage.writes(), 1);

        let status = ws.perform(Action::DeleteLayout("Scalping".into())).unwrap();
        assert_eq!(status, WriteStatus::Written);
        assert_eq!(ws.active_layout(), DEFAULT_LAYOUT);
        // Default was seeded from the empty dashboard
        assert_eq!(ws.dashboard().card_count(), 0);
        assert!(!ws.layouts().contains("Scalping"));

        let record = storage.record().unwrap();
        assert_eq!(record.active_layout, DEFAULT_LAYOUT);
        assert_eq!(record.layouts.len(), 1);
    }

    #[test]
    fn deleting_an_inactive_layout_keeps_the_dashboard() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.create_layout("Swing").unwrap();
        ws.perform(Action::Add(WidgetId::Watchlist)).unwrap();
        ws.create_layout("Scalping").unwrap();

        ws.delete_layout("Swing").unwrap();
        assert_eq!(ws.active_layout(), "Scalping");
        assert_eq!(ws.dashboard().card_count(), 1);
    }

    #[test]
    fn duplicate_and_blank_names_are_rejected() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.create_layout("Scalping").unwrap();

        assert!(matches!(
            ws.create_layout("  Scalping "),
            Err(LayoutError::DuplicateLayoutName { .. })
        ));
        assert!(matches!(
            ws.create_layout(DEFAULT_LAYOUT),
            Err(LayoutError::DuplicateLayoutName { .. })
        ));
        assert!(matches!(
            ws.create_layout("   "),
            Err(LayoutError::InvalidLayoutName { .. })
        ));
        assert_eq!(ws.layouts().len(), 2);
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn save_then_switch_restores_saved_state() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Merge {
            card: card("card-1"),
            widget: WidgetId::News,
        })
        .unwrap();
        ws.perform(Action::Add(WidgetId::Positions)).unwrap();
        ws.perform(Action::Move {
            card: card("card-2"),
            x: 4,
            y: 0,
            w: 8,
            h: 6,
        })
        .unwrap();
        ws.save_layout().unwrap();
        let saved = ws.dashboard().snapshot();

        ws.create_layout("Scratch").unwrap();
        ws.perform(Action::Delete(card("card-1"))).unwrap();
        ws.perform(Action::Add(WidgetId::Orders)).unwrap();
        assert_ne!(ws.dashboard().snapshot(), saved);

        ws.switch_layout(DEFAULT_LAYOUT).unwrap();
        assert_eq!(ws.dashboard().snapshot(), saved);
    }

    #[test]
    fn unsaved_edits_are_lost_on_switch() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.create_layout("Swing").unwrap();
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();

        ws.switch_layout(DEFAULT_LAYOUT).unwrap();
        ws.switch_layout("Swing").unwrap();
        assert_eq!(ws.dashboard().card_count(), 0);
    }

    #[test]
    fn switch_does_not_write() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        ws.create_layout("Swing").unwrap();
        let writes = storage.writes();

        let status = ws.switch_layout(DEFAULT_LAYOUT).unwrap();
        assert_eq!(status, WriteStatus::NotNeeded);
        assert_eq!(storage.writes(), writes);
        assert_eq!(storage.record().unwrap().active_layout, "Swing");
        assert!(
            notifier
                .at(Level::Info)
                .contains(&"Switched to layout \"Default\"".to_string())
        );
    }

    #[test]
    fn switch_to_unknown_layout_is_silent() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, notifier) = open_workspace(&storage);
        assert!(matches!(
            ws.switch_layout("Nope"),
            Err(LayoutError::UnknownLayout { .. })
        ));
        assert_eq!(ws.active_layout(), DEFAULT_LAYOUT);
        assert!(notifier.all().is_empty());
    }

    #[test]
    fn failed_write_keeps_the_transition() {
        let storage = MemoryStorageAdapter::new();
        storage.fail_writes(true);
        let (mut ws, notifier) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();

        let status = ws.create_layout("Scalping").unwrap();
        assert!(matches!(
            status,
            WriteStatus::Failed(LayoutError::PersistenceWriteFailure { .. })
        ));
        assert_eq!(ws.active_layout(), "Scalping");
        assert!(ws.layouts().contains("Scalping"));
        assert_eq!(ws.dashboard().card_count(), 1);
        assert_eq!(storage.record(), None);

        let errors = notifier.at(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("may not survive a reload"));

        // the next successful write carries everything
        storage.fail_writes(false);
        assert_eq!(ws.save_layout().unwrap(), WriteStatus::Written);
        let record = storage.record().unwrap();
        assert_eq!(record.active_layout, "Scalping");
        assert!(record.layouts.contains_key("Scalping"));
    }
}

mod startup {
    use super::*;

    #[test]
    fn empty_storage_seeds_default() {
        let storage = MemoryStorageAdapter::new();
        let (ws, _) = open_workspace(&storage);
        assert_eq!(ws.active_layout(), DEFAULT_LAYOUT);
        assert_eq!(ws.layouts().names().collect::<Vec<_>>(), vec![DEFAULT_LAYOUT]);
        assert_eq!(ws.dashboard().card_count(), 0);
        assert!(ws.dashboard().is_mounted());
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn missing_default_is_copied_from_active() {
        let swing = snapshot_record(
            vec![rect_record("card-1", 0, 0, 4, 6)],
            &[("card-1", &["watchlist"])],
        );
        let storage =
            MemoryStorageAdapter::with_record(layout_record("Swing", vec![("Swing", swing)]));
        let (ws, _) = open_workspace(&storage);

        assert_eq!(ws.active_layout(), "Swing");
        assert_eq!(ws.layouts().len(), 2);
        assert_eq!(ws.layouts().get(DEFAULT_LAYOUT), ws.layouts().get("Swing"));
        assert_eq!(widgets_of(ws.dashboard(), "card-1"), vec![WidgetId::Watchlist]);
    }

    #[test]
    fn dangling_active_name_falls_back_to_default() {
        let default = snapshot_record(
            vec![rect_record("card-1", 0, 0, 4, 6)],
            &[("card-1", &["chart"])],
        );
        let storage = MemoryStorageAdapter::with_record(layout_record(
            "Gone",
            vec![(DEFAULT_LAYOUT, default)],
        ));
        let (ws, _) = open_workspace(&storage);

        assert_eq!(ws.active_layout(), DEFAULT_LAYOUT);
        assert_eq!(widgets_of(ws.dashboard(), "card-1"), vec![WidgetId::Chart]);
    }

    #[test]
    fn unreadable_storage_starts_fresh() {
        let storage = MemoryStorageAdapter::new();
        storage.fail_reads(true);
        let (ws, _) = open_workspace(&storage);
        assert_eq!(ws.active_layout(), DEFAULT_LAYOUT);
        assert_eq!(ws.layouts().len(), 1);
        assert_eq!(ws.dashboard().card_count(), 0);
    }

    #[test]
    fn saved_workspace_reopens_identically() {
        let storage = MemoryStorageAdapter::new();
        let (mut ws, _) = open_workspace(&storage);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Add(WidgetId::OrderTicket)).unwrap();
        ws.create_layout("Scalping").unwrap();
        let expected = ws.dashboard().snapshot();
        drop(ws);

        let (reopened, _) = open_workspace(&storage);
        assert_eq!(reopened.active_layout(), "Scalping");
        assert_eq!(reopened.dashboard().snapshot(), expected);
    }
}

mod sanitisation {
    use super::*;

    #[test]
    fn inconsistent_record_is_repaired_on_load() {
        let snapshot = snapshot_record(
            vec![
                rect_record("card-1", 0, 0, 4, 6),
                rect_record("card-2", 3, 6, 30, 6),
                rect_record("card-9", 0, 40, 4, 6),
            ],
            &[
                ("card-1", &["chart", "news"]),
                ("card-2", &["chart", "positions"]),
                ("card-3", &["orders"]),
                ("card-4", &[]),
                ("card-5", &["ticker"]),
            ],
        );
        let storage = MemoryStorageAdapter::with_record(layout_record(
            DEFAULT_LAYOUT,
            vec![(DEFAULT_LAYOUT, snapshot)],
        ));
        let (mut ws, _) = open_workspace(&storage);
        let d = ws.dashboard();

        assert!(d.check_invariants().is_ok());
        assert_eq!(d.card_count(), 3);
        assert_eq!(widgets_of(d, "card-1"), vec![WidgetId::Chart, WidgetId::News]);
        assert_eq!(widgets_of(d, "card-2"), vec![WidgetId::Positions]);
        assert_eq!(widgets_of(d, "card-3"), vec![WidgetId::Orders]);
        assert!(geometry_of(d, "card-9").is_none());

        let wide = geometry_of(d, "card-2").unwrap();
        assert_eq!((wide.x, wide.w), (0, 12));
        let placed = geometry_of(d, "card-3").unwrap();
        assert_eq!((placed.x, placed.y), (0, 12));

        // new ids continue past the loaded ones
        match ws.dispatch(Command::AddWidgetAsNewCard(WidgetId::History)).unwrap() {
            Effect::CardAdded { card, .. } => assert_eq!(card.as_str(), "card-4"),
            other => panic!("expected CardAdded, got {other:?}"),
        }
        assert_eq!(geometry_of(ws.dashboard(), "card-4").unwrap().y, 18);
    }

    #[test]
    fn record_with_extreme_rows_opens() {
        let snapshot = snapshot_record(
            vec![rect_record("card-1", 0, u32::MAX, 4, u32::MAX)],
            &[("card-1", &["chart"]), ("card-2", &["news"])],
        );
        let storage = MemoryStorageAdapter::with_record(layout_record(
            DEFAULT_LAYOUT,
            vec![(DEFAULT_LAYOUT, snapshot)],
        ));
        let (mut ws, _) = open_workspace(&storage);
        let d = ws.dashboard();

        assert!(d.check_invariants().is_ok());
        assert_eq!(geometry_of(d, "card-1").unwrap().bottom(), ROW_LIMIT);
        assert!(geometry_of(d, "card-2").unwrap().bottom() <= ROW_LIMIT);

        ws.perform(Action::Add(WidgetId::Orders)).unwrap();
        assert!(ws.dashboard().check_invariants().is_ok());
    }

    #[test]
    fn record_json_with_unknown_fields_loads() {
        let json = r#"{
            "activeLayout": "Default",
            "layouts": {
                "Default": {
                    "layouts": [{ "i": "card-1", "x": 0, "y": 0, "w": 4, "h": 6, "moved": false }],
                    "widgetGroups": { "card-1": ["account"] }
                }
            }
        }"#;
        let record = serde_json::from_str(json).unwrap();
        let storage = MemoryStorageAdapter::with_record(record);
        let (ws, _) = open_workspace(&storage);
        assert_eq!(
            widgets_of(ws.dashboard(), "card-1"),
            vec![WidgetId::AccountDetails]
        );
    }
}

mod json_storage {
    use super::*;
    use tempfile::TempDir;
    use tradeboard::adapters::json_file_adapter::{DEFAULT_STORAGE_KEY, JsonFileAdapter};
    use tradeboard::domain::geometry::GridSpec;
    use tradeboard::domain::widget::WidgetCatalog;
    use tradeboard::domain::workspace::Workspace;

    fn open(path: &std::path::Path) -> Workspace {
        Workspace::open(
            GridSpec::default(),
            WidgetCatalog::placeholder(),
            Box::new(JsonFileAdapter::new(path, DEFAULT_STORAGE_KEY)),
            Box::new(RecordingNotifier::new()),
        )
    }

    #[test]
    fn layouts_survive_a_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts.json");

        let mut ws = open(&path);
        ws.perform(Action::Add(WidgetId::Chart)).unwrap();
        ws.perform(Action::Merge {
            card: card("card-1"),
            widget: WidgetId::News,
        })
        .unwrap();
        ws.perform(Action::CreateLayout("Scalping".into())).unwrap();
        let expected = ws.dashboard().snapshot();
        drop(ws);

        let reopened = open(&path);
        assert_eq!(reopened.active_layout(), "Scalping");
        assert_eq!(reopened.dashboard().snapshot(), expected);

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value[DEFAULT_STORAGE_KEY]["layouts"]["Scalping"]["widgetGroups"]["card-1"],
            serde_json::json!(["chart", "news"])
        );
    }

    #[test]
    fn corrupt_file_starts_fresh_and_is_replaced_on_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts.json");
        std::fs::write(&path, "{ broken").unwrap();

        let mut ws = open(&path);
        assert_eq!(ws.active_layout(), DEFAULT_LAYOUT);
        assert_eq!(ws.save_layout().unwrap(), WriteStatus::Written);

        let reopened = open(&path);
        assert_eq!(reopened.layouts().len(), 1);
        assert_eq!(backups(dir.path()).len(), 1);
    }

    fn backups(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".bak."))
            .collect()
    }

    #[test]
    fn malformed_layout_does_not_cost_the_others() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("layouts.json");
        let stored = r#"{ "tradeboard.layouts": {
            "activeLayout": "Default",
            "layouts": {
                "Default": {
                    "layouts": [{ "i": "card-1", "x": 0, "y": 0, "w": 4, "h": 6 }],
                    "widgetGroups": { "card-1": ["chart"] }
                },
                "Scalping": {
                    "layouts": [
                        { "i": "card-1", "x": -1, "y": 0, "w": 4, "h": 6 },
                        { "i": "card-2", "x": 0, "y": null, "w": 4, "h": 6 }
                    ],
                    "widgetGroups": { "card-1": ["order-ticket"], "card-2": ["positions"] }
                },
                "Swing": {
                    "layouts": [{ "i": "card-1", "x": 0, "y": 0, "w": 6, "h": 6 }],
                    "widgetGroups": { "card-1": ["watchlist"] }
                },
                "Broken": { "layouts": "oops", "widgetGroups": {} }
            }
        } }"#;
        std::fs::write(&path, stored).unwrap();

        let mut ws = open(&path);
        let names: Vec<&str> = ws.layouts().names().collect();
        assert_eq!(names, vec!["Default", "Scalping", "Swing"]);
        assert_eq!(widgets_of(ws.dashboard(), "card-1"), vec![WidgetId::Chart]);

        ws.perform(Action::SwitchLayout("Scalping".into())).unwrap();
        let d = ws.dashboard();
        assert!(d.check_invariants().is_ok());
        assert_eq!(geometry_of(d, "card-1").unwrap().x, 0);
        assert_eq!(geometry_of(d, "card-2").unwrap().y, 6);

        ws.perform(Action::SwitchLayout("Default".into())).unwrap();
        ws.perform(Action::Add(WidgetId::News)).unwrap();
        assert_eq!(ws.save_layout().unwrap(), WriteStatus::Written);

        let backups = backups(dir.path());
        assert_eq!(backups.len(), 1);
        assert!(std::fs::read_to_string(&backups[0]).unwrap().contains("Broken"));

        let reopened = open(&path);
        let names: Vec<&str> = reopened.layouts().names().collect();
        assert_eq!(names, vec!["Default", "Scalping", "Swing"]);
        assert_eq!(widgets_of(reopened.dashboard(), "card-1"), vec![WidgetId::Chart]);
        assert_eq!(widgets_of(reopened.dashboard(), "card-2"), vec![WidgetId::News]);
    }
}
