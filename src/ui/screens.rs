use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::fetch_filaments;
use crate::models::{yes_no, Filament};

/// Column headings of the inventory table.
pub(crate) const INVENTORY_HEADERS: [&str; 8] = [
    "ID",
    "Brand",
    "Material",
    "Color",
    "Weight",
    "Date Opened",
    "Open",
    "Empty",
];

/// Shown as the only row when the store holds nothing yet.
pub(crate) const EMPTY_INVENTORY_ROW: [&str; 8] =
    ["no", "filaments", "in", "the", "current", "database", "", ""];

/// Top-level actions offered on the menu screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MenuAction {
    AddFilament,
    UpdateInventory,
    ViewInventory,
    Exit,
}

impl MenuAction {
    pub(crate) const ALL: [MenuAction; 4] = [
        MenuAction::AddFilament,
        MenuAction::UpdateInventory,
        MenuAction::ViewInventory,
        MenuAction::Exit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuAction::AddFilament => "Add Filament",
            MenuAction::UpdateInventory => "Update Inventory",
            MenuAction::ViewInventory => "View Inventory",
            MenuAction::Exit => "Exit",
        }
    }

    /// Single-key shortcut shown next to the label.
    pub(crate) fn hotkey(self) -> char {
        match self {
            MenuAction::AddFilament => 'a',
            MenuAction::UpdateInventory => 'u',
            MenuAction::ViewInventory => 'v',
            MenuAction::Exit => 'x',
        }
    }

    pub(crate) fn from_hotkey(ch: char) -> Option<Self> {
        let lower = ch.to_ascii_lowercase();
        Self::ALL.into_iter().find(|action| action.hotkey() == lower)
    }
}

#[derive(Default)]
pub(crate) struct MainMenu {
    pub(crate) selected: usize,
}

impl MainMenu {
    pub(crate) fn current(&self) -> MenuAction {
        MenuAction::ALL[self.selected.min(MenuAction::ALL.len() - 1)]
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = MenuAction::ALL.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }
}

/// Read-only table of every stored spool.
pub(crate) struct InventoryView {
    pub(crate) rows: Vec<[String; 8]>,
    pub(crate) selected: usize,
    pub(crate) is_placeholder: bool,
}

impl InventoryView {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let filaments = fetch_filaments(conn).context("failed to load inventory")?;
        Ok(Self::from_filaments(&filaments))
    }

    pub(crate) fn from_filaments(filaments: &[Filament]) -> Self {
        if filaments.is_empty() {
            return Self {
                rows: vec![EMPTY_INVENTORY_ROW.map(String::from)],
                selected: 0,
                is_placeholder: true,
            };
        }

        Self {
            rows: filaments.iter().map(inventory_row).collect(),
            selected: 0,
            is_placeholder: false,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }
}

fn inventory_row(filament: &Filament) -> [String; 8] {
    [
        filament.id.clone(),
        filament.brand.clone(),
        filament.material.clone(),
        filament.color.clone(),
        filament.weight.to_string(),
        filament.date_opened.format("%Y-%m-%d").to_string(),
        yes_no(filament.open).to_string(),
        yes_no(filament.empty).to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ensure_schema, insert_filament};
    use chrono::NaiveDate;

    #[test]
    fn empty_store_renders_placeholder_row() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let view = InventoryView::load(&conn).unwrap();
        assert!(view.is_placeholder);
        assert_eq!(view.rows, vec![EMPTY_INVENTORY_ROW.map(String::from)]);
    }

    #[test]
    fn rows_follow_store_order_with_yes_no_flags() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        for (id, empty, open) in [("bbbbbbbb", true, false), ("aaaaaaaa", false, true)] {
            insert_filament(
                &conn,
                &Filament {
                    id: id.into(),
                    brand: "Sunlu".into(),
                    material: "TPU".into(),
                    color: "Clear".into(),
                    weight: 250.5,
                    date_opened: date,
                    empty,
                    open,
                },
            )
            .unwrap();
        }

        let view = InventoryView::load(&conn).unwrap();
        assert!(!view.is_placeholder);
        assert_eq!(
            view.rows[0],
            ["bbbbbbbb", "Sunlu", "TPU", "Clear", "250.5", "2025-02-03", "No", "Yes"]
                .map(String::from)
        );
        assert_eq!(view.rows[1][0], "aaaaaaaa");
        assert_eq!(view.rows[1][6], "Yes");
        assert_eq!(view.rows[1][7], "No");
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut menu = MainMenu::default();
        menu.move_selection(-1);
        assert_eq!(menu.current(), MenuAction::AddFilament);
        menu.move_selection(10);
        assert_eq!(menu.current(), MenuAction::Exit);

        let mut view = InventoryView::from_filaments(&[]);
        view.move_selection(5);
        assert_eq!(view.selected, 0);
        view.select_last();
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn hotkeys_are_case_insensitive() {
        assert_eq!(MenuAction::from_hotkey('V'), Some(MenuAction::ViewInventory));
        assert_eq!(MenuAction::from_hotkey('u'), Some(MenuAction::UpdateInventory));
        assert_eq!(MenuAction::from_hotkey('z'), None);
    }
}
