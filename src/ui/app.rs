//! Application shell. Routes key presses to the mounted screen and persists
//! completed forms.

use std::mem;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::{
    fetch_filament_ids, filament_exists, generate_unique_id, get_filament, insert_filament,
    upsert_filament,
};
use crate::models::Filament;

use super::forms::{FilamentForm, FormField, FormKind, SubmitOutcome};
use super::helpers::{centered_rect, clamped_cursor, key_hints};
use super::screens::{InventoryView, MainMenu, MenuAction, INVENTORY_HEADERS};

/// Header line with the title and version.
const HEADER_HEIGHT: u16 = 1;
/// Footer space reserved for notices and instructions.
const FOOTER_HEIGHT: u16 = 3;
const APP_TITLE: &str = "Filament Manager";

/// What is mounted on top of the menu. At most one form or view at a time.
enum Screen {
    Menu,
    Addition(FilamentForm),
    Update(FilamentForm),
    Inventory(InventoryView),
}

/// Completed submissions handed from a form to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Message {
    AdditionSubmitted(Filament),
    UpdateSubmitted(Filament),
}

/// Transient notice shown in the footer until the next key press.
struct Notice {
    text: String,
    kind: NoticeKind,
}

/// Severity levels shown in the footer.
enum NoticeKind {
    Info,
    Error,
}

impl NoticeKind {
    fn style(&self) -> Style {
        match self {
            NoticeKind::Info => Style::default().fg(Color::Green),
            NoticeKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the one store session, the configuration, and
/// whichever screen is mounted.
pub struct App {
    conn: Connection,
    config: Config,
    menu: MainMenu,
    screen: Screen,
    notice: Option<Notice>,
    /// Last saved record, kept on the menu until the next save.
    confirmation: Option<String>,
}

impl App {
    pub fn new(conn: Connection, config: Config) -> Self {
        Self {
            conn,
            config,
            menu: MainMenu::default(),
            screen: Screen::Menu,
            notice: None,
            confirmation: None,
        }
    }

    /// Route one key press. Returns `true` once the user asked to exit. Store
    /// failures come back as `Err` and end the session.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        self.notice = None;
        let screen = mem::replace(&mut self.screen, Screen::Menu);

        self.screen = match screen {
            Screen::Menu => self.handle_menu_key(code, &mut exit)?,
            Screen::Addition(form) | Screen::Update(form) => self.handle_form_key(code, form)?,
            Screen::Inventory(view) => self.handle_inventory_key(code, view),
        };

        Ok(exit)
    }

    fn handle_menu_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Screen> {
        let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(MenuAction::Exit),
            KeyCode::Up => {
                self.menu.move_selection(-1);
                None
            }
            KeyCode::Down => {
                self.menu.move_selection(1);
                None
            }
            KeyCode::Enter => Some(self.menu.current()),
            KeyCode::Char(ch) => MenuAction::from_hotkey(ch),
            _ => None,
        };

        match action {
            Some(MenuAction::Exit) => {
                info!("exit requested");
                *exit = true;
                Ok(Screen::Menu)
            }
            Some(action) => self.mount(action),
            None => Ok(Screen::Menu),
        }
    }

    fn mount(&mut self, action: MenuAction) -> Result<Screen> {
        debug!(screen = action.label(), "mounting screen");
        let screen = match action {
            MenuAction::AddFilament => Screen::Addition(FilamentForm::addition(&self.config)),
            MenuAction::UpdateInventory => {
                let ids = fetch_filament_ids(&self.conn)?;
                if ids.is_empty() {
                    self.set_notice("No filaments to update yet.", NoticeKind::Info);
                }
                Screen::Update(FilamentForm::update(&self.config, ids))
            }
            MenuAction::ViewInventory => Screen::Inventory(InventoryView::load(&self.conn)?),
            MenuAction::Exit => Screen::Menu,
        };
        Ok(screen)
    }

    fn handle_form_key(&mut self, code: KeyCode, mut form: FilamentForm) -> Result<Screen> {
        match code {
            KeyCode::Esc => {
                debug!(kind = ?form.kind, "form dismissed");
                let text = match form.kind {
                    FormKind::Addition => "Addition cancelled.",
                    FormKind::Update => "Update cancelled.",
                };
                self.set_notice(text, NoticeKind::Info);
                return Ok(Screen::Menu);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left | KeyCode::Right => {
                let delta = if code == KeyCode::Left { -1 } else { 1 };
                if form.cycle_choice(delta) == Some(FormField::Id) {
                    self.load_selected_record(&mut form)?;
                }
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.submit_form(form),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }

        Ok(form_screen(form))
    }

    /// Pre-fill the update form from the selected identifier. A miss leaves the
    /// fields as they were and only raises a notice.
    fn load_selected_record(&mut self, form: &mut FilamentForm) -> Result<()> {
        let Some(id) = form.selected_id().map(str::to_owned) else {
            return Ok(());
        };

        match get_filament(&self.conn, &id)? {
            Some(filament) => {
                form.fill_from(&filament);
                self.set_notice("Found existing record!", NoticeKind::Info);
            }
            None => {
                warn!(%id, "selected filament not found");
                self.set_notice(format!("No filament with ID {id}."), NoticeKind::Error);
            }
        }
        Ok(())
    }

    fn submit_form(&mut self, mut form: FilamentForm) -> Result<Screen> {
        match form.submit(today()) {
            SubmitOutcome::Accepted(draft) => {
                let message = match form.kind {
                    FormKind::Addition => {
                        let id = generate_unique_id(&self.conn)?;
                        Message::AdditionSubmitted(draft.into_filament(id))
                    }
                    FormKind::Update => {
                        let id = draft
                            .id
                            .clone()
                            .ok_or_else(|| anyhow!("update accepted without an ID"))?;
                        if !filament_exists(&self.conn, &id)? {
                            warn!(%id, "update target vanished");
                            self.set_notice(
                                format!("No filament with ID {id}."),
                                NoticeKind::Error,
                            );
                            return Ok(form_screen(form));
                        }
                        Message::UpdateSubmitted(draft.into_filament(id))
                    }
                };
                self.dispatch(message)?;
                Ok(Screen::Menu)
            }
            SubmitOutcome::Warned(err) => {
                debug!(%err, "submission rejected");
                self.set_notice(
                    format!("{err}! Press Enter again to close the form."),
                    NoticeKind::Error,
                );
                Ok(form_screen(form))
            }
            SubmitOutcome::Dismissed(err) => {
                debug!(%err, "submission rejected twice, closing form");
                self.set_notice(format!("{err}. Form closed."), NoticeKind::Error);
                Ok(Screen::Menu)
            }
        }
    }

    /// Persist a completed submission and record the confirmation.
    pub(crate) fn dispatch(&mut self, message: Message) -> Result<()> {
        match message {
            Message::AdditionSubmitted(filament) => {
                insert_filament(&self.conn, &filament).inspect_err(|err| {
                    error!(id = %filament.id, "failed to add filament: {err:#}")
                })?;
                info!(id = %filament.id, "added filament");
                self.confirmation = Some(format!("Added {}", filament.summary()));
                self.set_notice("Filament added.", NoticeKind::Info);
            }
            Message::UpdateSubmitted(filament) => {
                upsert_filament(&self.conn, &filament).inspect_err(|err| {
                    error!(id = %filament.id, "failed to update filament: {err:#}")
                })?;
                info!(id = %filament.id, "updated filament");
                self.confirmation = Some(format!("Updated {}", filament.summary()));
                self.set_notice("Filament updated.", NoticeKind::Info);
            }
        }
        Ok(())
    }

    fn handle_inventory_key(&mut self, code: KeyCode, mut view: InventoryView) -> Screen {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b') | KeyCode::Char('q') => {
                return Screen::Menu;
            }
            KeyCode::Up => view.move_selection(-1),
            KeyCode::Down => view.move_selection(1),
            KeyCode::PageUp => view.move_selection(-10),
            KeyCode::PageDown => view.move_selection(10),
            KeyCode::Home => view.select_first(),
            KeyCode::End => view.select_last(),
            _ => {}
        }
        Screen::Inventory(view)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match &self.screen {
            Screen::Inventory(view) => self.draw_inventory(frame, chunks[1], view),
            _ => self.draw_menu(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.screen {
            Screen::Addition(form) => self.draw_form(frame, area, "Filament Addition", form),
            Screen::Update(form) => self.draw_form(frame, area, "Filament Update", form),
            Screen::Menu | Screen::Inventory(_) => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled(APP_TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", self.config.version),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), area);
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(MenuAction::ALL.len() as u16 + 2),
            ])
            .split(area);

        let confirmation = self
            .confirmation
            .clone()
            .unwrap_or_else(|| "Nothing saved yet this session.".to_string());
        let status = Paragraph::new(confirmation)
            .block(Block::default().title("Last Saved").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, chunks[0]);

        let items: Vec<ListItem> = MenuAction::ALL
            .iter()
            .map(|action| ListItem::new(format!("[{}] {}", action.hotkey(), action.label())))
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Menu").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.menu.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_inventory(&self, frame: &mut Frame, area: Rect, view: &InventoryView) {
        let header = Row::new(INVENTORY_HEADERS.iter().map(|title| Cell::from(*title)))
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = view.rows.iter().map(|row| {
            let style = if view.is_placeholder {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(row.iter().cloned().map(Cell::from)).style(style)
        });
        let widths = [
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title("Inventory").borders(Borders::ALL))
            .row_highlight_style(Style::default().fg(Color::Yellow));
        let mut state = TableState::default().with_selected(Some(view.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let notice_line = if let Some(notice) = &self.notice {
            Line::from(vec![Span::styled(notice.text.clone(), notice.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![notice_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match &self.screen {
            Screen::Menu => key_hints(&[
                ("↑↓", "Select"),
                ("Enter", "Open"),
                ("a/u/v", "Add / Update / View"),
                ("q", "Quit"),
            ]),
            Screen::Addition(_) | Screen::Update(_) => key_hints(&[
                ("Tab", "Next Field"),
                ("←→", "Change Choice"),
                ("Enter", "Submit"),
                ("Esc", "Cancel"),
            ]),
            Screen::Inventory(_) => key_hints(&[("↑↓", "Scroll"), ("Esc", "Back to Menu")]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &FilamentForm) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = form
            .fields()
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to submit • Tab to switch • ←→ to choose • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = form
            .fields()
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0);
        if let Some(len) = form.value_len(form.active) {
            let prefix = format!("{}: ", form.active.label()).len();
            frame.set_cursor_position(clamped_cursor(inner, prefix + len, row));
        }
    }

    fn set_notice<S: Into<String>>(&mut self, text: S, kind: NoticeKind) {
        self.notice = Some(Notice {
            text: text.into(),
            kind,
        });
    }
}

fn form_screen(form: FilamentForm) -> Screen {
    match form.kind {
        FormKind::Addition => Screen::Addition(form),
        FormKind::Update => Screen::Update(form),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
