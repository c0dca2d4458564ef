//! Addition and Update form state, plus the validation that turns the typed
//! text into a [`Filament`](crate::models::Filament).
//! A form that fails validation twice in a row is dismissed.

use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

use crate::config::Config;
use crate::models::{Filament, SpoolStatus};

/// Consecutive failed submissions after which the form closes itself.
const DISMISS_AFTER_FAILURES: u8 = 2;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which flow a form belongs to. The update flow adds the leading ID selector
/// and takes its identifier from it instead of generating one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormKind {
    Addition,
    Update,
}

/// Fields available within the filament form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    Id,
    Brand,
    Material,
    Color,
    Weight,
    Status,
    Date,
}

impl FormField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::Id => "ID",
            FormField::Brand => "Brand",
            FormField::Material => "Material",
            FormField::Color => "Color",
            FormField::Weight => "Weight (g)",
            FormField::Status => "Status",
            FormField::Date => "Date opened",
        }
    }

    fn is_choice(self) -> bool {
        matches!(
            self,
            FormField::Id | FormField::Brand | FormField::Material | FormField::Status
        )
    }
}

const ADDITION_FIELDS: &[FormField] = &[
    FormField::Brand,
    FormField::Material,
    FormField::Color,
    FormField::Weight,
    FormField::Status,
    FormField::Date,
];

const UPDATE_FIELDS: &[FormField] = &[
    FormField::Id,
    FormField::Brand,
    FormField::Material,
    FormField::Color,
    FormField::Weight,
    FormField::Status,
    FormField::Date,
];

/// Reasons a submission is rejected. The message doubles as the notice text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FormError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Weight must be a number of grams, got {0:?}")]
    InvalidWeight(String),
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A drop-down style picker. Position `None` is the blank prompt in front of
/// the options.
#[derive(Clone, Debug, Default)]
pub(crate) struct Choice {
    options: Vec<String>,
    selected: Option<usize>,
}

impl Choice {
    pub(crate) fn new(options: Vec<String>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    pub(crate) fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }

    /// Step through prompt + options, wrapping at both ends. Returns whether
    /// the selection moved.
    pub(crate) fn cycle(&mut self, delta: isize) -> bool {
        if self.options.is_empty() {
            return false;
        }
        let slots = self.options.len() as isize + 1;
        let current = self.selected.map_or(0, |idx| idx as isize + 1);
        let next = (current + delta).rem_euclid(slots);
        let before = self.selected;
        self.selected = if next == 0 {
            None
        } else {
            Some(next as usize - 1)
        };
        before != self.selected
    }

    /// Select `value`, appending it when it is no longer among the options so
    /// stored records still round-trip through the form.
    pub(crate) fn select(&mut self, value: &str) {
        let idx = match self.options.iter().position(|option| option == value) {
            Some(idx) => idx,
            None => {
                self.options.push(value.to_string());
                self.options.len() - 1
            }
        };
        self.selected = Some(idx);
    }
}

/// Validated form contents, ready to become a [`Filament`] once an identifier
/// is attached.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FilamentDraft {
    /// Selected identifier for updates, `None` for additions.
    pub(crate) id: Option<String>,
    pub(crate) brand: String,
    pub(crate) material: String,
    pub(crate) color: String,
    pub(crate) weight: f64,
    pub(crate) status: SpoolStatus,
    pub(crate) date_opened: NaiveDate,
}

impl FilamentDraft {
    pub(crate) fn into_filament(self, id: String) -> Filament {
        let (empty, open) = self.status.flags();
        Filament {
            id,
            brand: self.brand,
            material: self.material,
            color: self.color,
            weight: self.weight,
            date_opened: self.date_opened,
            empty,
            open,
        }
    }
}

/// Result of pressing submit.
#[derive(Debug)]
pub(crate) enum SubmitOutcome {
    Accepted(FilamentDraft),
    /// First failure: warn and keep the form open.
    Warned(FormError),
    /// Second consecutive failure: close the form.
    Dismissed(FormError),
}

/// State behind the add and update modals.
#[derive(Clone, Debug)]
pub(crate) struct FilamentForm {
    pub(crate) kind: FormKind,
    pub(crate) id: Choice,
    pub(crate) brand: Choice,
    pub(crate) material: Choice,
    pub(crate) color: String,
    pub(crate) weight: String,
    pub(crate) status: SpoolStatus,
    pub(crate) date: String,
    pub(crate) active: FormField,
    pub(crate) error: Option<String>,
    failed_attempts: u8,
}

impl FilamentForm {
    /// Blank form for a new spool.
    pub(crate) fn addition(config: &Config) -> Self {
        Self::blank(FormKind::Addition, config, Vec::new())
    }

    /// Blank form whose ID selector lists the identifiers currently stored.
    pub(crate) fn update(config: &Config, ids: Vec<String>) -> Self {
        Self::blank(FormKind::Update, config, ids)
    }

    fn blank(kind: FormKind, config: &Config, ids: Vec<String>) -> Self {
        let fields = fields_for(kind);
        Self {
            kind,
            id: Choice::new(ids),
            brand: Choice::new(config.brands.clone()),
            material: Choice::new(config.materials.clone()),
            color: String::new(),
            weight: String::new(),
            status: SpoolStatus::default(),
            date: String::new(),
            active: fields[0],
            error: None,
            failed_attempts: 0,
        }
    }

    pub(crate) fn fields(&self) -> &'static [FormField] {
        fields_for(self.kind)
    }

    pub(crate) fn selected_id(&self) -> Option<&str> {
        self.id.value()
    }

    /// Copy a stored record into the editable fields.
    pub(crate) fn fill_from(&mut self, filament: &Filament) {
        self.brand.select(&filament.brand);
        self.material.select(&filament.material);
        self.color = filament.color.clone();
        self.weight = filament.weight.to_string();
        self.status = filament.status();
        self.date = filament.date_opened.format(DATE_FORMAT).to_string();
        self.error = None;
    }

    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, delta: isize) {
        let fields = self.fields();
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(fields.len() as isize) as usize;
        self.active = fields[next];
    }

    /// Move the active picker. Returns the field whose value changed, if any.
    pub(crate) fn cycle_choice(&mut self, delta: isize) -> Option<FormField> {
        let changed = match self.active {
            FormField::Id => self.id.cycle(delta),
            FormField::Brand => self.brand.cycle(delta),
            FormField::Material => self.material.cycle(delta),
            FormField::Status => {
                let all = SpoolStatus::ALL;
                let current = all.iter().position(|s| *s == self.status).unwrap_or(0) as isize;
                let next = (current + delta).rem_euclid(all.len() as isize) as usize;
                self.status = all[next];
                true
            }
            _ => false,
        };
        if changed {
            self.error = None;
            Some(self.active)
        } else {
            None
        }
    }

    /// Append a character to the active text field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = match self.active {
            FormField::Color => {
                if ch.is_control() {
                    false
                } else {
                    self.color.push(ch);
                    true
                }
            }
            FormField::Weight => {
                if ch.is_ascii_digit() || (ch == '.' && !self.weight.contains('.')) {
                    self.weight.push(ch);
                    true
                } else {
                    false
                }
            }
            FormField::Date => {
                if ch.is_ascii_digit() || ch == '-' {
                    self.date.push(ch);
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        if accepted {
            self.error = None;
        }
        accepted
    }

    /// Remove the last character from the active text field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            FormField::Color => {
                self.color.pop();
            }
            FormField::Weight => {
                self.weight.pop();
            }
            FormField::Date => {
                self.date.pop();
            }
            _ => {}
        }
    }

    /// Check every field and return typed values. A blank date means today.
    pub(crate) fn validate(&self, today: NaiveDate) -> Result<FilamentDraft, FormError> {
        let id = match self.kind {
            FormKind::Addition => None,
            FormKind::Update => Some(
                self.selected_id()
                    .ok_or(FormError::MissingField(FormField::Id.label()))?
                    .to_string(),
            ),
        };
        let brand = self
            .brand
            .value()
            .ok_or(FormError::MissingField(FormField::Brand.label()))?;
        let material = self
            .material
            .value()
            .ok_or(FormError::MissingField(FormField::Material.label()))?;
        let color = self.color.trim();
        if color.is_empty() {
            return Err(FormError::MissingField(FormField::Color.label()));
        }
        let weight_raw = self.weight.trim();
        if weight_raw.is_empty() {
            return Err(FormError::MissingField(FormField::Weight.label()));
        }
        let weight = weight_raw
            .parse::<f64>()
            .ok()
            .filter(|grams| grams.is_finite() && *grams >= 0.0)
            .ok_or_else(|| FormError::InvalidWeight(weight_raw.to_string()))?;

        let date_raw = self.date.trim();
        let date_opened = if date_raw.is_empty() {
            today
        } else {
            NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
                .map_err(|_| FormError::InvalidDate(date_raw.to_string()))?
        };

        Ok(FilamentDraft {
            id,
            brand: brand.to_string(),
            material: material.to_string(),
            color: color.to_string(),
            weight,
            status: self.status,
            date_opened,
        })
    }

    /// Validate and apply the two-strike policy: the first failure warns, the
    /// next consecutive one dismisses the form.
    pub(crate) fn submit(&mut self, today: NaiveDate) -> SubmitOutcome {
        match self.validate(today) {
            Ok(draft) => {
                self.failed_attempts = 0;
                self.error = None;
                SubmitOutcome::Accepted(draft)
            }
            Err(err) => {
                self.failed_attempts = self.failed_attempts.saturating_add(1);
                if self.failed_attempts >= DISMISS_AFTER_FAILURES {
                    SubmitOutcome::Dismissed(err)
                } else {
                    self.error = Some(err.to_string());
                    SubmitOutcome::Warned(err)
                }
            }
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let is_active = self.active == field;
        let (value, placeholder) = match field {
            FormField::Id => (self.id.value().map(str::to_string), "<Select ID>"),
            FormField::Brand => (self.brand.value().map(str::to_string), "<Select Brand>"),
            FormField::Material => (
                self.material.value().map(str::to_string),
                "<Select Material>",
            ),
            FormField::Color => (non_empty(&self.color), "<required>"),
            FormField::Weight => (non_empty(&self.weight), "<required>"),
            FormField::Status => (Some(self.status.to_string()), ""),
            FormField::Date => (
                non_empty(&self.date),
                match self.kind {
                    FormKind::Addition => "<YYYY-MM-DD, blank for today>",
                    FormKind::Update => "<YYYY-MM-DD>",
                },
            ),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_none() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let display = value.unwrap_or_else(|| placeholder.to_string());

        let mut spans = vec![Span::raw(format!("{}: ", field.label()))];
        if field.is_choice() && is_active {
            spans.push(Span::styled(format!("< {display} >"), style));
        } else {
            spans.push(Span::styled(display, style));
        }
        Line::from(spans)
    }

    /// Character count of a text field, used to place the cursor.
    pub(crate) fn value_len(&self, field: FormField) -> Option<usize> {
        match field {
            FormField::Color => Some(self.color.chars().count()),
            FormField::Weight => Some(self.weight.chars().count()),
            FormField::Date => Some(self.date.chars().count()),
            _ => None,
        }
    }
}

fn fields_for(kind: FormKind) -> &'static [FormField] {
    match kind {
        FormKind::Addition => ADDITION_FIELDS,
        FormKind::Update => UPDATE_FIELDS,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            brands: vec!["Prusament".into(), "Hatchbox".into()],
            materials: vec!["PLA".into(), "PETG".into()],
            ..Config::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn filled_addition() -> FilamentForm {
        let mut form = FilamentForm::addition(&config());
        form.brand.select("Prusament");
        form.material.select("PLA");
        form.color = "Red".into();
        form.weight = "500".into();
        form
    }

    #[test]
    fn choice_cycles_through_prompt() {
        let mut choice = Choice::new(vec!["a".into(), "b".into()]);
        assert_eq!(choice.value(), None);
        assert!(choice.cycle(1));
        assert_eq!(choice.value(), Some("a"));
        assert!(choice.cycle(1));
        assert_eq!(choice.value(), Some("b"));
        assert!(choice.cycle(1));
        assert_eq!(choice.value(), None);
        assert!(choice.cycle(-1));
        assert_eq!(choice.value(), Some("b"));

        let mut empty = Choice::new(Vec::new());
        assert!(!empty.cycle(1));
    }

    #[test]
    fn choice_select_keeps_unknown_values() {
        let mut choice = Choice::new(vec!["PLA".into()]);
        choice.select("Wood");
        assert_eq!(choice.value(), Some("Wood"));
        choice.select("PLA");
        assert_eq!(choice.value(), Some("PLA"));
    }

    #[test]
    fn each_required_field_blocks_submission() {
        let base = filled_addition();
        assert!(base.validate(today()).is_ok());

        let mut form = base.clone();
        form.brand = Choice::new(config().brands);
        assert_eq!(
            form.validate(today()),
            Err(FormError::MissingField("Brand"))
        );

        let mut form = base.clone();
        form.material = Choice::new(config().materials);
        assert_eq!(
            form.validate(today()),
            Err(FormError::MissingField("Material"))
        );

        let mut form = base.clone();
        form.color = "   ".into();
        assert_eq!(
            form.validate(today()),
            Err(FormError::MissingField("Color"))
        );

        let mut form = base;
        form.weight.clear();
        assert_eq!(
            form.validate(today()),
            Err(FormError::MissingField("Weight (g)"))
        );
    }

    #[test]
    fn blank_date_defaults_to_today() {
        let draft = filled_addition().validate(today()).unwrap();
        assert_eq!(draft.date_opened, today());
        assert_eq!(draft.id, None);
    }

    #[test]
    fn dates_must_be_iso() {
        for bad in ["14/10/2026", "2026-02-30", "20261014", "2026-13-01", "-"] {
            let mut form = filled_addition();
            form.date = bad.into();
            assert_eq!(
                form.validate(today()),
                Err(FormError::InvalidDate(bad.to_string())),
                "{bad} should be rejected"
            );
        }

        let mut form = filled_addition();
        form.date = "2025-12-31".into();
        assert_eq!(
            form.validate(today()).unwrap().date_opened,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn weight_input_accepts_one_decimal_point() {
        let mut form = FilamentForm::addition(&config());
        form.active = FormField::Weight;
        for ch in "12.5.x-".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.weight, "12.5");

        let mut filled = filled_addition();
        filled.weight = ".".into();
        assert_eq!(
            filled.validate(today()),
            Err(FormError::InvalidWeight(".".into()))
        );
    }

    #[test]
    fn second_consecutive_failure_dismisses() {
        let mut form = FilamentForm::addition(&config());
        assert!(matches!(
            form.submit(today()),
            SubmitOutcome::Warned(FormError::MissingField("Brand"))
        ));
        assert!(form.error.is_some());

        // The counter is shared between missing fields and bad dates.
        let mut form = filled_addition();
        form.color.clear();
        assert!(matches!(form.submit(today()), SubmitOutcome::Warned(_)));
        form.color = "Red".into();
        form.date = "2026/10/14".into();
        assert!(matches!(
            form.submit(today()),
            SubmitOutcome::Dismissed(FormError::InvalidDate(_))
        ));
    }

    #[test]
    fn status_choice_sets_flags() {
        let mut form = filled_addition();
        form.active = FormField::Status;

        assert_eq!(form.cycle_choice(1), Some(FormField::Status));
        let open = form.validate(today()).unwrap().into_filament("x".into());
        assert_eq!((open.empty, open.open), (false, true));

        form.cycle_choice(1);
        let empty = form.validate(today()).unwrap().into_filament("x".into());
        assert_eq!((empty.empty, empty.open), (true, false));

        form.cycle_choice(1);
        let neither = form.validate(today()).unwrap().into_filament("x".into());
        assert_eq!((neither.empty, neither.open), (false, false));
    }

    #[test]
    fn update_requires_selected_id() {
        let mut form = FilamentForm::update(&config(), vec!["a1b2c3d4".into()]);
        assert_eq!(form.active, FormField::Id);
        form.brand.select("Hatchbox");
        form.material.select("PETG");
        form.color = "Blue".into();
        form.weight = "1000".into();
        assert_eq!(form.validate(today()), Err(FormError::MissingField("ID")));

        assert_eq!(form.cycle_choice(1), Some(FormField::Id));
        assert_eq!(
            form.validate(today()).unwrap().id.as_deref(),
            Some("a1b2c3d4")
        );
    }

    #[test]
    fn fill_from_copies_record() {
        let filament = Filament {
            id: "a1b2c3d4".into(),
            brand: "Hatchbox".into(),
            material: "PETG".into(),
            color: "Blue".into(),
            weight: 742.5,
            date_opened: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            empty: true,
            open: false,
        };
        let mut form = FilamentForm::update(&config(), vec![filament.id.clone()]);
        form.cycle_choice(1);
        form.fill_from(&filament);

        assert_eq!(form.weight, "742.5");
        assert_eq!(form.date, "2025-06-01");
        assert_eq!(form.status, SpoolStatus::Empty);
        let round_trip = form
            .validate(today())
            .unwrap()
            .into_filament(filament.id.clone());
        assert_eq!(round_trip, filament);
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = FilamentForm::addition(&config());
        assert_eq!(form.active, FormField::Brand);
        form.previous_field();
        assert_eq!(form.active, FormField::Date);
        form.next_field();
        form.next_field();
        assert_eq!(form.active, FormField::Material);
    }
}
