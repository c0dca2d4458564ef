//! Domain models that mirror the `filaments` table and get passed throughout
//! the TUI. These stay light-weight data holders so the other layers can focus
//! on presentation and persistence logic.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
/// One spool of filament on the shelf.
pub struct Filament {
    /// Short random token, immutable once assigned. Update flows key the
    /// upsert on it.
    pub id: String,
    /// Brand name, one of the configured brands.
    pub brand: String,
    /// Material name, one of the configured materials.
    pub material: String,
    /// Free-text color description.
    pub color: String,
    /// Grams remaining on the spool.
    pub weight: f64,
    pub date_opened: NaiveDate,
    pub empty: bool,
    /// Currently in use.
    pub open: bool,
}

impl Filament {
    /// Single-line rendering used by the confirmation area after a save.
    pub fn summary(&self) -> String {
        format!(
            "{} | {} {} {} | {} g | opened {} | open: {} | empty: {}",
            self.id,
            self.brand,
            self.material,
            self.color,
            self.weight,
            self.date_opened.format("%Y-%m-%d"),
            yes_no(self.open),
            yes_no(self.empty),
        )
    }

    pub fn status(&self) -> SpoolStatus {
        SpoolStatus::from_flags(self.empty, self.open)
    }
}

/// The three-way choice the forms offer instead of two independent toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpoolStatus {
    #[default]
    Neither,
    Open,
    Empty,
}

impl SpoolStatus {
    /// Order in which the form cycles through the choices.
    pub const ALL: [SpoolStatus; 3] = [SpoolStatus::Neither, SpoolStatus::Open, SpoolStatus::Empty];

    /// Derive the stored `(empty, open)` pair. An empty spool is not in use,
    /// so `Empty` clears the open flag.
    pub fn flags(self) -> (bool, bool) {
        match self {
            SpoolStatus::Neither => (false, false),
            SpoolStatus::Open => (false, true),
            SpoolStatus::Empty => (true, false),
        }
    }

    /// Inverse of [`SpoolStatus::flags`]. Rows written with both flags set
    /// count as empty.
    pub fn from_flags(empty: bool, open: bool) -> Self {
        match (empty, open) {
            (true, _) => SpoolStatus::Empty,
            (false, true) => SpoolStatus::Open,
            (false, false) => SpoolStatus::Neither,
        }
    }
}

impl fmt::Display for SpoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpoolStatus::Neither => "Neither",
            SpoolStatus::Open => "Open",
            SpoolStatus::Empty => "Empty",
        };
        write!(f, "{label}")
    }
}

/// Render a boolean the way the inventory table shows it.
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_flags() {
        assert_eq!(SpoolStatus::Neither.flags(), (false, false));
        assert_eq!(SpoolStatus::Open.flags(), (false, true));
        assert_eq!(SpoolStatus::Empty.flags(), (true, false));
    }

    #[test]
    fn flags_map_back_to_status() {
        for status in SpoolStatus::ALL {
            let (empty, open) = status.flags();
            assert_eq!(SpoolStatus::from_flags(empty, open), status);
        }
        // Rows saved by the older widget carried empty=true, open=true.
        assert_eq!(SpoolStatus::from_flags(true, true), SpoolStatus::Empty);
    }

    #[test]
    fn summary_lists_every_field() {
        let filament = Filament {
            id: "a1b2c3d4".into(),
            brand: "Prusament".into(),
            material: "PLA".into(),
            color: "Red".into(),
            weight: 500.0,
            date_opened: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            empty: false,
            open: true,
        };
        assert_eq!(
            filament.summary(),
            "a1b2c3d4 | Prusament PLA Red | 500 g | opened 2024-03-09 | open: Yes | empty: No"
        );
    }
}
