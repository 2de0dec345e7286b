//! Admin settings document, its default table and the forward-compatible merge.
//!
//! # Responsibility
//! - Define the typed settings document shared by every request.
//! - Backfill fields added to the schema over time without discarding
//!   customizations stored by older versions.
//! - Validate admin edits (partial updates, symbol catalog, logos).
//!
//! # Invariants
//! - `merge_defaults` is pure and idempotent.
//! - Keys in `NON_EMPTY_KEYS` never survive a merge as empty arrays.
//! - `symbols` is unique by filename and never empty.

use super::asset::{has_allowed_extension, is_bare_filename, LOGO_EXTENSIONS, SYMBOL_EXTENSIONS};
use super::color_scheme::ColorScheme;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest accepted value for `grid_rows` / `grid_cols`.
pub const MAX_GRID_DIMENSION: u32 = 50;

/// Animation names the mosaic page knows how to play.
pub const SUPPORTED_ANIMATIONS: &[&str] = &[
    "confetti",
    "fireworks",
    "diwali",
    "sparkle-rain",
    "flower-burst",
    "rangoli",
];

const FALLBACK_ANIMATION: &str = "confetti";

/// Keys whose valid domain excludes the empty list.
pub const NON_EMPTY_KEYS: &[&str] = &["symbols", "celebration_animations"];

/// How the mosaic lays out tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// Layout sized by the page; entries carry no position.
    Auto,
    /// Fixed `grid_rows x grid_cols` grid; every entry owns one tile.
    Manual,
}

/// One selectable symbol in the submission form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub filename: String,
    pub label: String,
}

impl SymbolSpec {
    pub fn new(filename: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            label: label.into(),
        }
    }
}

/// Which logo an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoSlot {
    Main,
    Short,
}

/// Process-wide configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSettings {
    pub logo_filename: String,
    pub short_logo_filename: String,
    pub header_text: String,
    pub max_entries: u32,
    pub celebration_animations: Vec<String>,
    pub color_scheme: ColorScheme,
    pub grid_mode: GridMode,
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub symbols: Vec<SymbolSpec>,
    /// Keys written by newer schema versions, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            logo_filename: "logo.png".to_string(),
            short_logo_filename: "logo_short.png".to_string(),
            header_text: "Happy Diwali".to_string(),
            max_entries: 50,
            celebration_animations: SUPPORTED_ANIMATIONS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            color_scheme: ColorScheme::default(),
            grid_mode: GridMode::Auto,
            grid_rows: 10,
            grid_cols: 12,
            symbols: vec![
                SymbolSpec::new("diya.png", "Diya"),
                SymbolSpec::new("cracker.png", "Cracker"),
                SymbolSpec::new("rocket.png", "Rocket"),
            ],
            extra: Map::new(),
        }
    }
}

impl AdminSettings {
    /// Whether entries are placed on fixed grid tiles.
    pub fn is_positional(&self) -> bool {
        self.grid_mode == GridMode::Manual
    }

    /// Number of tiles in the configured grid.
    pub fn total_slots(&self) -> u32 {
        self.grid_rows.saturating_mul(self.grid_cols)
    }

    /// Maximum number of live entries the ledger keeps.
    ///
    /// `min(max_entries, rows * cols)` in manual mode, `max_entries` otherwise.
    pub fn effective_cap(&self) -> u32 {
        if self.is_positional() {
            self.max_entries.min(self.total_slots())
        } else {
            self.max_entries
        }
    }

    /// Number of entries the mosaic page renders: one per tile, in either mode.
    pub fn display_limit(&self) -> u32 {
        self.total_slots()
    }

    pub fn has_symbol(&self, filename: &str) -> bool {
        self.symbols.iter().any(|symbol| symbol.filename == filename)
    }

    /// Appends a symbol to the catalog.
    pub fn add_symbol(&mut self, filename: &str, label: &str) -> Result<(), SettingsValidationError> {
        let filename = filename.trim();
        let label = label.trim();
        if label.is_empty() {
            return Err(SettingsValidationError::EmptySymbolLabel);
        }
        if !is_bare_filename(filename) {
            return Err(SettingsValidationError::InvalidSymbolFilename(
                filename.to_string(),
            ));
        }
        if !has_allowed_extension(filename, SYMBOL_EXTENSIONS) {
            return Err(SettingsValidationError::DisallowedImageExtension(
                filename.to_string(),
            ));
        }
        if self.has_symbol(filename) {
            return Err(SettingsValidationError::DuplicateSymbol(filename.to_string()));
        }

        self.symbols.push(SymbolSpec::new(filename, label));
        Ok(())
    }

    /// Removes a symbol, refusing to empty the catalog.
    pub fn remove_symbol(&mut self, filename: &str) -> Result<SymbolSpec, SettingsValidationError> {
        let filename = filename.trim();
        let index = self
            .symbols
            .iter()
            .position(|symbol| symbol.filename == filename)
            .ok_or_else(|| SettingsValidationError::UnknownSymbol(filename.to_string()))?;
        if self.symbols.len() <= 1 {
            return Err(SettingsValidationError::LastSymbol(filename.to_string()));
        }
        Ok(self.symbols.remove(index))
    }

    /// Records the resolved filename of an uploaded logo.
    pub fn set_logo(&mut self, slot: LogoSlot, filename: &str) -> Result<(), SettingsValidationError> {
        let filename = filename.trim();
        if !is_bare_filename(filename) || !has_allowed_extension(filename, LOGO_EXTENSIONS) {
            return Err(SettingsValidationError::DisallowedImageExtension(
                filename.to_string(),
            ));
        }
        match slot {
            LogoSlot::Main => self.logo_filename = filename.to_string(),
            LogoSlot::Short => self.short_logo_filename = filename.to_string(),
        }
        Ok(())
    }

    /// Replaces out-of-domain values left by hand edits or older writers.
    ///
    /// Returns `true` when anything changed.
    pub fn sanitize(&mut self) -> bool {
        let defaults = Self::default();
        let mut changed = false;

        if self.max_entries == 0 {
            warn!("event=settings_sanitize module=model field=max_entries action=default");
            self.max_entries = defaults.max_entries;
            changed = true;
        }
        if !(1..=MAX_GRID_DIMENSION).contains(&self.grid_rows) {
            warn!(
                "event=settings_sanitize module=model field=grid_rows value={} action=default",
                self.grid_rows
            );
            self.grid_rows = defaults.grid_rows;
            changed = true;
        }
        if !(1..=MAX_GRID_DIMENSION).contains(&self.grid_cols) {
            warn!(
                "event=settings_sanitize module=model field=grid_cols value={} action=default",
                self.grid_cols
            );
            self.grid_cols = defaults.grid_cols;
            changed = true;
        }

        let mut seen = HashSet::new();
        let before = self.symbols.len();
        self.symbols
            .retain(|symbol| seen.insert(symbol.filename.clone()));
        if self.symbols.len() != before {
            warn!(
                "event=settings_sanitize module=model field=symbols dropped_duplicates={}",
                before - self.symbols.len()
            );
            changed = true;
        }
        if self.symbols.is_empty() {
            self.symbols = defaults.symbols;
            changed = true;
        }
        if self.celebration_animations.is_empty() {
            self.celebration_animations = defaults.celebration_animations;
            changed = true;
        }

        changed
    }
}

/// Returns the default settings as a JSON object (the default value table).
pub fn default_document() -> Map<String, Value> {
    match serde_json::to_value(AdminSettings::default()) {
        Ok(Value::Object(map)) => map,
        _ => unreachable!("AdminSettings always serializes to a JSON object"),
    }
}

/// Backfills `loaded` from `defaults`.
///
/// A key is defaulted when it is absent, `null`, or an empty array listed in
/// `NON_EMPTY_KEYS`. Present values and unknown keys are kept as-is.
pub fn merge_defaults(mut loaded: Map<String, Value>, defaults: &Map<String, Value>) -> Map<String, Value> {
    for (key, default_value) in defaults {
        let needs_default = match loaded.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty() && NON_EMPTY_KEYS.contains(&key.as_str()),
            Some(_) => false,
        };
        if needs_default {
            loaded.insert(key.clone(), default_value.clone());
        }
    }
    loaded
}

/// Swaps every known key whose value does not fit its field type for the
/// default, leaving the rest of `merged` as stored.
///
/// Returns the repaired document and the names of the replaced keys.
pub fn repair_mistyped_fields(
    mut merged: Map<String, Value>,
    defaults: &Map<String, Value>,
) -> (Map<String, Value>, Vec<String>) {
    let mut replaced = Vec::new();
    for (key, default_value) in defaults {
        let Some(value) = merged.get(key) else {
            continue;
        };
        let mut candidate = defaults.clone();
        candidate.insert(key.clone(), value.clone());
        if serde_json::from_value::<AdminSettings>(Value::Object(candidate)).is_err() {
            merged.insert(key.clone(), default_value.clone());
            replaced.push(key.clone());
        }
    }
    (merged, replaced)
}

/// Partial settings edit submitted by an admin.
///
/// `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub header_text: Option<String>,
    pub max_entries: Option<u32>,
    pub grid_mode: Option<GridMode>,
    pub grid_rows: Option<u32>,
    pub grid_cols: Option<u32>,
    pub celebration_animations: Option<Vec<String>>,
}

impl SettingsUpdate {
    /// Returns `current` with this update applied, or the first invalid field.
    pub fn apply_to(&self, current: &AdminSettings) -> Result<AdminSettings, SettingsValidationError> {
        let mut next = current.clone();

        if let Some(header_text) = &self.header_text {
            let header_text = header_text.trim();
            if header_text.is_empty() {
                return Err(SettingsValidationError::EmptyHeaderText);
            }
            next.header_text = header_text.to_string();
        }

        if let Some(max_entries) = self.max_entries {
            if max_entries == 0 {
                return Err(SettingsValidationError::InvalidMaxEntries(max_entries));
            }
            next.max_entries = max_entries;
        }

        if let Some(grid_mode) = self.grid_mode {
            next.grid_mode = grid_mode;
        }
        if let Some(rows) = self.grid_rows {
            next.grid_rows = check_grid_dimension("grid_rows", rows)?;
        }
        if let Some(cols) = self.grid_cols {
            next.grid_cols = check_grid_dimension("grid_cols", cols)?;
        }

        if let Some(animations) = &self.celebration_animations {
            let mut selected: Vec<String> = Vec::with_capacity(animations.len());
            for name in animations {
                let name = name.trim();
                if !SUPPORTED_ANIMATIONS.contains(&name) {
                    return Err(SettingsValidationError::UnsupportedAnimation(name.to_string()));
                }
                if !selected.iter().any(|existing| existing == name) {
                    selected.push(name.to_string());
                }
            }
            if selected.is_empty() {
                selected.push(FALLBACK_ANIMATION.to_string());
            }
            next.celebration_animations = selected;
        }

        Ok(next)
    }
}

fn check_grid_dimension(axis: &'static str, value: u32) -> Result<u32, SettingsValidationError> {
    if (1..=MAX_GRID_DIMENSION).contains(&value) {
        Ok(value)
    } else {
        Err(SettingsValidationError::InvalidGridDimension { axis, value })
    }
}

/// Rejection reasons for admin settings edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsValidationError {
    /// Uploaded color scheme is not shaped like a scheme document.
    InvalidColorDocument(String),
    MissingColorSection(&'static str),
    UnknownColorSection(String),
    MissingColorField {
        section: &'static str,
        field: &'static str,
    },
    InvalidColor {
        section: String,
        field: String,
        value: String,
    },
    EmptyHeaderText,
    InvalidMaxEntries(u32),
    InvalidGridDimension {
        axis: &'static str,
        value: u32,
    },
    UnsupportedAnimation(String),
    EmptySymbolLabel,
    InvalidSymbolFilename(String),
    DuplicateSymbol(String),
    UnknownSymbol(String),
    /// Removing this symbol would leave the catalog empty.
    LastSymbol(String),
    DisallowedImageExtension(String),
}

impl Display for SettingsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColorDocument(reason) => write!(f, "invalid color scheme: {reason}"),
            Self::MissingColorSection(section) => {
                write!(f, "color scheme is missing section `{section}`")
            }
            Self::UnknownColorSection(section) => {
                write!(f, "color scheme has unknown section `{section}`")
            }
            Self::MissingColorField { section, field } => {
                write!(f, "color scheme section `{section}` is missing `{field}`")
            }
            Self::InvalidColor {
                section,
                field,
                value,
            } => write!(
                f,
                "invalid color {value} for `{section}.{field}`; use hex colors like #FF0000"
            ),
            Self::EmptyHeaderText => write!(f, "header text cannot be empty"),
            Self::InvalidMaxEntries(value) => {
                write!(f, "max entries must be positive (got {value})")
            }
            Self::InvalidGridDimension { axis, value } => write!(
                f,
                "{axis} must be between 1 and {MAX_GRID_DIMENSION} (got {value})"
            ),
            Self::UnsupportedAnimation(name) => write!(f, "unsupported animation `{name}`"),
            Self::EmptySymbolLabel => write!(f, "symbol label is required"),
            Self::InvalidSymbolFilename(filename) => {
                write!(f, "invalid symbol filename `{filename}`")
            }
            Self::DuplicateSymbol(filename) => write!(f, "symbol `{filename}` already exists"),
            Self::UnknownSymbol(filename) => write!(f, "symbol `{filename}` not found"),
            Self::LastSymbol(filename) => {
                write!(f, "cannot remove `{filename}`: it is the last symbol")
            }
            Self::DisallowedImageExtension(filename) => {
                write!(f, "file type not allowed: `{filename}`")
            }
        }
    }
}

impl Error for SettingsValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        default_document, merge_defaults, repair_mistyped_fields, AdminSettings, GridMode, LogoSlot, SettingsUpdate,
        SettingsValidationError, SymbolSpec,
    };
    use serde_json::{json, Map, Value};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn merge_backfills_missing_keys_and_keeps_customizations() {
        let loaded = object(json!({ "header_text": "Eid Mubarak", "max_entries": 7 }));
        let merged = merge_defaults(loaded, &default_document());

        assert_eq!(merged["header_text"], "Eid Mubarak");
        assert_eq!(merged["max_entries"], 7);
        assert_eq!(merged["grid_rows"], 10);
        assert_eq!(merged["symbols"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn merge_replaces_empty_catalog_like_lists_only() {
        let loaded = object(json!({
            "symbols": [],
            "celebration_animations": [],
            "custom_list": []
        }));
        let merged = merge_defaults(loaded, &default_document());

        assert_eq!(merged["symbols"], default_document()["symbols"]);
        assert_eq!(
            merged["celebration_animations"],
            default_document()["celebration_animations"]
        );
        assert_eq!(merged["custom_list"], json!([]));
    }

    #[test]
    fn merge_is_idempotent() {
        let loaded = object(json!({
            "header_text": "Lights",
            "symbols": [],
            "grid_mode": null,
            "future_flag": true
        }));
        let once = merge_defaults(loaded, &default_document());
        let twice = merge_defaults(once.clone(), &default_document());
        assert_eq!(once, twice);
    }

    #[test]
    fn repair_replaces_only_mistyped_keys() {
        let defaults = default_document();
        let loaded = object(json!({
            "header_text": "Eid Mubarak",
            "grid_rows": -1,
            "grid_cols": 4,
            "color_scheme": "dark",
            "future_flag": [1, 2]
        }));
        let (repaired, replaced) = repair_mistyped_fields(merge_defaults(loaded, &defaults), &defaults);

        assert_eq!(replaced, vec!["color_scheme".to_string(), "grid_rows".to_string()]);
        assert_eq!(repaired["header_text"], "Eid Mubarak");
        assert_eq!(repaired["grid_cols"], 4);
        assert_eq!(repaired["grid_rows"], defaults["grid_rows"]);
        assert_eq!(repaired["color_scheme"], defaults["color_scheme"]);
        assert_eq!(repaired["future_flag"], json!([1, 2]));
        assert!(serde_json::from_value::<AdminSettings>(Value::Object(repaired)).is_ok());
    }

    #[test]
    fn merged_document_deserializes_and_keeps_unknown_keys() {
        let loaded = object(json!({ "future_flag": "on" }));
        let merged = merge_defaults(loaded, &default_document());
        let settings: AdminSettings = serde_json::from_value(Value::Object(merged)).unwrap();

        assert_eq!(settings.extra["future_flag"], "on");
        let round_trip = serde_json::to_value(&settings).unwrap();
        assert_eq!(round_trip["future_flag"], "on");
    }

    #[test]
    fn effective_cap_depends_on_grid_mode() {
        let mut settings = AdminSettings {
            max_entries: 500,
            grid_rows: 2,
            grid_cols: 3,
            ..AdminSettings::default()
        };
        assert_eq!(settings.effective_cap(), 500);

        settings.grid_mode = GridMode::Manual;
        assert_eq!(settings.effective_cap(), 6);

        settings.max_entries = 4;
        assert_eq!(settings.effective_cap(), 4);
        assert_eq!(settings.display_limit(), 6);
    }

    #[test]
    fn display_limit_is_grid_sized_in_auto_mode() {
        let settings = AdminSettings {
            max_entries: 500,
            grid_rows: 2,
            grid_cols: 3,
            ..AdminSettings::default()
        };
        assert_eq!(settings.grid_mode, GridMode::Auto);
        assert_eq!(settings.display_limit(), 6);
    }

    #[test]
    fn update_applies_only_given_fields() {
        let current = AdminSettings::default();
        let update = SettingsUpdate {
            header_text: Some("  Festival of Lights ".to_string()),
            grid_mode: Some(GridMode::Manual),
            grid_rows: Some(4),
            ..SettingsUpdate::default()
        };
        let next = update.apply_to(&current).unwrap();

        assert_eq!(next.header_text, "Festival of Lights");
        assert_eq!(next.grid_mode, GridMode::Manual);
        assert_eq!(next.grid_rows, 4);
        assert_eq!(next.grid_cols, current.grid_cols);
        assert_eq!(next.max_entries, current.max_entries);
    }

    #[test]
    fn update_rejects_out_of_range_values() {
        let current = AdminSettings::default();
        let too_wide = SettingsUpdate {
            grid_cols: Some(51),
            ..SettingsUpdate::default()
        };
        assert_eq!(
            too_wide.apply_to(&current).unwrap_err(),
            SettingsValidationError::InvalidGridDimension {
                axis: "grid_cols",
                value: 51
            }
        );

        let zero_cap = SettingsUpdate {
            max_entries: Some(0),
            ..SettingsUpdate::default()
        };
        assert!(zero_cap.apply_to(&current).is_err());
    }

    #[test]
    fn update_animations_validates_and_falls_back() {
        let current = AdminSettings::default();
        let none_selected = SettingsUpdate {
            celebration_animations: Some(Vec::new()),
            ..SettingsUpdate::default()
        };
        assert_eq!(
            none_selected.apply_to(&current).unwrap().celebration_animations,
            vec!["confetti".to_string()]
        );

        let unknown = SettingsUpdate {
            celebration_animations: Some(vec!["lasers".to_string()]),
            ..SettingsUpdate::default()
        };
        assert_eq!(
            unknown.apply_to(&current).unwrap_err(),
            SettingsValidationError::UnsupportedAnimation("lasers".to_string())
        );
    }

    #[test]
    fn symbol_catalog_guards() {
        let mut settings = AdminSettings {
            symbols: vec![SymbolSpec::new("diya.png", "Diya")],
            ..AdminSettings::default()
        };

        assert_eq!(
            settings.remove_symbol("diya.png").unwrap_err(),
            SettingsValidationError::LastSymbol("diya.png".to_string())
        );
        assert_eq!(
            settings.add_symbol("diya.png", "Again").unwrap_err(),
            SettingsValidationError::DuplicateSymbol("diya.png".to_string())
        );
        assert_eq!(
            settings.add_symbol("star.gif", "Star").unwrap_err(),
            SettingsValidationError::DisallowedImageExtension("star.gif".to_string())
        );

        settings.add_symbol("star.png", " Star ").unwrap();
        assert_eq!(settings.symbols[1], SymbolSpec::new("star.png", "Star"));
        settings.remove_symbol("diya.png").unwrap();
        assert_eq!(settings.symbols.len(), 1);
    }

    #[test]
    fn set_logo_checks_extension() {
        let mut settings = AdminSettings::default();
        settings.set_logo(LogoSlot::Short, "logo_20251020.svg").unwrap();
        assert_eq!(settings.short_logo_filename, "logo_20251020.svg");
        assert!(settings.set_logo(LogoSlot::Main, "logo.exe").is_err());
        assert_eq!(settings.logo_filename, "logo.png");
    }

    #[test]
    fn sanitize_repairs_out_of_domain_values() {
        let mut settings = AdminSettings {
            max_entries: 0,
            grid_rows: 0,
            symbols: vec![
                SymbolSpec::new("diya.png", "Diya"),
                SymbolSpec::new("diya.png", "Duplicate"),
            ],
            ..AdminSettings::default()
        };
        assert!(settings.sanitize());
        assert_eq!(settings.max_entries, 50);
        assert_eq!(settings.grid_rows, 10);
        assert_eq!(settings.symbols, vec![SymbolSpec::new("diya.png", "Diya")]);
        assert!(!settings.sanitize());
    }
}
