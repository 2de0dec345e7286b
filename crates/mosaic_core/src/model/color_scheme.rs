//! Page color palettes and uploaded color-scheme validation.
//!
//! # Invariants
//! - Both `submission_page` and `mosaic_page` palettes are present.
//! - Every stored value is a `#`-prefixed 3/4/6/8-digit hex color.

use super::settings::SettingsValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid hex color regex")
});

pub const SUBMISSION_PAGE: &str = "submission_page";
pub const MOSAIC_PAGE: &str = "mosaic_page";

const REQUIRED_SUBMISSION_FIELDS: &[&str] =
    &["background", "text", "button_primary_bg", "button_primary_text"];
const REQUIRED_MOSAIC_FIELDS: &[&str] = &[
    "background",
    "text",
    "tile_background",
    "tile_text",
    "tile_border",
];

/// Palette keyed by UI role (`background`, `tile_border`, ...).
pub type Palette = BTreeMap<String, String>;

/// Colors for the two public pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub submission_page: Palette,
    pub mosaic_page: Palette,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            submission_page: palette(&[
                ("background", "#000000"),
                ("text", "#ffffff"),
                ("heading_text", "#ffcc00"),
                ("form_background", "#1a1a1a"),
                ("form_border", "#333333"),
                ("input_background", "#2a2a2a"),
                ("input_text", "#ffffff"),
                ("input_border", "#404040"),
                ("input_focus_border", "#ffcc00"),
                ("label_text", "#cccccc"),
                ("button_primary_bg", "#ffcc00"),
                ("button_primary_text", "#000000"),
                ("button_primary_hover_bg", "#ffd633"),
                ("button_secondary_bg", "#404040"),
                ("button_secondary_text", "#ffffff"),
                ("button_secondary_hover_bg", "#4d4d4d"),
                ("alert_success_bg", "#28a745"),
                ("alert_success_text", "#ffffff"),
                ("alert_error_bg", "#dc3545"),
                ("alert_error_text", "#ffffff"),
                ("symbol_selector_bg", "#2a2a2a"),
                ("symbol_selector_border", "#404040"),
                ("symbol_selector_active", "#ffcc00"),
            ]),
            mosaic_page: palette(&[
                ("background", "#000000"),
                ("text", "#ffffff"),
                ("tile_background", "#333333"),
                ("tile_text", "#ffffff"),
                ("tile_border", "#ffcc00"),
            ]),
        }
    }
}

impl ColorScheme {
    /// Validates an uploaded JSON document and converts it into a scheme.
    ///
    /// Checks run in order: document shape, required sections, unknown
    /// sections, required fields, then every color value.
    pub fn from_document(document: &Value) -> Result<Self, SettingsValidationError> {
        let sections = document.as_object().ok_or_else(|| {
            SettingsValidationError::InvalidColorDocument(
                "color scheme must be a JSON object".to_string(),
            )
        })?;

        for section in [SUBMISSION_PAGE, MOSAIC_PAGE] {
            if !sections.contains_key(section) {
                return Err(SettingsValidationError::MissingColorSection(section));
            }
        }
        if let Some(unknown) = sections
            .keys()
            .find(|key| key.as_str() != SUBMISSION_PAGE && key.as_str() != MOSAIC_PAGE)
        {
            return Err(SettingsValidationError::UnknownColorSection(unknown.clone()));
        }

        let submission_page = parse_palette(
            SUBMISSION_PAGE,
            &sections[SUBMISSION_PAGE],
            REQUIRED_SUBMISSION_FIELDS,
        )?;
        let mosaic_page =
            parse_palette(MOSAIC_PAGE, &sections[MOSAIC_PAGE], REQUIRED_MOSAIC_FIELDS)?;

        Ok(Self {
            submission_page,
            mosaic_page,
        })
    }
}

/// Returns whether `value` is a `#`-prefixed hex color.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

fn parse_palette(
    section: &'static str,
    value: &Value,
    required: &[&'static str],
) -> Result<Palette, SettingsValidationError> {
    let fields = value.as_object().ok_or_else(|| {
        SettingsValidationError::InvalidColorDocument(format!("`{section}` must be an object"))
    })?;

    if let Some(missing) = required.iter().find(|field| !fields.contains_key(**field)) {
        return Err(SettingsValidationError::MissingColorField {
            section,
            field: *missing,
        });
    }

    let mut palette = Palette::new();
    for (field, raw) in fields {
        let color = raw.as_str().filter(|color| is_hex_color(color)).ok_or_else(|| {
            SettingsValidationError::InvalidColor {
                section: section.to_string(),
                field: field.clone(),
                value: raw.to_string(),
            }
        })?;
        palette.insert(field.clone(), color.to_string());
    }
    Ok(palette)
}

fn palette(pairs: &[(&str, &str)]) -> Palette {
    pairs
        .iter()
        .map(|(role, color)| ((*role).to_string(), (*color).to_string()))
        .collect()
}
