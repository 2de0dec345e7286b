//! Settings use cases: self-healing load, save and admin edits.
//!
//! # Responsibility
//! - Resolve the persisted settings document against the default table.
//! - Validate admin edits before anything is written.
//!
//! # Invariants
//! - `load` never fails: absent, unparsable or non-object documents are
//!   replaced by the defaults, which are persisted.
//! - A parsable document keeps every usable key; only mistyped keys fall
//!   back to their defaults, and the stored body is left as written.
//! - Rejected edits leave the stored document untouched.

use crate::model::color_scheme::ColorScheme;
use crate::model::settings::{
    default_document, merge_defaults, repair_mistyped_fields, AdminSettings, LogoSlot,
    SettingsUpdate,
};
use crate::repo::entry_repo::{RepoError, RepoResult};
use crate::repo::settings_repo::SettingsRepository;
use crate::service::error::MosaicResult;
use log::{error, info, warn};
use serde_json::Value;

pub struct SettingsStore<R: SettingsRepository> {
    repo: R,
}

/// Why a persisted document could not be used.
enum LoadFailure {
    Absent,
    Corrupt(String),
    Storage(RepoError),
}

impl<R: SettingsRepository> SettingsStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the current settings with defaults merged in.
    pub fn load(&self) -> AdminSettings {
        match self.read_persisted() {
            Ok(settings) => settings,
            Err(LoadFailure::Absent) => {
                info!("event=settings_load module=settings status=healed reason=absent");
                self.materialize_defaults()
            }
            Err(LoadFailure::Corrupt(reason)) => {
                warn!("event=settings_load module=settings status=healed reason=corrupt detail={reason}");
                self.materialize_defaults()
            }
            Err(LoadFailure::Storage(err)) => {
                // Do not overwrite a document we could not read.
                error!("event=settings_load module=settings status=error fallback=defaults error={err}");
                AdminSettings::default()
            }
        }
    }

    /// Writes the full settings document.
    pub fn save(&self, settings: &AdminSettings) -> RepoResult<()> {
        let body = serde_json::to_string_pretty(settings)?;
        self.repo.save_document(&body)?;
        info!("event=settings_save module=settings status=ok");
        Ok(())
    }

    /// Applies a partial update and persists the result.
    pub fn update(&self, update: &SettingsUpdate) -> MosaicResult<AdminSettings> {
        let next = update.apply_to(&self.load())?;
        self.save(&next)?;
        Ok(next)
    }

    /// Validates an uploaded color scheme document and stores it.
    pub fn replace_color_scheme(&self, document: &Value) -> MosaicResult<()> {
        let scheme = ColorScheme::from_document(document)?;
        let mut settings = self.load();
        settings.color_scheme = scheme;
        self.save(&settings)?;
        Ok(())
    }

    pub fn add_symbol(&self, filename: &str, label: &str) -> MosaicResult<()> {
        let mut settings = self.load();
        settings.add_symbol(filename, label)?;
        self.save(&settings)?;
        Ok(())
    }

    pub fn remove_symbol(&self, filename: &str) -> MosaicResult<()> {
        let mut settings = self.load();
        settings.remove_symbol(filename)?;
        self.save(&settings)?;
        Ok(())
    }

    pub fn set_logo(&self, slot: LogoSlot, filename: &str) -> MosaicResult<()> {
        let mut settings = self.load();
        settings.set_logo(slot, filename)?;
        self.save(&settings)?;
        Ok(())
    }

    fn read_persisted(&self) -> Result<AdminSettings, LoadFailure> {
        let body = self
            .repo
            .load_document()
            .map_err(LoadFailure::Storage)?
            .ok_or(LoadFailure::Absent)?;

        let loaded = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(LoadFailure::Corrupt("document is not an object".to_string())),
            Err(err) => return Err(LoadFailure::Corrupt(err.to_string())),
        };

        let defaults = default_document();
        let (repaired, replaced) = repair_mistyped_fields(merge_defaults(loaded, &defaults), &defaults);
        for key in &replaced {
            warn!("event=settings_load module=settings status=repaired field={key} action=default");
        }
        let mut settings = serde_json::from_value::<AdminSettings>(Value::Object(repaired))
            .map_err(|err| LoadFailure::Corrupt(err.to_string()))?;
        settings.sanitize();
        Ok(settings)
    }

    fn materialize_defaults(&self) -> AdminSettings {
        let defaults = AdminSettings::default();
        if let Err(err) = self.save(&defaults) {
            error!("event=settings_heal module=settings status=error error={err}");
        }
        defaults
    }
}
