//! Settings document repository.
//!
//! Stores the admin settings as one JSON body. Parsing and default merging
//! belong to the settings service, so a corrupt body is still readable here.

use crate::repo::entry_repo::RepoResult;
use rusqlite::{Connection, OptionalExtension};

/// Document name of the admin settings body.
pub const ADMIN_SETTINGS_DOCUMENT: &str = "admin_settings";

pub trait SettingsRepository {
    /// Raw JSON body of the settings document, if one was ever saved.
    fn load_document(&self) -> RepoResult<Option<String>>;
    /// Replaces the full settings document.
    fn save_document(&self, body: &str) -> RepoResult<()>;
}

/// SQLite-backed settings document store.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load_document(&self) -> RepoResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM settings_documents WHERE name = ?1;",
                [ADMIN_SETTINGS_DOCUMENT],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn save_document(&self, body: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO settings_documents (name, body)
             VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            [ADMIN_SETTINGS_DOCUMENT, body],
        )?;
        Ok(())
    }
}
