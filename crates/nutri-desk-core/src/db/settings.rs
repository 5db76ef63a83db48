//! Settings database operations.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DbResult};
use crate::models::{LetterheadSettings, LETTERHEAD_KEY};

impl Database {
    /// Read a JSON setting.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        value
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// Write a JSON setting, replacing any previous value.
    pub fn put_setting<T: Serialize>(&self, key: &str, value: &T) -> DbResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, json],
        )?;
        Ok(())
    }

    /// Current letterhead, empty if never saved.
    pub fn get_letterhead(&self) -> DbResult<LetterheadSettings> {
        Ok(self
            .get_setting::<LetterheadSettings>(LETTERHEAD_KEY)?
            .unwrap_or_default())
    }

    /// Merge `update` into the stored letterhead and return the result.
    pub fn save_letterhead(&self, update: LetterheadSettings) -> DbResult<LetterheadSettings> {
        let mut letterhead = self.get_letterhead()?;
        letterhead.merge(update);
        self.put_setting(LETTERHEAD_KEY, &letterhead)?;
        Ok(letterhead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[test]
    fn test_missing_letterhead_is_default() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_letterhead().unwrap(), LetterheadSettings::default());
    }

    #[test]
    fn test_save_letterhead_merges() {
        let db = Database::open_in_memory().unwrap();
        db.save_letterhead(LetterheadSettings {
            nutritionist_name: Some("Dr. Rao".into()),
            email: Some("rao@example.com".into()),
            phone: None,
        })
        .unwrap();

        let merged = db
            .save_letterhead(LetterheadSettings {
                phone: Some("555-0100".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(merged.nutritionist_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(db.get_letterhead().unwrap(), merged);
    }

    #[test]
    fn test_corrupt_setting_is_json_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, 'not json')",
                [LETTERHEAD_KEY],
            )
            .unwrap();
        assert!(matches!(db.get_letterhead(), Err(DbError::Json(_))));
    }
}
