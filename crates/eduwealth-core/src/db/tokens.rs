//! Refresh token persistence

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::RefreshTokenRecord;

impl Database {
    /// Store a refresh token for a user
    pub fn insert_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES (?, ?, ?)",
            params![
                token,
                user_id,
                expires_at.format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Look up a refresh token by its value
    pub fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT id, user_id, expires_at FROM refresh_tokens WHERE token = ?",
                params![token],
                |row| {
                    Ok(RefreshTokenRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        expires_at: parse_datetime(&row.get::<_, String>(2)?),
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Delete a refresh token; returns whether a row was removed
    pub fn delete_refresh_token(&self, token: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM refresh_tokens WHERE token = ?", params![token])?;
        Ok(deleted > 0)
    }

    /// Remove all expired refresh tokens; returns how many were purged
    pub fn purge_expired_tokens(&self) -> Result<usize> {
        let conn = self.conn()?;
        let purged = conn.execute(
            "DELETE FROM refresh_tokens WHERE expires_at < ?",
            params![Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()],
        )?;
        Ok(purged)
    }
}
