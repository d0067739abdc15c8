//! Interest topics and per-user selections

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Interest;

/// Normalize an interest name into a slug
///
/// Lowercases, maps runs of non-alphanumeric characters to single dashes,
/// and trims leading/trailing dashes ("Machine Learning!" -> "machine-learning").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress a leading dash

    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

fn map_interest(row: &Row) -> rusqlite::Result<Interest> {
    Ok(Interest {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

impl Database {
    /// List every interest, ordered by name
    pub fn list_interests(&self) -> Result<Vec<Interest>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, slug, created_at FROM interests ORDER BY name")?;
        let interests = stmt
            .query_map([], map_interest)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(interests)
    }

    /// Fetch an interest by slug, creating it on first sight of the name
    pub fn get_or_create_interest(&self, name: &str) -> Result<Interest> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(Error::Validation(format!(
                "Interest name '{}' has no usable characters",
                name
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO interests (name, slug) VALUES (?, ?)",
            params![name, slug],
        )?;

        let interest = conn
            .query_row(
                "SELECT id, name, slug, created_at FROM interests WHERE slug = ?",
                params![slug],
                map_interest,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Interest '{}' not found", slug)))?;
        Ok(interest)
    }

    /// Replace a user's interest selection
    ///
    /// Existing links are dropped, unseen names are created lazily, and the
    /// new selection is linked in one transaction.
    pub fn set_user_interests(&self, user_id: i64, names: &[String]) -> Result<Vec<Interest>> {
        let interests: Vec<Interest> = names
            .iter()
            .map(|name| self.get_or_create_interest(name))
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM user_interests WHERE user_id = ?",
            params![user_id],
        )?;
        for interest in &interests {
            tx.execute(
                "INSERT OR IGNORE INTO user_interests (user_id, interest_id) VALUES (?, ?)",
                params![user_id, interest.id],
            )?;
        }

        tx.commit()?;

        self.list_user_interests(user_id)
    }

    /// A user's selected interests, ordered by name
    pub fn list_user_interests(&self, user_id: i64) -> Result<Vec<Interest>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT i.id, i.name, i.slug, i.created_at
            FROM interests i
            INNER JOIN user_interests ui ON ui.interest_id = i.id
            WHERE ui.user_id = ?
            ORDER BY i.name
            "#,
        )?;
        let interests = stmt
            .query_map(params![user_id], map_interest)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(interests)
    }

    /// A user's interest names (lowercased for matching)
    pub fn user_interest_names(&self, user_id: i64) -> Result<Vec<String>> {
        Ok(self
            .list_user_interests(user_id)?
            .into_iter()
            .map(|i| i.name.to_lowercase())
            .collect())
    }
}
