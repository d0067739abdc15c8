//! Per-user saved course lists

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::Course;

impl Database {
    /// Save a course for a user; returns false if it was already saved
    pub fn save_course_for_user(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO user_saved_courses (user_id, course_id) VALUES (?, ?)",
            params![user_id, course_id],
        )?;
        Ok(inserted > 0)
    }

    /// Remove a saved course; returns whether a row was removed
    pub fn unsave_course_for_user(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM user_saved_courses WHERE user_id = ? AND course_id = ?",
            params![user_id, course_id],
        )?;
        Ok(deleted > 0)
    }

    /// A user's saved courses, most recently saved first
    pub fn list_saved_courses(&self, user_id: i64) -> Result<Vec<Course>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.title, c.provider_name, c.provider_slug, c.url, c.price, c.currency,
                   c.rating, c.duration, c.categories, c.thumbnail_url, c.description,
                   c.source_hash, c.scraped_at, c.updated_at
            FROM courses c
            INNER JOIN user_saved_courses usc ON usc.course_id = c.id
            WHERE usc.user_id = ?
            ORDER BY usc.added_at DESC, c.id DESC
            "#,
        )?;

        let courses = stmt
            .query_map(params![user_id], super::courses::map_course)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(courses)
    }
}
