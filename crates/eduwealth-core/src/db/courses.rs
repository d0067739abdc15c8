//! Course catalog operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Course, CourseUpsertResult, NewCourse};
use crate::recommend::{BrowseFilter, CourseCatalog};

pub(super) fn map_course(row: &Row) -> rusqlite::Result<Course> {
    let categories_json: Option<String> = row.get(9)?;
    // A malformed categories column degrades to "no tags" rather than failing the row
    let categories = categories_json.and_then(|json| serde_json::from_str(&json).ok());

    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        provider_name: row.get(2)?,
        provider_slug: row.get(3)?,
        url: row.get(4)?,
        price: row.get(5)?,
        currency: row.get(6)?,
        rating: row.get(7)?,
        duration: row.get(8)?,
        categories,
        thumbnail_url: row.get(10)?,
        description: row.get(11)?,
        source_hash: row.get(12)?,
        scraped_at: parse_datetime(&row.get::<_, String>(13)?),
        updated_at: parse_datetime(&row.get::<_, String>(14)?),
    })
}

const COURSE_COLUMNS: &str = "id, title, provider_name, provider_slug, url, price, currency, \
     rating, duration, categories, thumbnail_url, description, source_hash, scraped_at, updated_at";

impl Database {
    /// Upsert a course keyed by source_hash
    ///
    /// An existing row keeps its identity and scrape history; title, price,
    /// rating, and updated_at are refreshed to the latest crawl values.
    pub fn upsert_course(&self, new: &NewCourse) -> Result<CourseUpsertResult> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM courses WHERE source_hash = ?",
                params![new.source_hash],
                |row| row.get(0),
            )
            .optional()?;

        let categories_json = new
            .categories
            .as_ref()
            .map(|c| serde_json::to_string(c))
            .transpose()?;

        if let Some(id) = existing {
            conn.execute(
                r#"
                UPDATE courses
                SET title = ?, price = ?, rating = ?, updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
                params![new.title, new.price, new.rating, id],
            )?;
            return Ok(CourseUpsertResult::Updated(id));
        }

        conn.execute(
            r#"
            INSERT INTO courses (title, provider_name, provider_slug, url, price, currency,
                                 rating, duration, categories, thumbnail_url, description, source_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                new.title,
                new.provider_name,
                new.provider_slug,
                new.url,
                new.price,
                new.currency,
                new.rating,
                new.duration,
                categories_json,
                new.thumbnail_url,
                new.description,
                new.source_hash,
            ],
        )?;

        Ok(CourseUpsertResult::Inserted(conn.last_insert_rowid()))
    }

    pub fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let conn = self.conn()?;
        let course = conn
            .query_row(
                &format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS),
                params![id],
                map_course,
            )
            .optional()?;
        Ok(course)
    }

    pub fn get_course_by_hash(&self, source_hash: &str) -> Result<Option<Course>> {
        let conn = self.conn()?;
        let course = conn
            .query_row(
                &format!(
                    "SELECT {} FROM courses WHERE source_hash = ?",
                    COURSE_COLUMNS
                ),
                params![source_hash],
                map_course,
            )
            .optional()?;
        Ok(course)
    }

    /// List catalog courses, best-rated and freshest first
    pub fn list_courses(&self, limit: i64) -> Result<Vec<Course>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM courses ORDER BY rating DESC, scraped_at DESC LIMIT ?",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map(params![limit], map_course)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(courses)
    }

    pub fn count_courses(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl CourseCatalog for Database {
    fn courses_in_price_band(
        &self,
        min_price: f64,
        max_price: f64,
        currency: &str,
        limit: i64,
    ) -> Result<Vec<Course>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM courses
            WHERE price >= ? AND price <= ? AND currency = ?
            ORDER BY rating DESC, price ASC
            LIMIT ?
            "#,
            COURSE_COLUMNS
        ))?;

        let courses = stmt
            .query_map(params![min_price, max_price, currency, limit], map_course)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(courses)
    }

    fn browse_candidates(&self, filter: &BrowseFilter, fetch_limit: i64) -> Result<Vec<Course>> {
        let conn = self.conn()?;

        // Build dynamic WHERE clause
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(search) = filter.search.as_deref() {
            if !search.trim().is_empty() {
                conditions.push(
                    "(title LIKE ? COLLATE NOCASE OR description LIKE ? COLLATE NOCASE)"
                        .to_string(),
                );
                let pattern = format!("%{}%", search.trim());
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }
        }

        if let Some(max_price) = filter.max_price {
            // Free courses (NULL price) always pass a max-price filter
            conditions.push("(price <= ? OR price IS NULL)".to_string());
            params.push(Box::new(max_price));
        }

        if let Some(interest) = filter.interest.as_deref() {
            if !interest.trim().is_empty() {
                conditions.push(
                    "(title LIKE ? COLLATE NOCASE OR description LIKE ? COLLATE NOCASE)"
                        .to_string(),
                );
                let pattern = format!("%{}%", interest.trim());
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT {}
            FROM courses
            {}
            ORDER BY rating DESC, scraped_at DESC
            LIMIT ?
            "#,
            COURSE_COLUMNS, where_clause
        );
        params.push(Box::new(fetch_limit));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let courses = stmt
            .query_map(params_refs.as_slice(), map_course)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(courses)
    }
}
