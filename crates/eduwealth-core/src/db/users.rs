//! User account operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewUser, User, UserAuth};

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        google_id: row.get(3)?,
        budget_amount: row.get(4)?,
        currency: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

const USER_COLUMNS: &str =
    "id, email, name, google_id, budget_amount, currency, created_at, updated_at";

impl Database {
    /// Create a user; fails with a validation error on duplicate email
    pub fn create_user(&self, new: &NewUser) -> Result<User> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO users (email, name, password_hash, google_id) VALUES (?, ?, ?, ?)",
            params![new.email, new.name, new.password_hash, new.google_id],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::Validation(
                    "User with this email already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {} not found after insert", id)))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE google_id = ?", USER_COLUMNS),
                params![google_id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Credentials for the login path (includes the password hash)
    pub fn get_auth_by_email(&self, email: &str) -> Result<Option<UserAuth>> {
        let conn = self.conn()?;
        let auth = conn
            .query_row(
                "SELECT id, email, name, password_hash FROM users WHERE email = ?",
                params![email],
                |row| {
                    Ok(UserAuth {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(auth)
    }

    /// Attach a Google account to an existing user (account linking)
    pub fn link_google_id(&self, user_id: i64, google_id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET google_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![google_id, user_id],
        )?;
        Ok(())
    }

    /// Partial profile update; unset fields are left unchanged
    pub fn update_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        budget_amount: Option<f64>,
        currency: Option<&str>,
    ) -> Result<User> {
        let conn = self.conn()?;

        if let Some(name) = name {
            conn.execute(
                "UPDATE users SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                params![name, user_id],
            )?;
        }
        if let Some(budget) = budget_amount {
            conn.execute(
                "UPDATE users SET budget_amount = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                params![budget, user_id],
            )?;
        }
        if let Some(currency) = currency {
            conn.execute(
                "UPDATE users SET currency = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                params![currency, user_id],
            )?;
        }
        drop(conn);

        self.get_user(user_id)?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
    }

    /// Delete a user; expenses, tokens, interests links, and saved courses cascade
    pub fn delete_user(&self, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![user_id])?;
        Ok(deleted > 0)
    }

    pub fn count_users(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}
