//! Expense operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};

fn map_expense(row: &Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_name: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        date: parse_date(&row.get::<_, String>(7)?),
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        updated_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

const EXPENSE_COLUMNS: &str =
    "id, user_id, item_name, amount, currency, category, description, date, created_at, updated_at";

impl Database {
    /// Record an expense for a user
    ///
    /// The amount invariant (> 0) is validated by the caller and enforced by
    /// a CHECK constraint as a backstop.
    pub fn insert_expense(&self, user_id: i64, new: &NewExpense) -> Result<Expense> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, item_name, amount, currency, category, description, date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                new.item_name,
                new.amount,
                new.currency,
                new.category,
                new.description,
                new.date.to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get_expense(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {} not found after insert", id)))
    }

    /// List a user's expenses, newest first, with optional filters
    pub fn list_expenses(
        &self,
        user_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        // Build dynamic WHERE clause
        let mut conditions = vec!["user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(start) = start_date {
            conditions.push("date >= ?".to_string());
            params.push(Box::new(start.to_string()));
        }
        if let Some(end) = end_date {
            conditions.push("date <= ?".to_string());
            params.push(Box::new(end.to_string()));
        }
        if let Some(cat) = category {
            conditions.push("category = ?".to_string());
            params.push(Box::new(cat.to_string()));
        }

        let sql = format!(
            "SELECT {} FROM expenses WHERE {} ORDER BY date DESC, created_at DESC, id DESC",
            EXPENSE_COLUMNS,
            conditions.join(" AND ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(params_refs.as_slice(), map_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(expenses)
    }

    /// Sum of a user's expense amounts under the same filters as `list_expenses`
    pub fn sum_expenses(
        &self,
        user_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<f64> {
        let conn = self.conn()?;

        let mut conditions = vec!["user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(start) = start_date {
            conditions.push("date >= ?".to_string());
            params.push(Box::new(start.to_string()));
        }
        if let Some(end) = end_date {
            conditions.push("date <= ?".to_string());
            params.push(Box::new(end.to_string()));
        }
        if let Some(cat) = category {
            conditions.push("category = ?".to_string());
            params.push(Box::new(cat.to_string()));
        }

        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE {}",
            conditions.join(" AND ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let total: f64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(total)
    }

    /// Fetch a single expense, scoped to its owner
    pub fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses WHERE id = ? AND user_id = ?",
                    EXPENSE_COLUMNS
                ),
                params![id, user_id],
                map_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// Delete an expense, scoped to its owner; returns whether a row was removed
    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    pub fn count_expenses(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
