// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Expense and category persistence.
//!
//! The reporting engine only needs [`ExpenseStore`]; the CRUD helpers on
//! [`SqliteStore`] back the command-line surface.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use rust_decimal::Decimal;

use crate::error::{ExpenseError, Result};
use crate::models::{check_year, Category, Expense, ExpenseFilter, RecurrenceType};
use crate::utils::{validate_color, validate_currency, DATETIME_FMT};

/// Read and write access the reporting engine needs from storage.
pub trait ExpenseStore {
    /// Expenses matching every set field of `filter`, newest first.
    fn fetch_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>>;

    fn fetch_category(&self, id: i64) -> Result<Category>;

    /// Insert `new` and overwrite `updated` (matched by id) atomically.
    /// Returns the ids assigned to `new`, in order.
    fn persist(&self, new: &[Expense], updated: &[Expense]) -> Result<Vec<i64>>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

const EXPENSE_COLUMNS: &str = "e.id, e.title, e.description, e.amount, e.currency, e.date, \
     e.category_id, e.receipt_path, e.is_recurring, e.recurrence, e.next_recurrence_date, \
     e.created_at, e.updated_at";

const CATEGORY_COLUMNS: &str =
    "id, name, description, color, icon, budget_limit, is_active, created_at";

fn conversion<T, E>(idx: usize, res: std::result::Result<T, E>) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    res.map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn naive_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = r.get(idx)?;
    conversion(idx, NaiveDateTime::parse_from_str(&s, DATETIME_FMT))
}

fn utc_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = r.get(idx)?;
    conversion(
        idx,
        DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)),
    )
}

fn decimal_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    conversion(idx, s.parse::<Decimal>())
}

fn expense_from_row(r: &Row<'_>) -> rusqlite::Result<Expense> {
    let recurrence = match r.get::<_, Option<String>>(9)? {
        Some(s) => Some(conversion(9, s.parse::<RecurrenceType>())?),
        None => None,
    };
    let next_recurrence_date = match r.get::<_, Option<String>>(10)? {
        Some(s) => Some(conversion(
            10,
            NaiveDateTime::parse_from_str(&s, DATETIME_FMT),
        )?),
        None => None,
    };
    Ok(Expense {
        id: r.get(0)?,
        title: r.get(1)?,
        description: r.get(2)?,
        amount: decimal_col(r, 3)?,
        currency: r.get(4)?,
        date: naive_col(r, 5)?,
        category_id: r.get(6)?,
        receipt_path: r.get(7)?,
        is_recurring: r.get(8)?,
        recurrence,
        next_recurrence_date,
        created_at: utc_col(r, 11)?,
        updated_at: utc_col(r, 12)?,
    })
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        color: r.get(3)?,
        icon: r.get(4)?,
        budget_limit: decimal_col(r, 5)?,
        is_active: r.get(6)?,
        created_at: utc_col(r, 7)?,
    })
}

fn fmt_naive(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

/// Checks the record invariants and returns the normalized currency code.
pub fn validate_expense(e: &Expense) -> Result<String> {
    let title = e.title.trim();
    if title.is_empty() {
        return Err(ExpenseError::invalid("title must not be empty"));
    }
    if title.chars().count() > 100 {
        return Err(ExpenseError::invalid("title is longer than 100 characters"));
    }
    if let Some(d) = &e.description {
        if d.chars().count() > 500 {
            return Err(ExpenseError::invalid(
                "description is longer than 500 characters",
            ));
        }
    }
    check_year(e.date.year())?;
    if let Some(next) = &e.next_recurrence_date {
        check_year(next.year())?;
    }
    if e.amount <= Decimal::ZERO {
        return Err(ExpenseError::invalid(format!(
            "amount must be greater than 0 (got {})",
            e.amount
        )));
    }
    validate_currency(&e.currency)
}

/// Checks the category invariants and returns the normalized color.
pub fn validate_category(c: &Category) -> Result<String> {
    let name = c.name.trim();
    if name.is_empty() {
        return Err(ExpenseError::invalid("category name must not be empty"));
    }
    if name.chars().count() > 50 {
        return Err(ExpenseError::invalid(
            "category name is longer than 50 characters",
        ));
    }
    if let Some(d) = &c.description {
        if d.chars().count() > 200 {
            return Err(ExpenseError::invalid(
                "category description is longer than 200 characters",
            ));
        }
    }
    if c.budget_limit < Decimal::ZERO {
        return Err(ExpenseError::invalid("budget limit must not be negative"));
    }
    validate_color(&c.color)
}

fn insert_expense(tx: &Transaction<'_>, e: &Expense, now: &str) -> Result<i64> {
    let currency = validate_expense(e)?;
    tx.execute(
        "INSERT INTO expenses(title, description, amount, currency, date, category_id, receipt_path,
                              is_recurring, recurrence, next_recurrence_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            e.title.trim(),
            e.description,
            e.amount.to_string(),
            currency,
            fmt_naive(&e.date),
            e.category_id,
            e.receipt_path,
            e.is_recurring,
            e.recurrence.map(|r| r.as_str()),
            e.next_recurrence_date.as_ref().map(fmt_naive),
            now,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn update_expense_row(tx: &Transaction<'_>, e: &Expense, now: &str) -> Result<()> {
    let currency = validate_expense(e)?;
    let n = tx.execute(
        "UPDATE expenses SET title=?1, description=?2, amount=?3, currency=?4, date=?5,
                category_id=?6, receipt_path=?7, is_recurring=?8, recurrence=?9,
                next_recurrence_date=?10, updated_at=?11
         WHERE id=?12",
        params![
            e.title.trim(),
            e.description,
            e.amount.to_string(),
            currency,
            fmt_naive(&e.date),
            e.category_id,
            e.receipt_path,
            e.is_recurring,
            e.recurrence.map(|r| r.as_str()),
            e.next_recurrence_date.as_ref().map(fmt_naive),
            now,
            e.id,
        ],
    )?;
    if n == 0 {
        return Err(ExpenseError::not_found("expense", e.id));
    }
    Ok(())
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        self.conn
    }

    pub fn list_categories(&self, active_only: bool) -> Result<Vec<Category>> {
        let sql = if active_only {
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active=1 ORDER BY name")
        } else {
            format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name")
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], category_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name=?1");
        let c = self
            .conn
            .query_row(&sql, params![name.trim()], category_from_row)
            .optional()?;
        Ok(c)
    }

    pub fn add_category(&self, category: &Category) -> Result<Category> {
        let color = validate_category(category)?;
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO categories(name, description, color, icon, budget_limit, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                category.name.trim(),
                category.description,
                color,
                category.icon,
                category.budget_limit.to_string(),
                category.is_active,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name = %category.name, "category added");
        self.fetch_category(id)
    }

    pub fn update_category(&self, category: &Category) -> Result<Category> {
        let color = validate_category(category)?;
        let n = self.conn.execute(
            "UPDATE categories SET name=?1, description=?2, color=?3, icon=?4, budget_limit=?5, is_active=?6
             WHERE id=?7",
            params![
                category.name.trim(),
                category.description,
                color,
                category.icon,
                category.budget_limit.to_string(),
                category.is_active,
                category.id,
            ],
        )?;
        if n == 0 {
            return Err(ExpenseError::not_found("category", category.id));
        }
        self.fetch_category(category.id)
    }

    /// Deletes a category that has no expenses.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        self.fetch_category(id)?;
        let used: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category_id=?1",
            params![id],
            |r| r.get(0),
        )?;
        if used > 0 {
            return Err(ExpenseError::invalid(format!(
                "category {} still has {} expense(s)",
                id, used
            )));
        }
        self.conn
            .execute("DELETE FROM categories WHERE id=?1", params![id])?;
        tracing::info!(id, "category deleted");
        Ok(())
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle_category(&self, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE categories SET is_active = 1 - is_active WHERE id=?1",
            params![id],
        )?;
        if n == 0 {
            return Err(ExpenseError::not_found("category", id));
        }
        Ok(self.fetch_category(id)?.is_active)
    }

    pub fn get_expense(&self, id: i64) -> Result<Expense> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses e WHERE e.id=?1");
        self.conn
            .query_row(&sql, params![id], expense_from_row)
            .optional()?
            .ok_or_else(|| ExpenseError::not_found("expense", id))
    }

    pub fn add_expense(&self, expense: &Expense) -> Result<Expense> {
        self.fetch_category(expense.category_id)?;
        let ids = self.persist(std::slice::from_ref(expense), &[])?;
        let id = ids
            .first()
            .copied()
            .ok_or_else(|| ExpenseError::invalid("expense was not inserted"))?;
        self.get_expense(id)
    }

    pub fn update_expense(&self, expense: &Expense) -> Result<Expense> {
        self.fetch_category(expense.category_id)?;
        self.persist(&[], std::slice::from_ref(expense))?;
        self.get_expense(expense.id)
    }

    pub fn delete_expense(&self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM expenses WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(ExpenseError::not_found("expense", id));
        }
        tracing::info!(id, "expense deleted");
        Ok(())
    }
}

impl ExpenseStore for SqliteStore<'_> {
    fn fetch_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses e LEFT JOIN categories c ON e.category_id=c.id WHERE 1=1"
        );
        let mut params_vec: Vec<String> = Vec::new();

        if let Some((start, end)) = filter.date_range {
            sql.push_str(" AND substr(e.date,1,10) >= ? AND substr(e.date,1,10) <= ?");
            params_vec.push(start.to_string());
            params_vec.push(end.to_string());
        }
        if let Some(cat) = filter.category_id {
            sql.push_str(" AND e.category_id = ?");
            params_vec.push(cat.to_string());
        }
        if let Some(due) = filter.recurring_due_before {
            sql.push_str(
                " AND e.is_recurring = 1 AND e.next_recurrence_date IS NOT NULL AND e.next_recurrence_date <= ?",
            );
            params_vec.push(fmt_naive(&due));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            // LIKE is ASCII case-insensitive in SQLite
            sql.push_str(
                " AND (e.title LIKE ? OR IFNULL(e.description,'') LIKE ? OR IFNULL(c.name,'') LIKE ?)",
            );
            let pat = format!("%{}%", term);
            params_vec.extend([pat.clone(), pat.clone(), pat]);
        }
        sql.push_str(" ORDER BY e.date DESC, e.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), expense_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        tracing::debug!(count = out.len(), ?filter, "fetched expenses");
        Ok(out)
    }

    fn fetch_category(&self, id: i64) -> Result<Category> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id=?1");
        self.conn
            .query_row(&sql, params![id], category_from_row)
            .optional()?
            .ok_or_else(|| ExpenseError::not_found("category", id))
    }

    fn persist(&self, new: &[Expense], updated: &[Expense]) -> Result<Vec<i64>> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();
        let written = (|| -> Result<Vec<i64>> {
            let mut ids = Vec::with_capacity(new.len());
            for e in new {
                ids.push(insert_expense(&tx, e, &now)?);
            }
            for e in updated {
                update_expense_row(&tx, e, &now)?;
            }
            Ok(ids)
        })();
        match written {
            Ok(ids) => {
                tx.commit()?;
                tracing::info!(inserted = new.len(), updated = updated.len(), "persisted expense batch");
                Ok(ids)
            }
            Err(err) => {
                if let Err(source) = tx.rollback() {
                    return Err(ExpenseError::PartialBatchFailure { source });
                }
                tracing::warn!(error = %err, "expense batch rolled back");
                Err(err)
            }
        }
    }
}
