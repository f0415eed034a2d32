// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, DatabaseName, params};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExpenseError;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.outlay", "Outlay", "outlay"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("outlay.sqlite"))
}

/// Open the database at `path` (or the platform default) and make sure the
/// schema and default categories exist.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> crate::error::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        color TEXT NOT NULL DEFAULT '#512BD4',
        icon TEXT,
        budget_limit TEXT NOT NULL DEFAULT '0',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL DEFAULT 'USD',
        date TEXT NOT NULL, -- YYYY-MM-DD HH:MM:SS, local time
        category_id INTEGER NOT NULL,
        receipt_path TEXT,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        recurrence TEXT CHECK(recurrence IN ('daily','weekly','monthly','yearly')),
        next_recurrence_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
    CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);
    "#,
    )?;
    seed_default_categories(conn)?;
    Ok(())
}

const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str, &str)] = &[
    ("Food & Dining", "Restaurants, groceries, and meals", "#FF6B6B", "🍽️", "500"),
    ("Transportation", "Gas, public transport, car maintenance", "#4ECDC4", "🚗", "300"),
    ("Entertainment", "Movies, games, subscriptions", "#45B7D1", "🎬", "200"),
    ("Bills & Utilities", "Electricity, water, internet, phone", "#96CEB4", "📄", "400"),
    ("Shopping", "Clothes, electronics, general shopping", "#FFEAA7", "🛍️", "300"),
    ("Healthcare", "Medical expenses, pharmacy, insurance", "#DDA0DD", "🏥", "250"),
    ("Education", "Books, courses, training", "#FFA07A", "📚", "150"),
    ("Travel", "Hotels, flights, vacation expenses", "#98D8C8", "✈️", "600"),
    ("Other", "Miscellaneous expenses", "#A8A8A8", "📦", "100"),
];

// Seeds only an empty table so deleted defaults stay deleted.
fn seed_default_categories(conn: &mut Connection) -> crate::error::Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if count > 0 {
        return Ok(());
    }
    let tx = conn.transaction()?;
    {
        let now = chrono::Utc::now().to_rfc3339();
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO categories(name, description, color, icon, budget_limit, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        )?;
        for (name, description, color, icon, limit) in DEFAULT_CATEGORIES {
            stmt.execute(params![name, description, color, icon, limit, now])?;
        }
    }
    tx.commit()?;
    tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(())
}

/// Copy the live database into `dest` using SQLite's online backup.
pub fn backup_to(conn: &Connection, dest: &Path) -> crate::error::Result<()> {
    conn.backup(DatabaseName::Main, dest, None)?;
    tracing::info!(dest = %dest.display(), "database backed up");
    Ok(())
}

/// Replace the live database with the contents of `src`.
pub fn restore_from(conn: &mut Connection, src: &Path) -> crate::error::Result<()> {
    if !src.is_file() {
        return Err(ExpenseError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("backup file {} does not exist", src.display()),
        )));
    }
    conn.restore(
        DatabaseName::Main,
        src,
        None::<fn(rusqlite::backup::Progress)>,
    )?;
    tracing::info!(src = %src.display(), "database restored");
    Ok(())
}
