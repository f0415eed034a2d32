// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::ExpenseFilter;
use crate::store::{ExpenseStore, SqliteStore};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

pub const CSV_HEADER: [&str; 6] = ["Date", "Title", "Category", "Amount", "Currency", "Description"];

/// One exported expense, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub title: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    pub description: String,
}

pub fn export_rows(store: &SqliteStore<'_>) -> crate::error::Result<Vec<ExportRow>> {
    let names: HashMap<i64, String> = store
        .list_categories(false)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let expenses = store.fetch_expenses(&ExpenseFilter::default())?;
    Ok(expenses
        .into_iter()
        .map(|e| ExportRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            category: names.get(&e.category_id).cloned().unwrap_or_default(),
            title: e.title,
            amount: e.amount.to_string(),
            currency: e.currency,
            description: e.description.unwrap_or_default(),
        })
        .collect())
}

pub fn write_csv<W: Write>(rows: &[ExportRow], out: W) -> crate::error::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for r in rows {
        wtr.write_record([
            &r.date,
            &r.title,
            &r.category,
            &r.amount,
            &r.currency,
            &r.description,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let fmt = m.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = m.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let rows = export_rows(&SqliteStore::new(conn))?;
    let file = std::fs::File::create(out).with_context(|| format!("Create {}", out))?;
    if fmt == "csv" {
        write_csv(&rows, file)?;
    } else {
        let mut w = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, &rows)?;
        w.flush()?;
    }
    println!("Exported {} expense(s) to {}", rows.len(), out);
    Ok(())
}
