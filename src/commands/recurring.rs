// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::query_rows;
use crate::recurring::advance_recurring_expenses;
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, parse_datetime, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("process", sub)) => {
            let now = match sub.get_one::<String>("now") {
                Some(s) => parse_datetime(s)?,
                None => chrono::Local::now().naive_local(),
            };
            let n = advance_recurring_expenses(&store, now)
                .with_context(|| format!("Process recurring expenses as of {}", now))?;
            println!("Created {} recurring occurrence(s)", n);
        }
        Some(("list", sub)) => {
            let rows: Vec<_> = query_rows(&store, &Default::default(), None)?
                .into_iter()
                .filter(|r| r.recurring)
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
                let data = rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.title.clone(),
                            r.category.clone(),
                            r.amount.clone(),
                            r.recurrence.clone(),
                            r.next.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Title", "Category", "Amount", "Repeats", "Next"], data)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
