// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::categories::category_named;
use crate::models::{Expense, ExpenseFilter, RecurrenceType};
use crate::recurring::next_occurrence;
use crate::reports::month_bounds;
use crate::store::{ExpenseStore, SqliteStore};
use crate::utils::{
    get_default_currency, maybe_print_json, parse_date, parse_datetime, parse_decimal,
    parse_month, pretty_table, DATETIME_FMT,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => add(&store, sub)?,
        Some(("list", sub)) => {
            let filter = list_filter(&store, sub)?;
            let limit = sub.get_one::<usize>("limit").copied();
            print_rows(&store, &filter, limit, sub)?;
        }
        Some(("search", sub)) => {
            let filter = ExpenseFilter {
                search: sub.get_one::<String>("term").cloned(),
                ..ExpenseFilter::default()
            };
            print_rows(&store, &filter, None, sub)?;
        }
        Some(("show", sub)) => show(&store, sub)?,
        Some(("edit", sub)) => edit(&store, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.delete_expense(id)?;
            println!("Deleted expense #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn parse_repeat(sub: &clap::ArgMatches) -> Result<Option<RecurrenceType>> {
    sub.get_one::<String>("repeat")
        .map(|s| s.parse::<RecurrenceType>())
        .transpose()
        .map_err(Into::into)
}

fn add(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let title = sub.get_one::<String>("title").unwrap().trim().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = category_named(store, sub.get_one::<String>("category").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_datetime(d)?,
        None => chrono::Local::now().naive_local(),
    };
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.trim().to_uppercase(),
        None => get_default_currency(store.connection())?,
    };

    let mut expense = Expense::new(title, amount, date, category.id, currency);
    expense.description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    expense.receipt_path = sub.get_one::<String>("receipt").map(|s| s.trim().to_string());
    if let Some(kind) = parse_repeat(sub)? {
        expense.is_recurring = true;
        expense.recurrence = Some(kind);
        expense.next_recurrence_date = match sub.get_one::<String>("next") {
            Some(n) => Some(parse_datetime(n)?),
            None => next_occurrence(Some(kind), date)?,
        };
    }

    let saved = store
        .add_expense(&expense)
        .with_context(|| format!("Record expense '{}'", expense.title))?;
    println!(
        "Recorded #{} {} {:.2} on {} in '{}'",
        saved.id,
        saved.currency,
        saved.amount,
        saved.date.date(),
        category.name
    );
    if let Some(next) = saved.next_recurrence_date {
        println!(
            "Repeats {}; next on {}",
            saved.recurrence.map(|r| r.as_str()).unwrap_or("-"),
            next.date()
        );
    }
    Ok(())
}

fn edit(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut expense = store.get_expense(id)?;
    if let Some(t) = sub.get_one::<String>("title") {
        expense.title = t.trim().to_string();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        expense.amount = parse_decimal(a)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        expense.category_id = category_named(store, c)?.id;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        expense.date = parse_datetime(d)?;
    }
    if let Some(c) = sub.get_one::<String>("currency") {
        expense.currency = c.trim().to_uppercase();
    }
    if let Some(d) = sub.get_one::<String>("description") {
        expense.description = Some(d.trim().to_string()).filter(|d| !d.is_empty());
    }
    if let Some(r) = sub.get_one::<String>("receipt") {
        expense.receipt_path = Some(r.trim().to_string()).filter(|r| !r.is_empty());
    }
    if sub.get_flag("no-repeat") {
        expense.is_recurring = false;
        expense.recurrence = None;
        expense.next_recurrence_date = None;
    }
    if let Some(kind) = parse_repeat(sub)? {
        expense.is_recurring = true;
        expense.recurrence = Some(kind);
        if expense.next_recurrence_date.is_none() {
            expense.next_recurrence_date = next_occurrence(Some(kind), expense.date)?;
        }
    }
    if let Some(n) = sub.get_one::<String>("next") {
        expense.next_recurrence_date = Some(parse_datetime(n)?);
    }
    let saved = store.update_expense(&expense)?;
    println!("Updated expense #{} '{}'", saved.id, saved.title);
    Ok(())
}

fn list_filter(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<ExpenseFilter> {
    let mut filter = ExpenseFilter::default();
    if let Some(month) = sub.get_one::<String>("month") {
        let (y, m) = parse_month(month)?;
        filter.date_range = Some(month_bounds(y, m)?);
    } else {
        let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
        let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
        if from.is_some() || to.is_some() {
            let earliest = chrono::NaiveDate::from_ymd_opt(1, 1, 1).context("calendar start")?;
            let latest = chrono::NaiveDate::from_ymd_opt(9999, 12, 31).context("calendar end")?;
            filter.date_range = Some((from.unwrap_or(earliest), to.unwrap_or(latest)));
        }
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        filter.category_id = Some(category_named(store, cat)?.id);
    }
    Ok(filter)
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    pub recurring: bool,
    pub recurrence: String,
    pub next: String,
    pub description: String,
}

/// Display rows for `filter`, newest first, with category names resolved.
pub fn query_rows(
    store: &SqliteStore<'_>,
    filter: &ExpenseFilter,
    limit: Option<usize>,
) -> Result<Vec<ExpenseRow>> {
    let names: HashMap<i64, String> = store
        .list_categories(false)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let mut expenses = store.fetch_expenses(filter)?;
    if let Some(limit) = limit {
        expenses.truncate(limit);
    }
    Ok(expenses
        .into_iter()
        .map(|e| ExpenseRow {
            id: e.id,
            date: e.date.format(DATETIME_FMT).to_string(),
            title: e.title,
            category: names.get(&e.category_id).cloned().unwrap_or_default(),
            amount: format!("{:.2}", e.amount),
            currency: e.currency,
            recurring: e.is_recurring,
            recurrence: e.recurrence.map(|r| r.to_string()).unwrap_or_default(),
            next: e
                .next_recurrence_date
                .map(|n| n.date().to_string())
                .unwrap_or_default(),
            description: e.description.unwrap_or_default(),
        })
        .collect())
}

fn print_rows(
    store: &SqliteStore<'_>,
    filter: &ExpenseFilter,
    limit: Option<usize>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let data = query_rows(store, filter, limit)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.title.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.recurrence.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Title", "Category", "Amount", "CCY", "Repeats", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

fn show(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let expense = store.get_expense(id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &expense)? {
        return Ok(());
    }
    let category = store.fetch_category(expense.category_id)?;
    let rows = vec![
        vec!["Title".into(), expense.title.clone()],
        vec!["Amount".into(), format!("{} {:.2}", expense.currency, expense.amount)],
        vec!["Date".into(), expense.date.format(DATETIME_FMT).to_string()],
        vec!["Category".into(), category.name],
        vec!["Description".into(), expense.description.clone().unwrap_or_default()],
        vec!["Receipt".into(), expense.receipt_path.clone().unwrap_or_default()],
        vec![
            "Repeats".into(),
            expense.recurrence.map(|r| r.to_string()).unwrap_or_else(|| {
                if expense.is_recurring { "yes".into() } else { "no".into() }
            }),
        ],
        vec![
            "Next".into(),
            expense
                .next_recurrence_date
                .map(|n| n.format(DATETIME_FMT).to_string())
                .unwrap_or_default(),
        ],
    ];
    let header = format!("Expense #{}", id);
    println!("{}", pretty_table(&["Field", header.as_str()], rows));
    Ok(())
}
