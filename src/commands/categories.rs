// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Category;
use crate::reports::category_usage;
use crate::store::SqliteStore;
use crate::utils::{fmt_percent, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => add(&store, sub)?,
        Some(("list", sub)) => list(&store, sub)?,
        Some(("show", sub)) => show(&store, sub)?,
        Some(("edit", sub)) => edit(&store, sub)?,
        Some(("rm", sub)) => {
            let cat = category_named(&store, sub.get_one::<String>("name").unwrap())?;
            store.delete_category(cat.id)?;
            println!("Removed category '{}'", cat.name);
        }
        Some(("toggle", sub)) => {
            let cat = category_named(&store, sub.get_one::<String>("name").unwrap())?;
            let active = store.toggle_category(cat.id)?;
            println!(
                "Category '{}' is now {}",
                cat.name,
                if active { "active" } else { "inactive" }
            );
        }
        Some(("usage", sub)) => usage(&store, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn category_named(store: &SqliteStore<'_>, name: &str) -> Result<Category> {
    store
        .category_by_name(name)?
        .with_context(|| format!("Category '{}' not found", name.trim()))
}

fn apply_fields(cat: &mut Category, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(d) = sub.get_one::<String>("description") {
        cat.description = Some(d.trim().to_string()).filter(|d| !d.is_empty());
    }
    if let Some(c) = sub.get_one::<String>("color") {
        cat.color = c.trim().to_string();
    }
    if let Some(i) = sub.get_one::<String>("icon") {
        cat.icon = Some(i.trim().to_string()).filter(|i| !i.is_empty());
    }
    if let Some(b) = sub.get_one::<String>("budget") {
        cat.budget_limit = parse_decimal(b)?;
    }
    Ok(())
}

fn add(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let mut cat = Category::new(sub.get_one::<String>("name").unwrap().trim());
    apply_fields(&mut cat, sub)?;
    let cat = store
        .add_category(&cat)
        .with_context(|| format!("Add category '{}'", cat.name))?;
    println!("Added category '{}' ({})", cat.name, cat.color);
    Ok(())
}

fn edit(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let mut cat = category_named(store, sub.get_one::<String>("name").unwrap())?;
    if let Some(n) = sub.get_one::<String>("rename") {
        cat.name = n.trim().to_string();
    }
    apply_fields(&mut cat, sub)?;
    let cat = store.update_category(&cat)?;
    println!("Updated category '{}'", cat.name);
    Ok(())
}

fn row(c: &Category) -> Vec<String> {
    vec![
        c.name.clone(),
        c.color.clone(),
        c.icon.clone().unwrap_or_default(),
        format!("{:.2}", c.budget_limit),
        if c.is_active { "yes".into() } else { "no".into() },
        c.description.clone().unwrap_or_default(),
    ]
}

const HEADERS: [&str; 6] = ["Category", "Color", "Icon", "Budget", "Active", "Description"];

fn list(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let cats = store.list_categories(sub.get_flag("active"))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
        let data = cats.iter().map(row).collect();
        println!("{}", pretty_table(&HEADERS, data));
    }
    Ok(())
}

fn show(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let cat = category_named(store, sub.get_one::<String>("name").unwrap())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cat)? {
        println!("{}", pretty_table(&HEADERS, vec![row(&cat)]));
    }
    Ok(())
}

fn usage(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let usage = category_usage(store, store.list_categories(false)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &usage)? {
        let data = usage
            .iter()
            .map(|u| {
                vec![
                    u.category.name.clone(),
                    format!("{:.2}", u.category.budget_limit),
                    format!("{:.2}", u.total_expenses),
                    format!("{:.2}", u.remaining_budget),
                    fmt_percent(&u.utilization),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining", "Used"], data)
        );
    }
    Ok(())
}
