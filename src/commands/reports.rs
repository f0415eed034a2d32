// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CategorySummary, PeriodSummary};
use crate::reports::{
    build_category_summary, build_monthly_report, build_yearly_report, period_label,
    total_expenses, total_for_month,
};
use crate::store::SqliteStore;
use crate::utils::{
    fmt_money, fmt_percent, get_default_currency, maybe_print_json, parse_date, parse_month,
    parse_year, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    // Amounts are summed as recorded; the label uses the default currency.
    let ccy = get_default_currency(conn)?;
    match m.subcommand() {
        Some(("categories", sub)) => categories(&store, &ccy, sub)?,
        Some(("monthly", sub)) => monthly(&store, &ccy, sub)?,
        Some(("yearly", sub)) => yearly(&store, &ccy, sub)?,
        Some(("totals", sub)) => totals(&store, &ccy, sub)?,
        _ => {}
    }
    Ok(())
}

fn category_table(ccy: &str, summaries: &[CategorySummary]) -> comfy_table::Table {
    let data = summaries
        .iter()
        .map(|s| {
            vec![
                s.category_name.clone(),
                s.category_color.clone(),
                fmt_money(&s.total_amount, ccy),
                s.transaction_count.to_string(),
                fmt_percent(&s.percentage),
            ]
        })
        .collect();
    pretty_table(&["Category", "Color", "Spent", "Count", "Share"], data)
}

fn period_table(ccy: &str, periods: &[PeriodSummary], monthly: bool) -> comfy_table::Table {
    let data = periods
        .iter()
        .map(|p| {
            vec![
                period_label(p.period, monthly),
                fmt_money(&p.total_amount, ccy),
                p.transaction_count.to_string(),
            ]
        })
        .collect();
    let first = if monthly { "Month" } else { "Day" };
    pretty_table(&[first, "Spent", "Count"], data)
}

fn categories(store: &SqliteStore<'_>, ccy: &str, sub: &clap::ArgMatches) -> Result<()> {
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    let summaries = build_category_summary(store, from, to)
        .with_context(|| format!("Category summary {}..{}", from, to))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summaries)? {
        println!("{}", category_table(ccy, &summaries));
    }
    Ok(())
}

fn monthly(store: &SqliteStore<'_>, ccy: &str, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let report = build_monthly_report(store, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    println!("Report for {:04}-{:02}", report.year, report.month);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Net"],
            vec![vec![
                fmt_money(&report.total_income, ccy),
                fmt_money(&report.total_expenses, ccy),
                fmt_money(&report.net_amount, ccy),
            ]],
        )
    );
    println!("{}", category_table(ccy, &report.category_breakdown));
    println!("{}", period_table(ccy, &report.daily_expenses, false));
    Ok(())
}

fn yearly(store: &SqliteStore<'_>, ccy: &str, sub: &clap::ArgMatches) -> Result<()> {
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;
    let report = build_yearly_report(store, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    println!("Report for {}", report.year);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Net"],
            vec![vec![
                fmt_money(&report.total_income, ccy),
                fmt_money(&report.total_expenses, ccy),
                fmt_money(&report.net_amount, ccy),
            ]],
        )
    );
    println!("{}", period_table(ccy, &report.monthly_expenses, true));
    println!("{}", category_table(ccy, &report.category_breakdown));
    Ok(())
}

fn totals(store: &SqliteStore<'_>, ccy: &str, sub: &clap::ArgMatches) -> Result<()> {
    let (label, total) = match sub.get_one::<String>("month") {
        Some(m) => {
            let (year, month) = parse_month(m)?;
            (
                format!("{:04}-{:02}", year, month),
                total_for_month(store, year, month)?,
            )
        }
        None => ("all time".to_string(), total_expenses(store)?),
    };
    let v = json!({ "period": label, "total": total, "currency": ccy });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        println!(
            "{}",
            pretty_table(&["Period", "Total"], vec![vec![label, fmt_money(&total, ccy)]])
        );
    }
    Ok(())
}
