// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::ExpenseError;
use crate::models::check_year;

/// Storage and display format for expense timestamps. Lexicographic order
/// matches chronological order, and the first 10 chars are the day.
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub const FALLBACK_CURRENCY: &str = "USD";

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))?;
    check_year(d.year())?;
    Ok(d)
}

/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DD HH:MM[:SS]` or the same with
/// a `T` separator.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        DATETIME_FMT,
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            check_year(dt.year())?;
            return Ok(dt);
        }
    }
    let day = parse_date(s)
        .with_context(|| format!("Invalid date/time '{}', expected YYYY-MM-DD [HH:MM[:SS]]", s))?;
    Ok(day.and_time(chrono::NaiveTime::MIN))
}

/// Parse `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    check_year(first.year())?;
    Ok((first.year(), first.month()))
}

pub fn parse_year(s: &str) -> Result<i32> {
    let y: i32 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid year '{}', expected YYYY", s))?;
    check_year(y)?;
    Ok(y)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn fmt_percent(d: &Decimal) -> String {
    format!("{:.1}%", d.round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn validate_currency(code: &str) -> crate::error::Result<String> {
    let code = code.trim().to_uppercase();
    if !CURRENCY_RE.is_match(&code) {
        return Err(ExpenseError::invalid(format!(
            "currency '{}' must be a 3-letter code",
            code
        )));
    }
    Ok(code)
}

pub fn validate_color(color: &str) -> crate::error::Result<String> {
    let color = color.trim();
    if !COLOR_RE.is_match(color) {
        return Err(ExpenseError::invalid(format!(
            "color '{}' must look like #RRGGBB",
            color
        )));
    }
    Ok(color.to_uppercase())
}

// Default currency settings
pub fn get_default_currency(conn: &Connection) -> crate::error::Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='default_currency'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| FALLBACK_CURRENCY.to_string()))
}

pub fn set_default_currency(conn: &Connection, ccy: &str) -> crate::error::Result<String> {
    let ccy = validate_currency(ccy)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('default_currency', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![ccy],
    )?;
    Ok(ccy)
}
