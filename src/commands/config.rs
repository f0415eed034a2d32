// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{find_currency, SUPPORTED_CURRENCIES};
use crate::utils::{get_default_currency, maybe_print_json, pretty_table, set_default_currency};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", _)) => {
            let ccy = get_default_currency(conn)?;
            println!(
                "{}",
                pretty_table(&["Setting", "Value"], vec![vec!["default-currency".into(), ccy]])
            );
        }
        Some(("set", sub)) => {
            let ccy = set_default_currency(conn, sub.get_one::<String>("default-currency").unwrap())?;
            if find_currency(&ccy).is_none() {
                eprintln!("Note: {} is not in the supported currency list", ccy);
            }
            println!("Default currency set to {}", ccy);
        }
        _ => {}
    }
    Ok(())
}

pub fn currencies(m: &clap::ArgMatches) -> Result<()> {
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &SUPPORTED_CURRENCIES)? {
        let data = SUPPORTED_CURRENCIES
            .iter()
            .map(|c| vec![c.code.to_string(), c.name.to_string(), c.symbol.to_string()])
            .collect();
        println!("{}", pretty_table(&["Code", "Name", "Symbol"], data));
    }
    Ok(())
}
