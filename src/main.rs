// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use outlay::{cli, commands, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    logging::init(matches.get_flag("verbose"));

    let db_override = matches.get_one::<PathBuf>("db").cloned();
    let mut conn = db::open_or_init(db_override.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = match db_override {
                Some(p) => p,
                None => db::db_path()?,
            };
            println!("Database initialized at {}", path.display());
        }
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("backup", sub)) => commands::backup::backup(&conn, sub)?,
        Some(("restore", sub)) => commands::backup::restore(&mut conn, sub)?,
        Some(("currencies", sub)) => commands::config::currencies(sub)?,
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
