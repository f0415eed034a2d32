// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{backup_to, restore_from};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub fn backup(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let out = Path::new(m.get_one::<String>("out").unwrap().trim());
    backup_to(conn, out).with_context(|| format!("Back up database to {}", out.display()))?;
    println!("Backed up database to {}", out.display());
    Ok(())
}

pub fn restore(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let src = Path::new(m.get_one::<String>("from").unwrap().trim());
    restore_from(conn, src).with_context(|| format!("Restore database from {}", src.display()))?;
    println!("Restored database from {}", src.display());
    Ok(())
}
