// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

const INTERVALS: [&str; 4] = ["daily", "weekly", "monthly", "yearly"];

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn category_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("description").long("description"))
        .arg(Arg::new("color").long("color").help("Display color, #RRGGBB"))
        .arg(Arg::new("icon").long("icon"))
        .arg(Arg::new("budget").long("budget").help("Budget limit"))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(category_fields(
            Command::new("add")
                .about("Add a category")
                .arg(Arg::new("name").long("name").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("list").about("List categories").arg(
                Arg::new("active")
                    .long("active")
                    .action(ArgAction::SetTrue)
                    .help("Only active categories"),
            ),
        ))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show one category")
                .arg(Arg::new("name").required(true)),
        ))
        .subcommand(category_fields(
            Command::new("edit")
                .about("Edit a category")
                .arg(Arg::new("name").required(true))
                .arg(Arg::new("rename").long("rename")),
        ))
        .subcommand(
            Command::new("rm")
                .about("Remove a category without expenses")
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("toggle")
                .about("Activate or deactivate a category")
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(json_flags(
            Command::new("usage").about("All-time spending against budget limits"),
        ))
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Record and browse expenses")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record an expense")
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD [HH:MM[:SS]], defaults to now"),
                )
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("receipt").long("receipt").help("Path to a receipt image"))
                .arg(
                    Arg::new("repeat")
                        .long("repeat")
                        .value_parser(INTERVALS)
                        .help("Make the expense recurring"),
                )
                .arg(
                    Arg::new("next")
                        .long("next")
                        .requires("repeat")
                        .help("First recurrence, defaults to one interval after --date"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List expenses, newest first")
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
                .arg(
                    Arg::new("month")
                        .long("month")
                        .conflicts_with_all(["from", "to"])
                        .help("YYYY-MM"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(
            Command::new("search")
                .about("Search title, description and category")
                .arg(Arg::new("term").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("show").about("Show one expense").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit an expense")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("receipt").long("receipt"))
                .arg(Arg::new("repeat").long("repeat").value_parser(INTERVALS))
                .arg(Arg::new("next").long("next"))
                .arg(
                    Arg::new("no-repeat")
                        .long("no-repeat")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["repeat", "next"])
                        .help("Stop the expense from recurring"),
                ),
        )
        .subcommand(
            Command::new("rm").about("Delete an expense").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Spending reports")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("categories")
                .about("Spending by category over a date range")
                .arg(Arg::new("from").long("from").required(true).help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").required(true).help("YYYY-MM-DD")),
        ))
        .subcommand(json_flags(
            Command::new("monthly")
                .about("Monthly report with daily breakdown")
                .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
        ))
        .subcommand(json_flags(
            Command::new("yearly")
                .about("Yearly report with monthly breakdown")
                .arg(Arg::new("year").long("year").required(true).help("YYYY")),
        ))
        .subcommand(json_flags(
            Command::new("totals")
                .about("All-time total, or the total of one month")
                .arg(Arg::new("month").long("month").help("YYYY-MM")),
        ))
}

fn recurring_cmd() -> Command {
    Command::new("recurring")
        .about("Recurring expenses")
        .subcommand_required(true)
        .subcommand(
            Command::new("process")
                .about("Create the occurrences that are due")
                .arg(
                    Arg::new("now")
                        .long("now")
                        .help("Process as of this time instead of the current time"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list").about("List recurring expenses and their next occurrence"),
        ))
}

pub fn build_cli() -> Command {
    Command::new("outlay")
        .version(clap::crate_version!())
        .about("Categorized expense tracking with recurring expenses and reports")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("OUTLAY_DB")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(Command::new("init").about("Create the database and default categories"))
        .subcommand(category_cmd())
        .subcommand(expense_cmd())
        .subcommand(report_cmd())
        .subcommand(recurring_cmd())
        .subcommand(
            Command::new("export")
                .about("Export expenses")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("backup")
                .about("Copy the database to a file")
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("restore")
                .about("Replace the database with a backup")
                .arg(Arg::new("from").long("from").required(true)),
        )
        .subcommand(json_flags(
            Command::new("currencies").about("List supported currencies"),
        ))
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand_required(true)
                .subcommand(Command::new("get").about("Show settings"))
                .subcommand(
                    Command::new("set").about("Change settings").arg(
                        Arg::new("default-currency")
                            .long("default-currency")
                            .required(true),
                    ),
                ),
        )
}
