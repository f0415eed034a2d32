// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use outlay::models::{Category, Expense};
use outlay::reports::{
    build_category_summary, build_monthly_report, build_yearly_report, category_usage,
    month_bounds, summarize_by_category, total_expenses, total_for_month,
};
use outlay::store::SqliteStore;
use outlay::utils::{parse_datetime, parse_month, parse_year};
use outlay::{db, ExpenseError};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde_json::json;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn cat_id(store: &SqliteStore<'_>, name: &str) -> i64 {
    store.category_by_name(name).unwrap().unwrap().id
}

fn expense(title: &str, amount: &str, date: &str, category_id: i64) -> Expense {
    Expense::new(
        title,
        amount.parse().unwrap(),
        parse_datetime(date).unwrap(),
        category_id,
        "USD",
    )
}

fn add(store: &SqliteStore<'_>, title: &str, amount: &str, date: &str, category: &str) {
    let id = cat_id(store, category);
    store.add_expense(&expense(title, amount, date, id)).unwrap();
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn category_summary_ranks_and_shares() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Groceries", "30", "2024-03-02", "Food & Dining");
    add(&store, "Bus pass", "25", "2024-03-05", "Transportation");
    add(&store, "Dinner", "20", "2024-03-09 19:30", "Food & Dining");
    add(&store, "Shoes", "25", "2024-03-11", "Shopping");

    let summary = build_category_summary(&store, ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].category_name, "Food & Dining");
    assert_eq!(summary[0].category_color, "#FF6B6B");
    assert_eq!(summary[0].total_amount, dec("50"));
    assert_eq!(summary[0].transaction_count, 2);
    assert_eq!(summary[0].percentage, dec("50"));
    assert_eq!(summary[1].total_amount, dec("25"));
    assert_eq!(summary[2].total_amount, dec("25"));

    let shares: Decimal = summary.iter().map(|s| s.percentage).sum();
    assert_eq!(shares, dec("100"));
    let totals: Decimal = summary.iter().map(|s| s.total_amount).sum();
    assert_eq!(totals, dec("100"));
}

#[test]
fn category_summary_range_is_inclusive_by_day() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Late", "10", "2024-03-31 23:59:59", "Other");
    add(&store, "Early", "5", "2024-03-01 00:00:00", "Other");
    add(&store, "Next month", "7", "2024-04-01 00:00:00", "Other");
    add(&store, "Prev month", "3", "2024-02-29 23:59:59", "Other");

    let summary = build_category_summary(&store, ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_amount, dec("15"));
    assert_eq!(summary[0].transaction_count, 2);
}

#[test]
fn category_summary_rejects_inverted_range() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let err = build_category_summary(&store, ymd(2024, 3, 2), ymd(2024, 3, 1)).unwrap_err();
    assert!(matches!(err, ExpenseError::InvalidArgument(_)));
}

#[test]
fn category_summary_of_nothing_is_empty() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let summary = build_category_summary(&store, ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap();
    assert!(summary.is_empty());
}

#[test]
fn equal_totals_keep_encounter_order() {
    let mut travel = Category::new("Travel");
    travel.id = 1;
    let mut books = Category::new("Books");
    books.id = 2;
    books.color = "#123456".into();
    let expenses = vec![
        expense("Train", "10", "2024-05-01", 1),
        expense("Novel", "10", "2024-05-02", 2),
        expense("Atlas", "15", "2024-05-03", 2),
        expense("Taxi", "15", "2024-05-04", 1),
    ];
    let (summary, skipped) = summarize_by_category(&expenses, |id| match id {
        1 => Some(travel.clone()),
        2 => Some(books.clone()),
        _ => None,
    })
    .unwrap();
    assert_eq!(skipped, 0);
    let names: Vec<_> = summary.iter().map(|s| s.category_name.as_str()).collect();
    assert_eq!(names, ["Travel", "Books"]);
    assert_eq!(summary[1].category_color, "#123456");
}

#[test]
fn unresolved_categories_are_skipped() {
    let mut food = Category::new("Food");
    food.id = 1;
    let expenses = vec![
        expense("Lunch", "30", "2024-05-01", 1),
        expense("Mystery", "10", "2024-05-01", 99),
    ];
    let (summary, skipped) = summarize_by_category(&expenses, |id| (id == 1).then(|| food.clone()))
        .unwrap();
    assert_eq!(skipped, 1);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_amount, dec("30"));
    // share is taken against every record in range
    assert_eq!(summary[0].percentage, dec("75"));
}

#[test]
fn store_level_orphans_do_not_break_reports() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Lunch", "30", "2024-05-01", "Food & Dining");
    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    conn.execute(
        "INSERT INTO expenses(title, amount, currency, date, category_id, is_recurring, created_at, updated_at)
         VALUES ('Orphan', '10', 'USD', '2024-05-02 00:00:00', ?1, 0, ?2, ?2)",
        params![999, chrono::Utc::now().to_rfc3339()],
    )
    .unwrap();

    let report = build_monthly_report(&store, 2024, 5).unwrap();
    assert_eq!(report.total_expenses, dec("40"));
    assert_eq!(report.category_breakdown.len(), 1);
    assert_eq!(report.category_breakdown[0].total_amount, dec("30"));
    assert_eq!(report.daily_expenses.len(), 2);
}

#[test]
fn zero_total_gives_zero_share() {
    let mut c = Category::new("Free");
    c.id = 1;
    let mut e = expense("Gift", "1", "2024-05-01", 1);
    e.amount = Decimal::ZERO;
    let (summary, _) = summarize_by_category(&[e], |_| Some(c.clone())).unwrap();
    assert_eq!(summary[0].percentage, Decimal::ZERO);
}

#[test]
fn month_bounds_follow_calendar() {
    assert_eq!(month_bounds(2024, 2).unwrap(), (ymd(2024, 2, 1), ymd(2024, 2, 29)));
    assert_eq!(month_bounds(2023, 2).unwrap(), (ymd(2023, 2, 1), ymd(2023, 2, 28)));
    assert_eq!(month_bounds(2024, 4).unwrap().1, ymd(2024, 4, 30));
    assert_eq!(month_bounds(2024, 12).unwrap().1, ymd(2024, 12, 31));
    assert!(matches!(
        month_bounds(2024, 13),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(matches!(
        month_bounds(2024, 0),
        Err(ExpenseError::InvalidArgument(_))
    ));
}

#[test]
fn monthly_report_includes_leap_day() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Leap lunch", "12.50", "2024-02-29 12:00", "Food & Dining");
    add(&store, "March", "5", "2024-03-01", "Food & Dining");
    add(&store, "Leap-less", "8", "2023-02-28 18:00", "Food & Dining");
    add(&store, "Spill", "9", "2023-03-01", "Food & Dining");

    let feb24 = build_monthly_report(&store, 2024, 2).unwrap();
    assert_eq!(feb24.total_expenses, dec("12.50"));
    assert_eq!(feb24.daily_expenses.len(), 1);
    assert_eq!(feb24.daily_expenses[0].period, ymd(2024, 2, 29));

    let feb23 = build_monthly_report(&store, 2023, 2).unwrap();
    assert_eq!(feb23.total_expenses, dec("8"));
    assert_eq!(feb23.daily_expenses[0].period, ymd(2023, 2, 28));
}

#[test]
fn monthly_report_totals_match_breakdowns() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Coffee", "4.50", "2024-06-10 08:00", "Food & Dining");
    add(&store, "Sandwich", "7.25", "2024-06-10 13:00", "Food & Dining");
    add(&store, "Fuel", "40", "2024-06-03", "Transportation");
    add(&store, "Cinema", "12", "2024-06-21", "Entertainment");

    let report = build_monthly_report(&store, 2024, 6).unwrap();
    assert_eq!(report.year, 2024);
    assert_eq!(report.month, 6);
    assert_eq!(report.total_income, Decimal::ZERO);
    assert_eq!(report.total_expenses, dec("63.75"));
    assert_eq!(report.net_amount, dec("-63.75"));

    let by_cat: Decimal = report.category_breakdown.iter().map(|c| c.total_amount).sum();
    assert_eq!(by_cat, report.total_expenses);
    assert_eq!(report.category_breakdown[0].category_name, "Transportation");

    let days: Vec<_> = report.daily_expenses.iter().map(|d| d.period).collect();
    assert_eq!(days, [ymd(2024, 6, 3), ymd(2024, 6, 10), ymd(2024, 6, 21)]);
    assert_eq!(report.daily_expenses[1].total_amount, dec("11.75"));
    assert_eq!(report.daily_expenses[1].transaction_count, 2);
}

#[test]
fn empty_month_and_year_are_zero_reports() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let m = build_monthly_report(&store, 2030, 1).unwrap();
    assert_eq!(m.total_expenses, Decimal::ZERO);
    assert_eq!(m.net_amount, Decimal::ZERO);
    assert!(m.category_breakdown.is_empty());
    assert!(m.daily_expenses.is_empty());

    let y = build_yearly_report(&store, 2030).unwrap();
    assert_eq!(y.total_expenses, Decimal::ZERO);
    assert!(y.monthly_expenses.is_empty());
    assert!(y.category_breakdown.is_empty());
}

#[test]
fn yearly_report_groups_populated_months() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Rent share", "100", "2024-01-15", "Bills & Utilities");
    add(&store, "Power", "60", "2024-01-31 22:00", "Bills & Utilities");
    add(&store, "Flight", "300", "2024-07-04", "Travel");
    add(&store, "Gift", "20", "2024-12-31 23:59:59", "Shopping");
    add(&store, "Old", "999", "2023-12-31", "Shopping");
    add(&store, "New", "999", "2025-01-01", "Shopping");

    let report = build_yearly_report(&store, 2024).unwrap();
    assert_eq!(report.total_expenses, dec("480"));
    assert_eq!(report.net_amount, dec("-480"));
    assert!(report.monthly_expenses.len() <= 12);

    let months: Vec<_> = report
        .monthly_expenses
        .iter()
        .map(|p| (p.period, p.total_amount, p.transaction_count))
        .collect();
    assert_eq!(
        months,
        [
            (ymd(2024, 1, 1), dec("160"), 2),
            (ymd(2024, 7, 1), dec("300"), 1),
            (ymd(2024, 12, 1), dec("20"), 1),
        ]
    );
    assert_eq!(report.category_breakdown[0].category_name, "Travel");
    let by_cat: Decimal = report.category_breakdown.iter().map(|c| c.total_amount).sum();
    assert_eq!(by_cat, report.total_expenses);
}

#[test]
fn totals_and_budget_usage() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Course", "100", "2024-02-10", "Education");
    add(&store, "Book", "50", "2024-03-10", "Education");

    assert_eq!(total_expenses(&store).unwrap(), dec("150"));
    assert_eq!(total_for_month(&store, 2024, 3).unwrap(), dec("50"));
    assert_eq!(total_for_month(&store, 2024, 4).unwrap(), Decimal::ZERO);

    let usage = category_usage(&store, store.list_categories(false).unwrap()).unwrap();
    let edu = usage
        .iter()
        .find(|u| u.category.name == "Education")
        .unwrap();
    // seeded limit is 150
    assert_eq!(edu.total_expenses, dec("150"));
    assert_eq!(edu.remaining_budget, Decimal::ZERO);
    assert_eq!(edu.utilization, dec("100"));
    let other = usage.iter().find(|u| u.category.name == "Other").unwrap();
    assert_eq!(other.utilization, Decimal::ZERO);
}

#[test]
fn thirds_sum_to_a_hundred_within_rounding() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Pizza", "10", "2024-08-01", "Food & Dining");
    add(&store, "Taxi", "10", "2024-08-02", "Transportation");
    add(&store, "Film", "10", "2024-08-03", "Entertainment");

    let summary = build_category_summary(&store, ymd(2024, 8, 1), ymd(2024, 8, 31)).unwrap();
    assert_eq!(summary.len(), 3);
    for s in &summary {
        assert_eq!(s.percentage.round_dp(2), dec("33.33"));
    }
    let shares: Decimal = summary.iter().map(|s| s.percentage).sum();
    assert!((shares - dec("100")).abs() < dec("0.000001"), "shares sum to {}", shares);
}

#[test]
fn tiny_budget_limit_is_an_error_not_a_panic() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let mut dust = Category::new("Dust");
    dust.budget_limit = dec("0.0000000000000000000000000001");
    let dust = store.add_category(&dust).unwrap();
    store
        .add_expense(&expense("Crumb", "1", "2024-05-01", dust.id))
        .unwrap();

    let err = category_usage(&store, store.list_categories(false).unwrap()).unwrap_err();
    assert!(matches!(err, ExpenseError::InvalidArgument(_)));
}

#[test]
fn overflowing_sums_are_errors_not_panics() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let other = cat_id(&store, "Other");
    for day in ["2024-01-10", "2024-01-11"] {
        let mut e = expense("Huge", "1", day, other);
        e.amount = Decimal::MAX;
        store.add_expense(&e).unwrap();
    }

    assert!(matches!(
        build_monthly_report(&store, 2024, 1),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(matches!(
        build_yearly_report(&store, 2024),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(matches!(
        total_expenses(&store),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(matches!(
        category_usage(&store, store.list_categories(false).unwrap()),
        Err(ExpenseError::InvalidArgument(_))
    ));
}

#[test]
fn report_json_carries_net_amount() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    add(&store, "Rent", "900", "2024-09-01", "Bills & Utilities");

    let monthly = serde_json::to_value(build_monthly_report(&store, 2024, 9).unwrap()).unwrap();
    assert_eq!(monthly["net_amount"], json!("-900"));
    let yearly = serde_json::to_value(build_yearly_report(&store, 2024).unwrap()).unwrap();
    assert_eq!(yearly["net_amount"], json!("-900"));
}

#[test]
fn years_beyond_four_digits_are_rejected() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    assert!(matches!(
        build_yearly_report(&store, 10000),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(matches!(
        build_monthly_report(&store, 10000, 1),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(matches!(
        build_yearly_report(&store, -1),
        Err(ExpenseError::InvalidArgument(_))
    ));
    assert!(parse_year("10000").is_err());
    assert!(parse_month("10000-01").is_err());
    assert!(parse_datetime("10000-01-01 00:00:00").is_err());
    assert_eq!(parse_year("9999").unwrap(), 9999);

    let mut far = expense("Far", "1", "2024-01-01", cat_id(&store, "Other"));
    far.date = NaiveDate::from_ymd_opt(10000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert!(matches!(
        store.add_expense(&far),
        Err(ExpenseError::InvalidArgument(_))
    ));
}
