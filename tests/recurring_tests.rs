// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use outlay::db;
use outlay::models::{Expense, ExpenseFilter, RecurrenceType};
use outlay::recurring::{advance_recurring_expenses, next_occurrence};
use outlay::store::{ExpenseStore, SqliteStore};
use outlay::utils::parse_datetime;
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn at(s: &str) -> NaiveDateTime {
    parse_datetime(s).unwrap()
}

fn recurring(
    store: &SqliteStore<'_>,
    date: &str,
    kind: Option<RecurrenceType>,
    next: Option<&str>,
) -> Expense {
    let cat = store.category_by_name("Bills & Utilities").unwrap().unwrap();
    let mut e = Expense::new("Internet", "39.99".parse().unwrap(), at(date), cat.id, "EUR");
    e.description = Some("Fiber plan".into());
    e.is_recurring = true;
    e.recurrence = kind;
    e.next_recurrence_date = next.map(at);
    store.add_expense(&e).unwrap()
}

fn all(store: &SqliteStore<'_>) -> Vec<Expense> {
    store.fetch_expenses(&ExpenseFilter::default()).unwrap()
}

#[test]
fn interval_arithmetic() {
    let d = at("2024-01-31 09:15:00");
    assert_eq!(RecurrenceType::Daily.advance(d), Some(at("2024-02-01 09:15:00")));
    assert_eq!(RecurrenceType::Weekly.advance(d), Some(at("2024-02-07 09:15:00")));
    assert_eq!(RecurrenceType::Monthly.advance(d), Some(at("2024-02-29 09:15:00")));
    assert_eq!(
        RecurrenceType::Monthly.advance(at("2023-01-31")),
        Some(at("2023-02-28"))
    );
    assert_eq!(RecurrenceType::Yearly.advance(d), Some(at("2025-01-31 09:15:00")));
    assert_eq!(RecurrenceType::Yearly.advance(at("2024-02-29")), Some(at("2025-02-28")));
    assert_eq!(next_occurrence(None, d).unwrap(), None);
}

#[test]
fn recurrence_names_parse() {
    assert_eq!("Monthly".parse::<RecurrenceType>().unwrap(), RecurrenceType::Monthly);
    assert_eq!(" weekly ".parse::<RecurrenceType>().unwrap(), RecurrenceType::Weekly);
    assert!("fortnightly".parse::<RecurrenceType>().is_err());
    assert_eq!(RecurrenceType::Yearly.to_string(), "yearly");
}

#[test]
fn monthly_end_of_month_advances_to_leap_day() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let original = recurring(
        &store,
        "2023-12-31",
        Some(RecurrenceType::Monthly),
        Some("2024-01-31"),
    );

    let n = advance_recurring_expenses(&store, at("2024-02-01")).unwrap();
    assert_eq!(n, 1);

    let rows = all(&store);
    assert_eq!(rows.len(), 2);
    let spawned = rows.iter().find(|e| e.id != original.id).unwrap();
    assert_eq!(spawned.date, at("2024-01-31"));
    assert_eq!(spawned.next_recurrence_date, Some(at("2024-02-29")));
    assert_eq!(spawned.title, "Internet");
    assert_eq!(spawned.description.as_deref(), Some("Fiber plan"));
    assert_eq!(spawned.amount, original.amount);
    assert_eq!(spawned.currency, "EUR");
    assert_eq!(spawned.category_id, original.category_id);
    assert!(spawned.is_recurring);
    assert_eq!(spawned.recurrence, Some(RecurrenceType::Monthly));

    let updated = store.get_expense(original.id).unwrap();
    assert_eq!(updated.next_recurrence_date, Some(at("2024-02-29")));
    assert_eq!(updated.date, original.date);
}

#[test]
fn nothing_due_means_nothing_written() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    recurring(&store, "2024-01-01", Some(RecurrenceType::Weekly), Some("2024-01-08"));
    let mut plain = Expense::new("Once", "5".parse().unwrap(), at("2024-01-01"), 1, "USD");
    plain.next_recurrence_date = Some(at("2024-01-02"));
    store.add_expense(&plain).unwrap();

    assert_eq!(advance_recurring_expenses(&store, at("2024-01-07 23:59:59")).unwrap(), 0);
    assert_eq!(all(&store).len(), 2);
}

#[test]
fn due_instant_is_inclusive() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    recurring(&store, "2024-01-01", Some(RecurrenceType::Daily), Some("2024-01-02 08:00"));
    assert_eq!(advance_recurring_expenses(&store, at("2024-01-02 08:00")).unwrap(), 1);
}

#[test]
fn missing_interval_stops_the_schedule() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let original = recurring(&store, "2024-01-01", None, Some("2024-01-10"));

    assert_eq!(advance_recurring_expenses(&store, at("2024-01-15")).unwrap(), 1);
    let rows = all(&store);
    let spawned = rows.iter().find(|e| e.id != original.id).unwrap();
    assert_eq!(spawned.date, at("2024-01-10"));
    assert_eq!(spawned.next_recurrence_date, None);
    assert_eq!(store.get_expense(original.id).unwrap().next_recurrence_date, None);

    assert_eq!(advance_recurring_expenses(&store, at("2025-01-01")).unwrap(), 0);
    assert_eq!(all(&store).len(), 2);
}

#[test]
fn late_run_creates_one_occurrence_without_catch_up() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let original = recurring(
        &store,
        "2023-12-25",
        Some(RecurrenceType::Weekly),
        Some("2024-01-01"),
    );

    // five weekly occurrences are overdue; only the first is created
    assert_eq!(advance_recurring_expenses(&store, at("2024-02-01")).unwrap(), 1);
    assert_eq!(
        store.get_expense(original.id).unwrap().next_recurrence_date,
        Some(at("2024-01-08"))
    );
    let spawned: Vec<_> = all(&store).into_iter().filter(|e| e.id != original.id).collect();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].date, at("2024-01-01"));
}

#[test]
fn generated_copies_stay_recurring() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    recurring(&store, "2023-12-25", Some(RecurrenceType::Weekly), Some("2024-01-01"));

    assert_eq!(advance_recurring_expenses(&store, at("2024-02-01")).unwrap(), 1);
    // the original and its copy both point at 2024-01-08 now
    assert_eq!(advance_recurring_expenses(&store, at("2024-02-01")).unwrap(), 2);
    assert_eq!(all(&store).len(), 4);
}

#[test]
fn failed_batch_leaves_store_untouched() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let original = recurring(&store, "2024-01-01", Some(RecurrenceType::Daily), Some("2024-01-02"));

    let good = Expense::new("Ok", "1".parse().unwrap(), at("2024-01-03"), original.category_id, "USD");
    let mut ghost = original.clone();
    ghost.id = 4242;
    let err = store.persist(&[good], &[ghost]).unwrap_err();
    assert!(matches!(err, outlay::ExpenseError::NotFound { .. }));
    assert_eq!(all(&store).len(), 1);

    let bad = Expense::new("Free", "0".parse().unwrap(), at("2024-01-03"), original.category_id, "USD");
    let err = store.persist(&[bad], &[]).unwrap_err();
    assert!(matches!(err, outlay::ExpenseError::InvalidArgument(_)));

    let mut moved = original.clone();
    moved.next_recurrence_date = Some(at("2030-01-01"));
    let mut ghost = original.clone();
    ghost.id = 4243;
    assert!(store.persist(&[], &[moved, ghost]).is_err());
    assert_eq!(
        store.get_expense(original.id).unwrap().next_recurrence_date,
        Some(at("2024-01-02"))
    );
    assert_eq!(all(&store).len(), 1);
}
