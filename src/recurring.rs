// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDateTime, Utc};

use crate::error::{ExpenseError, Result};
use crate::models::{Expense, ExpenseFilter, RecurrenceType};
use crate::store::ExpenseStore;

/// Next occurrence after `from`, or `None` when the expense has no interval.
pub fn next_occurrence(
    interval: Option<RecurrenceType>,
    from: NaiveDateTime,
) -> Result<Option<NaiveDateTime>> {
    match interval {
        None => Ok(None),
        Some(kind) => kind.advance(from).map(Some).ok_or_else(|| {
            ExpenseError::invalid(format!("cannot schedule {} expense after {}", kind, from))
        }),
    }
}

/// The occurrence generated from a due recurring expense.
pub fn spawn_occurrence(template: &Expense, now: NaiveDateTime) -> Result<Expense> {
    let date = template.next_recurrence_date.unwrap_or(now);
    let stamp = Utc::now();
    Ok(Expense {
        id: 0,
        title: template.title.clone(),
        description: template.description.clone(),
        amount: template.amount,
        currency: template.currency.clone(),
        date,
        category_id: template.category_id,
        receipt_path: None,
        is_recurring: template.is_recurring,
        recurrence: template.recurrence,
        next_recurrence_date: next_occurrence(template.recurrence, date)?,
        created_at: stamp,
        updated_at: stamp,
    })
}

/// Materialize one occurrence of every recurring expense due at `now`.
///
/// Each due record yields a single new expense dated at its scheduled
/// occurrence, and its own `next_recurrence_date` is moved to the new
/// record's next date. Records overdue by several intervals still produce
/// one occurrence per run. Everything is written in one batch; on failure
/// nothing is written. Returns the number of records advanced.
///
/// Must not run concurrently with itself against the same store.
pub fn advance_recurring_expenses<S: ExpenseStore + ?Sized>(
    store: &S,
    now: NaiveDateTime,
) -> Result<usize> {
    let due = store.fetch_expenses(&ExpenseFilter::due_before(now))?;
    if due.is_empty() {
        tracing::debug!(%now, "no recurring expenses due");
        return Ok(0);
    }

    let mut created = Vec::with_capacity(due.len());
    let mut rescheduled = Vec::with_capacity(due.len());
    for mut original in due {
        let occurrence = spawn_occurrence(&original, now)?;
        tracing::debug!(
            id = original.id,
            date = %occurrence.date,
            next = ?occurrence.next_recurrence_date,
            "recurring expense due"
        );
        original.next_recurrence_date = occurrence.next_recurrence_date;
        created.push(occurrence);
        rescheduled.push(original);
    }

    store.persist(&created, &rescheduled)?;
    tracing::info!(count = created.len(), "advanced recurring expenses");
    Ok(created.len())
}
