// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category summaries and monthly/yearly reports built from in-memory
//! expense snapshots.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{ExpenseError, Result};
use crate::models::{
    check_year, month_start, Category, CategorySummary, CategoryUsage, Expense, ExpenseFilter, MonthlyReport,
    PeriodSummary, YearlyReport,
};
use crate::store::ExpenseStore;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    check_year(year)?;
    if !(1..=12).contains(&month) {
        return Err(ExpenseError::invalid(format!(
            "month must be between 1 and 12 (got {})",
            month
        )));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ExpenseError::invalid(format!("year {} is out of range", year)))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| ExpenseError::invalid(format!("year {} is out of range", year)))?;
    Ok((start, end))
}

pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    check_year(year)?;
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(s), Some(e)) => Ok((s, e)),
        _ => Err(ExpenseError::invalid(format!("year {} is out of range", year))),
    }
}

fn overflow(what: &str) -> ExpenseError {
    ExpenseError::invalid(format!("{} is outside the decimal range", what))
}

fn add_amount(acc: Decimal, amount: Decimal) -> Result<Decimal> {
    acc.checked_add(amount)
        .ok_or_else(|| overflow("sum of expense amounts"))
}

fn total(expenses: &[Expense]) -> Result<Decimal> {
    expenses
        .iter()
        .try_fold(Decimal::ZERO, |acc, e| add_amount(acc, e.amount))
}

/// `part` as a percentage of `whole`; zero when `whole` is zero.
fn percentage(part: Decimal, whole: Decimal) -> Result<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or_else(|| overflow("percentage"))
}

/// Group `expenses` by category (name, color) and rank by total.
///
/// `resolve` maps a category id to its category; records it cannot resolve
/// are left out of the groups but still count toward the total the
/// percentages are taken from. Returns the summaries and the number of
/// skipped records.
pub fn summarize_by_category<F>(
    expenses: &[Expense],
    mut resolve: F,
) -> Result<(Vec<CategorySummary>, usize)>
where
    F: FnMut(i64) -> Option<Category>,
{
    let overall = total(expenses)?;
    let mut resolved: HashMap<i64, Option<Category>> = HashMap::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<CategorySummary> = Vec::new();
    let mut skipped = 0;

    for e in expenses {
        let category = resolved
            .entry(e.category_id)
            .or_insert_with(|| resolve(e.category_id));
        let Some(category) = category else {
            skipped += 1;
            continue;
        };
        let key = (category.name.clone(), category.color.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(CategorySummary {
                category_name: category.name.clone(),
                category_color: category.color.clone(),
                total_amount: Decimal::ZERO,
                transaction_count: 0,
                percentage: Decimal::ZERO,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total_amount = add_amount(group.total_amount, e.amount)?;
        group.transaction_count += 1;
    }

    for g in &mut groups {
        g.percentage = percentage(g.total_amount, overall)?;
    }
    // stable: equal totals keep first-seen order
    groups.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    Ok((groups, skipped))
}

fn category_breakdown<S: ExpenseStore + ?Sized>(
    store: &S,
    expenses: &[Expense],
) -> Result<Vec<CategorySummary>> {
    let mut failure = None;
    let summarized = summarize_by_category(expenses, |id| {
        match store.fetch_category(id) {
            Ok(c) => Some(c),
            Err(ExpenseError::NotFound { .. }) => None,
            Err(e) => {
                failure.get_or_insert(e);
                None
            }
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }
    let (summaries, skipped) = summarized?;
    if skipped > 0 {
        tracing::warn!(skipped, "expenses with unknown categories left out of breakdown");
    }
    Ok(summaries)
}

fn in_range<S: ExpenseStore + ?Sized>(
    store: &S,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Expense>> {
    if start > end {
        return Err(ExpenseError::invalid(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    store.fetch_expenses(&ExpenseFilter::between(start, end))
}

/// Per-category totals for expenses dated within `[start, end]`, largest
/// first.
pub fn build_category_summary<S: ExpenseStore + ?Sized>(
    store: &S,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CategorySummary>> {
    let expenses = in_range(store, start, end)?;
    category_breakdown(store, &expenses)
}

/// Group by a date key and emit one summary per key in ascending order.
fn summarize_by_period<K>(expenses: &[Expense], key: K) -> Result<Vec<PeriodSummary>>
where
    K: Fn(&Expense) -> NaiveDate,
{
    let mut periods: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for e in expenses {
        let slot = periods.entry(key(e)).or_insert((Decimal::ZERO, 0));
        slot.0 = add_amount(slot.0, e.amount)?;
        slot.1 += 1;
    }
    Ok(periods
        .into_iter()
        .map(|(period, (total_amount, transaction_count))| PeriodSummary {
            period,
            total_amount,
            transaction_count,
        })
        .collect())
}

fn net(income: Decimal, expenses: Decimal) -> Result<Decimal> {
    income
        .checked_sub(expenses)
        .ok_or_else(|| overflow("net amount"))
}

pub fn build_monthly_report<S: ExpenseStore + ?Sized>(
    store: &S,
    year: i32,
    month: u32,
) -> Result<MonthlyReport> {
    let (start, end) = month_bounds(year, month)?;
    let expenses = in_range(store, start, end)?;
    let category_breakdown = category_breakdown(store, &expenses)?;
    let daily_expenses = summarize_by_period(&expenses, Expense::day)?;
    let total_expenses = total(&expenses)?;
    Ok(MonthlyReport {
        year,
        month,
        total_income: Decimal::ZERO,
        total_expenses,
        net_amount: net(Decimal::ZERO, total_expenses)?,
        category_breakdown,
        daily_expenses,
    })
}

pub fn build_yearly_report<S: ExpenseStore + ?Sized>(store: &S, year: i32) -> Result<YearlyReport> {
    let (start, end) = year_bounds(year)?;
    let expenses = in_range(store, start, end)?;
    let category_breakdown = category_breakdown(store, &expenses)?;
    let monthly_expenses = summarize_by_period(&expenses, |e| month_start(e.day()))?;
    let total_expenses = total(&expenses)?;
    Ok(YearlyReport {
        year,
        total_income: Decimal::ZERO,
        total_expenses,
        net_amount: net(Decimal::ZERO, total_expenses)?,
        monthly_expenses,
        category_breakdown,
    })
}

/// Sum of every stored expense.
pub fn total_expenses<S: ExpenseStore + ?Sized>(store: &S) -> Result<Decimal> {
    let expenses = store.fetch_expenses(&ExpenseFilter::default())?;
    total(&expenses)
}

pub fn total_for_month<S: ExpenseStore + ?Sized>(store: &S, year: i32, month: u32) -> Result<Decimal> {
    let (start, end) = month_bounds(year, month)?;
    total(&in_range(store, start, end)?)
}

/// All-time spending per category against its budget limit, in the order
/// the categories are given.
pub fn category_usage<S: ExpenseStore + ?Sized>(
    store: &S,
    categories: Vec<Category>,
) -> Result<Vec<CategoryUsage>> {
    let expenses = store.fetch_expenses(&ExpenseFilter::default())?;
    let mut spent: HashMap<i64, Decimal> = HashMap::new();
    for e in &expenses {
        let slot = spent.entry(e.category_id).or_insert(Decimal::ZERO);
        *slot = add_amount(*slot, e.amount)?;
    }
    categories
        .into_iter()
        .map(|category| {
            let total_expenses = spent.get(&category.id).copied().unwrap_or(Decimal::ZERO);
            let remaining_budget = category
                .budget_limit
                .checked_sub(total_expenses)
                .ok_or_else(|| overflow("remaining budget"))?;
            let utilization = if category.budget_limit > Decimal::ZERO {
                percentage(total_expenses, category.budget_limit)?
            } else {
                Decimal::ZERO
            };
            Ok(CategoryUsage {
                category,
                total_expenses,
                remaining_budget,
                utilization,
            })
        })
        .collect()
}

/// `YYYY-MM` for month buckets, `YYYY-MM-DD` for day buckets.
pub fn period_label(period: NaiveDate, monthly: bool) -> String {
    if monthly {
        format!("{:04}-{:02}", period.year(), period.month())
    } else {
        period.to_string()
    }
}
