// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExpenseError;

pub const DEFAULT_CATEGORY_COLOR: &str = "#512BD4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub budget_limit: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// A fresh, active category with the default color and no budget.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            icon: None,
            budget_limit: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Cadence at which a recurring expense regenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Move `date` forward by one interval. Month and year steps keep the
    /// day of month where it exists and clamp to the last day otherwise
    /// (Jan 31 + 1 month = Feb 28/29). Returns `None` only past the end of
    /// the representable calendar.
    pub fn advance(&self, date: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Daily => date.checked_add_signed(Duration::days(1)),
            Self::Weekly => date.checked_add_signed(Duration::days(7)),
            Self::Monthly => date.checked_add_months(Months::new(1)),
            Self::Yearly => date.checked_add_months(Months::new(12)),
        }
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceType {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(ExpenseError::invalid(format!(
                "unknown recurrence '{}' (use daily|weekly|monthly|yearly)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Assigned by the store; ignored when the record is inserted.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDateTime,
    pub category_id: i64,
    pub receipt_path: Option<String>,
    pub is_recurring: bool,
    pub recurrence: Option<RecurrenceType>,
    pub next_recurrence_date: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        title: impl Into<String>,
        amount: Decimal,
        date: NaiveDateTime,
        category_id: i64,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            description: None,
            amount,
            currency: currency.into(),
            date,
            category_id,
            receipt_path: None,
            is_recurring: false,
            recurrence: None,
            next_recurrence_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Selection passed to `ExpenseStore::fetch_expenses`. Unset fields do not
/// restrict the result.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Inclusive, compared on the calendar day of `Expense::date`.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub category_id: Option<i64>,
    /// Recurring records whose next occurrence is on or before this instant.
    pub recurring_due_before: Option<NaiveDateTime>,
    /// Case-insensitive substring of title, description or category name.
    pub search: Option<String>,
}

impl ExpenseFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            date_range: Some((start, end)),
            ..Self::default()
        }
    }

    pub fn due_before(now: NaiveDateTime) -> Self {
        Self {
            recurring_due_before: Some(now),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category_name: String,
    pub category_color: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub percentage: Decimal,
}

/// Totals for one day, or for one month keyed by its first day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: NaiveDate,
    pub total_amount: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`.
    pub net_amount: Decimal,
    pub category_breakdown: Vec<CategorySummary>,
    pub daily_expenses: Vec<PeriodSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReport {
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_amount: Decimal,
    pub monthly_expenses: Vec<PeriodSummary>,
    pub category_breakdown: Vec<CategorySummary>,
}

/// All-time spending of a category against its budget limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub total_expenses: Decimal,
    pub remaining_budget: Decimal,
    pub utilization: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const SUPPORTED_CURRENCIES: &[Currency] = &[
    Currency { code: "USD", name: "US Dollar", symbol: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€" },
    Currency { code: "GBP", name: "British Pound", symbol: "£" },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    Currency { code: "CHF", name: "Swiss Franc", symbol: "CHF" },
    Currency { code: "CNY", name: "Chinese Yuan", symbol: "¥" },
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹" },
    Currency { code: "KRW", name: "South Korean Won", symbol: "₩" },
];

pub fn find_currency(code: &str) -> Option<&'static Currency> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Dates are stored as fixed-width text, so only 4-digit years are usable.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

pub fn check_year(year: i32) -> Result<(), ExpenseError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ExpenseError::invalid(format!(
            "year {} is outside {:04}..={}",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(())
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
