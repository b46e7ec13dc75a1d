//! The financial digest: income and expense totals, net savings, the most frequent expense
//! categories and the monthly expense trend, computed from a normalized `Table`.
//!
//! Every part of the digest degrades to zero or empty when the columns it needs are missing.

use crate::model::{Amount, KnownColumn, Record, Table, EXPENSE, INCOME};
use crate::normalize::parse_month_number;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{debug, warn};

/// How many expense categories the digest reports.
pub const TOP_CATEGORIES: usize = 3;

/// The number of expense rows seen for one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// The summed expenses of one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: String,
    pub amount: Amount,
}

/// The aggregate summary of a `Table`. Built once by `Digest::new` and never changed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    total_income: Amount,
    total_expense: Amount,
    net_savings: Amount,
    top_expense_categories: Vec<CategoryCount>,
    expense_by_month: Vec<MonthTotal>,
}

impl Digest {
    pub fn new(table: &Table) -> Self {
        let total_income = total_of(table, INCOME);
        let total_expense = total_of(table, EXPENSE);
        let digest = Self {
            total_income,
            total_expense,
            net_savings: net_savings(total_income, total_expense),
            top_expense_categories: top_expense_categories(table, TOP_CATEGORIES),
            expense_by_month: expense_by_month(table),
        };
        debug!(
            "Digest computed from {} records: income {}, expense {}",
            table.len(),
            digest.total_income,
            digest.total_expense
        );
        digest
    }

    pub fn total_income(&self) -> Amount {
        self.total_income
    }

    pub fn total_expense(&self) -> Amount {
        self.total_expense
    }

    pub fn net_savings(&self) -> Amount {
        self.net_savings
    }

    /// At most `TOP_CATEGORIES` entries, most frequent first.
    pub fn top_expense_categories(&self) -> &[CategoryCount] {
        &self.top_expense_categories
    }

    /// Expense totals per month, in calendar order.
    pub fn expense_by_month(&self) -> &[MonthTotal] {
        &self.expense_by_month
    }

    /// Renders the digest as the fixed text block that is given to the model as context.
    pub fn render(&self, currency_symbol: &str) -> String {
        let mut s = String::from("Here is the financial summary:\n");
        let _ = writeln!(
            s,
            "- Total Income: {}",
            self.total_income.money(currency_symbol)
        );
        let _ = writeln!(
            s,
            "- Total Expense: {}",
            self.total_expense.money(currency_symbol)
        );
        let _ = writeln!(
            s,
            "- Net Savings: {}",
            self.net_savings.money(currency_symbol)
        );
        let _ = writeln!(
            s,
            "- Top {TOP_CATEGORIES} Expense Categories: {}",
            mapping_literal(
                self.top_expense_categories
                    .iter()
                    .map(|c| (c.category.as_str(), c.count.to_string()))
            )
        );
        let _ = write!(
            s,
            "- Expense Trend across Months: {}",
            mapping_literal(
                self.expense_by_month
                    .iter()
                    .map(|m| (m.month.as_str(), m.amount.to_string()))
            )
        );
        s
    }
}

fn expenses(table: &Table) -> impl Iterator<Item = &Record> {
    table.records().iter().filter(|r| r.is(EXPENSE))
}

/// Sums `Amount` over the records whose `Type` is `kind`. Null amounts are skipped, as is any
/// amount that would overflow the total.
fn total_of(table: &Table, kind: &str) -> Amount {
    table
        .records()
        .iter()
        .filter(|r| r.is(kind))
        .filter_map(Record::amount)
        .fold(Amount::ZERO, |total, amount| add_or_skip(total, amount, kind))
}

fn add_or_skip(total: Amount, amount: Amount, what: &str) -> Amount {
    match total.checked_add(amount) {
        Some(sum) => sum,
        None => {
            warn!("Skipping {what} amount {amount}, adding it to {total} overflows");
            total
        }
    }
}

/// Income minus expense. A difference too large to represent saturates at the largest
/// representable amount of the same sign.
fn net_savings(income: Amount, expense: Amount) -> Amount {
    income.checked_sub(expense).unwrap_or_else(|| {
        warn!("Net savings of {income} - {expense} overflows, saturating");
        if income > expense {
            Amount::new(Decimal::MAX)
        } else {
            Amount::new(Decimal::MIN)
        }
    })
}

/// Counts expense records per category and keeps the `n` most frequent. Categories with equal
/// counts keep the order in which they first appeared.
fn top_expense_categories(table: &Table, n: usize) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for category in expenses(table).filter_map(Record::category) {
        match index.get(category) {
            Some(&ix) => counts[ix].count += 1,
            None => {
                index.insert(category, counts.len());
                counts.push(CategoryCount {
                    category: category.to_string(),
                    count: 1,
                });
            }
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// Sums expense amounts per month. Records without a month are left out, and a record with an
/// empty amount adds zero to its month.
fn expense_by_month(table: &Table) -> Vec<MonthTotal> {
    let mut totals: Vec<MonthTotal> = Vec::new();
    if !table.has(KnownColumn::Amount) {
        return totals;
    }
    for record in expenses(table) {
        let Some(month) = record.month() else {
            continue;
        };
        let amount = record.amount().unwrap_or(Amount::ZERO);
        match totals.iter_mut().find(|t| t.month == month) {
            Some(total) => total.amount = add_or_skip(total.amount, amount, month),
            None => totals.push(MonthTotal {
                month: month.to_string(),
                amount,
            }),
        }
    }
    // Calendar order; labels that are not month names go last, alphabetically
    totals.sort_by(|a, b| {
        let key = |m: &MonthTotal| (parse_month_number(&m.month).unwrap_or(13), m.month.clone());
        key(a).cmp(&key(b))
    });
    totals
}

/// Renders pairs as a mapping literal, e.g. `{"Food": 2, "Rent": 1}`.
fn mapping_literal<'a>(pairs: impl Iterator<Item = (&'a str, String)>) -> String {
    let body: Vec<String> = pairs.map(|(k, v)| format!("{k:?}: {v}")).collect();
    format!("{{{}}}", body.join(", "))
}
