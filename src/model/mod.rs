//! Types that represent the core data model, such as `Record`, `Table` and `Amount`.
mod amount;
mod mapping;
mod table;

pub use amount::{Amount, AmountError, Money, DEFAULT_CURRENCY_SYMBOL};
pub use mapping::{Header, KnownColumn, Mapping, MappingError};
pub use table::{Record, Table};

/// The normalized `Type` of an income row.
pub const INCOME: &str = "Income";

/// The normalized `Type` of an expense row.
pub const EXPENSE: &str = "Expense";
