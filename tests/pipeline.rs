use rust_decimal::Decimal;
use smartspend::digest::Digest;
use smartspend::ingest::RawTable;
use smartspend::model::{Amount, Table};
use smartspend::normalize::{normalize, normalize_label};
use smartspend::prompt::compose;
use smartspend::stats::Statistics;

fn table(csv: &str) -> Table {
    normalize(&RawTable::from_reader(csv.as_bytes()).unwrap())
}

fn amount(value: i64) -> Amount {
    Amount::new(Decimal::new(value, 0))
}

fn top(digest: &Digest) -> Vec<(&str, usize)> {
    digest
        .top_expense_categories()
        .iter()
        .map(|c| (c.category.as_str(), c.count))
        .collect()
}

fn by_month(digest: &Digest) -> Vec<(&str, Amount)> {
    digest
        .expense_by_month()
        .iter()
        .map(|m| (m.month.as_str(), m.amount))
        .collect()
}

const SCENARIO: &str = "Type,Category,Amount,Date\n\
    income, food ,100,2023-01-05\n\
    Expense,food,40,2023-01-10\n\
    expense,Food,20,2023-02-01\n";

#[test]
fn scenario_three_rows() {
    let table = table(SCENARIO);
    for record in table.records() {
        assert_eq!(record.category(), Some("Food"));
    }
    let kinds: Vec<_> = table.records().iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![Some("Income"), Some("Expense"), Some("Expense")]);

    let digest = Digest::new(&table);
    assert_eq!(digest.total_income(), amount(100));
    assert_eq!(digest.total_expense(), amount(60));
    assert_eq!(digest.net_savings(), amount(40));
    assert_eq!(top(&digest), vec![("Food", 2)]);
    assert_eq!(
        by_month(&digest),
        vec![("January", amount(40)), ("February", amount(20))]
    );
}

#[test]
fn scenario_unparseable_date() {
    let csv = "Type,Category,Amount,Date\n\
        Expense,Rent,500,not-a-date\n\
        Expense,Food,40,2023-01-10\n";
    let table = table(csv);
    assert_eq!(table.records()[0].month(), None);

    let digest = Digest::new(&table);
    assert_eq!(digest.total_expense(), amount(540));
    assert_eq!(top(&digest), vec![("Rent", 1), ("Food", 1)]);
    assert_eq!(by_month(&digest), vec![("January", amount(40))]);
}

#[test]
fn scenario_empty_table() {
    let table = table("Date,Category,Type,Amount\n");
    assert!(table.is_empty());
    let digest = Digest::new(&table);
    assert_eq!(digest.total_income(), Amount::ZERO);
    assert_eq!(digest.total_expense(), Amount::ZERO);
    assert_eq!(digest.net_savings(), Amount::ZERO);
    assert!(digest.top_expense_categories().is_empty());
    assert!(digest.expense_by_month().is_empty());
    assert!(digest.render("₹").contains("Top 3 Expense Categories: {}"));
}

#[test]
fn no_amount_column() {
    let table = table("Date,Category,Type\n2023-01-05,Food,Expense\n2023-01-06,Pay,Income\n");
    let digest = Digest::new(&table);
    assert_eq!(digest.total_income(), Amount::ZERO);
    assert_eq!(digest.total_expense(), Amount::ZERO);
    assert_eq!(digest.net_savings(), Amount::ZERO);
    assert!(digest.expense_by_month().is_empty());
}

#[test]
fn no_income_rows() {
    let table = table("Type,Amount\nExpense,10\nexpense,15.5\n");
    let digest = Digest::new(&table);
    assert_eq!(digest.total_income(), Amount::ZERO);
    assert_eq!(
        Some(digest.net_savings()),
        Amount::ZERO.checked_sub(digest.total_expense())
    );
}

#[test]
fn net_savings_is_exact() {
    let table = table("Type,Amount\nIncome,0.1\nIncome,0.2\nExpense,0.3\n");
    let digest = Digest::new(&table);
    assert!(digest.net_savings().is_zero());
    assert_eq!(
        Some(digest.net_savings()),
        digest.total_income().checked_sub(digest.total_expense())
    );
}

#[test]
fn normalization_is_idempotent() {
    for label in [" food and drink ", "EXPENSE", "o'neil", "Income"] {
        let once = normalize_label(label).unwrap();
        assert_eq!(normalize_label(&once), Some(once.clone()));
    }
}

#[test]
fn top_categories_bounded_and_stable() {
    let csv = "Type,Category,Amount\n\
        Expense,Travel,1\n\
        Expense,Rent,1\n\
        Expense,Food,1\n\
        Expense,Fun,1\n\
        Expense,Food,1\n\
        Expense,Gifts,1\n";
    let digest = Digest::new(&table(csv));
    assert_eq!(top(&digest), vec![("Food", 2), ("Travel", 1), ("Rent", 1)]);
}

#[test]
fn prompt_contains_digest_and_question() {
    let digest = Digest::new(&table(SCENARIO));
    let prompt = compose(&digest, "Am I saving enough?", "₹");
    assert!(prompt.starts_with("Based on the following summary of financial data:\n\n"));
    assert!(prompt.contains("- Total Income: ₹100.00\n"));
    assert!(prompt.contains("- Top 3 Expense Categories: {\"Food\": 2}\n"));
    assert!(prompt.contains("- Expense Trend across Months: {\"January\": 40, \"February\": 20}"));
    assert!(prompt.ends_with("Answer the following question in simple terms:\nAm I saving enough?\n"));
    assert!(!prompt.contains("2023-01-05"));
}

#[test]
fn statistics_for_scenario() {
    let stats = Statistics::new(&table(SCENARIO));
    assert_eq!(stats.rows, 3);
    assert!(stats.correlation.is_empty());
    assert!(stats.render().contains("## Summary Statistics"));
}

#[test]
fn huge_amounts_do_not_panic() {
    let digest = Digest::new(&table(
        "Date,Type,Amount\n\
         2023-01-01,Income,50000000000000000000000000000\n\
         2023-01-02,Income,50000000000000000000000000000\n\
         2023-01-03,Expense,-50000000000000000000000000000\n\
         2023-01-04,Expense,-50000000000000000000000000000\n",
    ));
    let half: Amount = "50000000000000000000000000000".parse().unwrap();
    assert_eq!(digest.total_income(), half);
    assert_eq!(digest.net_savings(), Amount::new(Decimal::MAX));
    assert!(digest.render("₹").contains("- Net Savings: ₹79,228,162,514,264,337,593,543,950,335.00"));
}
