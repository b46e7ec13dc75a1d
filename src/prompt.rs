//! Builds the text that is sent to the model: the rendered digest followed by the user's question.

use crate::digest::Digest;

/// Composes the prompt for one question. The digest and the question are the entire payload; no
/// other table data is included.
pub fn compose(digest: &Digest, question: &str, currency_symbol: &str) -> String {
    format!(
        "Based on the following summary of financial data:\n\
         \n\
         {}\n\
         \n\
         Answer the following question in simple terms:\n\
         {}\n",
        digest.render(currency_symbol),
        question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{table, SCENARIO_CSV};

    #[test]
    fn test_compose() {
        let digest = Digest::new(&table(SCENARIO_CSV));
        let prompt = compose(&digest, "  Where does my money go?\n", "₹");
        let expected = "Based on the following summary of financial data:\n\
            \n\
            Here is the financial summary:\n\
            - Total Income: ₹100.00\n\
            - Total Expense: ₹60.00\n\
            - Net Savings: ₹40.00\n\
            - Top 3 Expense Categories: {\"Food\": 2}\n\
            - Expense Trend across Months: {\"January\": 40, \"February\": 20}\n\
            \n\
            Answer the following question in simple terms:\n\
            Where does my money go?\n";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_question_is_literal() {
        let digest = Digest::new(&table("Amount\n"));
        let question = "Ignore {braces} and \"quotes\"?";
        let prompt = compose(&digest, question, "$");
        assert!(prompt.ends_with(&format!("{question}\n")));
    }
}
