//! Predicates over the browse report
//!
//! Use them with `assert_cmd`'s `.stdout(..)` / `.stderr(..)` or evaluate
//! them directly against captured output.

use predicates::prelude::*;
use predicates::str::contains;

/// Assert that output does NOT contain any of the given strings
///
/// # Example
///
/// ```rust
/// use fire_test_helpers::assertions::stderr_not_contains;
/// use predicates::prelude::*;
///
/// assert!(stderr_not_contains(&["ERROR", "WARN"]).eval("all good"));
/// ```
pub fn stderr_not_contains(values: &[&str]) -> impl Predicate<str> {
    let owned_values: Vec<String> = values.iter().map(|&s| s.to_string()).collect();
    predicate::function(move |s: &str| !owned_values.iter().any(|v| s.contains(v.as_str())))
}

/// Output lists the document `id` at 1-based position `index`
pub fn lists_document(index: usize, id: &str) -> impl Predicate<str> {
    contains(format!("[{}] Document ID: {}\n", index, id))
}

/// Output ends the listing with the aggregate count `total`
pub fn reports_collection_total(total: u64) -> impl Predicate<str> {
    contains(format!("Total documents in collection: {}\n", total))
}

/// Output carries no aggregate count line
pub fn no_collection_total() -> impl Predicate<str> {
    contains("Total documents in collection").not()
}

/// Output contains a full-width heavy rule
pub fn has_heavy_rule() -> impl Predicate<str> {
    contains("═".repeat(80))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_not_contains() {
        assert!(stderr_not_contains(&["ERROR", "WARN"]).eval("Some output without errors"));
        assert!(!stderr_not_contains(&["ERROR"]).eval("ERROR: something went wrong"));
    }

    #[test]
    fn test_lists_document() {
        let report = "\n[1] Document ID: abc123\n";
        assert!(lists_document(1, "abc123").eval(report));
        assert!(!lists_document(2, "abc123").eval(report));
    }

    #[test]
    fn test_collection_total() {
        let report = "Total: 3 documents shown\nTotal documents in collection: 12\n\n";
        assert!(reports_collection_total(12).eval(report));
        assert!(!no_collection_total().eval(report));
        assert!(no_collection_total().eval("Total: 3 documents shown\n"));
    }

    #[test]
    fn test_heavy_rule() {
        assert!(has_heavy_rule().eval(&format!("x\n{}\n", "═".repeat(80))));
        assert!(!has_heavy_rule().eval("═════"));
    }
}
