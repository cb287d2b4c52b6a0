//! "Sort the list [3,1,2] in ascending order"

use super::parser::parse_literal;
use super::{HandlerOutcome, LiteralHandler};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use tracing::debug;

pub const SORT_HINT: &str = "Syntax tip → Sort the list [1,3,2] in ascending order.";
pub const SORT_PARSE_ERROR: &str = "Couldn't parse the list; please use JSON-style numbers.";

lazy_static! {
    static ref SORT_REQUEST: Regex =
        Regex::new(r"(?i)sort.*\[(.*)\]\s+in\s+(ascending|descending)").unwrap();
    static ref SORT_TRIGGER: Regex = Regex::new(r"(?i)\b(sort|order)\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

fn exact_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn compare_integer_float(i: i128, f: f64) -> Ordering {
    match (i as f64).partial_cmp(&f) {
        // f is integral and within i128 range here
        Some(Ordering::Equal) => i.cmp(&(f as i128)),
        Some(ord) => ord,
        None => Ordering::Equal,
    }
}

/// Exact total order over JSON numbers; integers never go through a lossy `f64`.
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    let as_float = |n: &Number| n.as_f64().unwrap_or_default();
    match (exact_integer(a), exact_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_integer_float(x, as_float(b)),
        (None, Some(y)) => compare_integer_float(y, as_float(a)).reverse(),
        (None, None) => as_float(a)
            .partial_cmp(&as_float(b))
            .unwrap_or(Ordering::Equal),
    }
}

/// Stable numeric sort; equal values keep their input order in both directions.
/// Returns `None` when any element is not a number.
pub fn sort_numbers(items: Vec<Value>, direction: Direction) -> Option<Vec<Value>> {
    if !items.iter().all(Value::is_number) {
        return None;
    }
    let mut sorted = items;

    sorted.sort_by(|a, b| {
        let ord = match (a, b) {
            (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
            _ => Ordering::Equal,
        };
        match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });

    Some(sorted)
}

pub struct SortHandler;

impl LiteralHandler for SortHandler {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn attempt(&self, query: &str) -> HandlerOutcome {
        let Some(caps) = SORT_REQUEST.captures(query) else {
            if SORT_TRIGGER.is_match(query) {
                return HandlerOutcome::Matched(SORT_HINT.to_string());
            }
            return HandlerOutcome::NoMatch;
        };

        let direction = if caps[2].eq_ignore_ascii_case("descending") {
            Direction::Descending
        } else {
            Direction::Ascending
        };

        let items = match parse_literal(&format!("[{}]", &caps[1])) {
            Ok(Value::Array(items)) => items,
            Ok(_) | Err(_) => return HandlerOutcome::Matched(SORT_PARSE_ERROR.to_string()),
        };

        match sort_numbers(items, direction) {
            Some(sorted) => {
                debug!(count = sorted.len(), ?direction, "Sorted literal list");
                HandlerOutcome::Matched(Value::Array(sorted).to_string())
            }
            None => HandlerOutcome::Matched(SORT_PARSE_ERROR.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attempt(query: &str) -> HandlerOutcome {
        SortHandler.attempt(query)
    }

    #[test]
    fn test_ascending_and_descending() {
        assert_eq!(
            attempt("Sort the list [3,1,2] in ascending order"),
            HandlerOutcome::Matched("[1,2,3]".to_string())
        );
        assert_eq!(
            attempt("sort the list [3, 1, 2] in DESCENDING order"),
            HandlerOutcome::Matched("[3,2,1]".to_string())
        );
    }

    #[test]
    fn test_mixed_numbers_keep_their_spelling() {
        assert_eq!(
            attempt("Please sort [2.5, -1, 10, 0] in ascending order"),
            HandlerOutcome::Matched("[-1,0,2.5,10]".to_string())
        );
    }

    #[test]
    fn test_large_integers_sort_exactly() {
        assert_eq!(
            attempt("sort [9007199254740993, 9007199254740992] in ascending order"),
            HandlerOutcome::Matched("[9007199254740992,9007199254740993]".to_string())
        );
        assert_eq!(
            attempt("sort [10000000000000000000, 1, -3] in ascending order"),
            HandlerOutcome::Matched("[-3,1,10000000000000000000]".to_string())
        );
        assert_eq!(
            attempt("sort [18446744073709551614, 18446744073709551615, 0.5] in descending order"),
            HandlerOutcome::Matched("[18446744073709551615,18446744073709551614,0.5]".to_string())
        );
    }

    #[test]
    fn test_integers_and_floats_interleave_exactly() {
        let items = json!([9007199254740993u64, 9007199254740992.0, 9007199254740992u64, -0.5, -1])
            .as_array()
            .unwrap()
            .clone();
        let sorted = sort_numbers(items, Direction::Ascending).unwrap();
        assert_eq!(
            sorted,
            vec![json!(-1), json!(-0.5), json!(9007199254740992.0), json!(9007199254740992u64), json!(9007199254740993u64)]
        );
    }

    #[test]
    fn test_deeply_nested_list_is_parse_error() {
        let query = format!("sort [{}1{}] in ascending order", "[".repeat(100_000), "]".repeat(100_000));
        assert_eq!(attempt(&query), HandlerOutcome::Matched(SORT_PARSE_ERROR.to_string()));
    }

    #[test]
    fn test_stable_for_equal_values() {
        let sorted = sort_numbers(json!([2, 1.0, 1, 2.0]).as_array().unwrap().clone(), Direction::Ascending).unwrap();
        assert_eq!(sorted, vec![json!(1.0), json!(1), json!(2), json!(2.0)]);

        let sorted = sort_numbers(json!([1, 2, 1.0, 2.0]).as_array().unwrap().clone(), Direction::Descending).unwrap();
        assert_eq!(sorted, vec![json!(2), json!(2.0), json!(1), json!(1.0)]);
    }

    #[test]
    fn test_output_is_permutation() {
        let input = json!([5, 3, 5, -2, 0, 3]).as_array().unwrap().clone();
        let mut sorted = sort_numbers(input.clone(), Direction::Ascending).unwrap();
        assert_eq!(sorted.len(), input.len());
        for w in sorted.windows(2) {
            assert!(w[0].as_f64().unwrap() <= w[1].as_f64().unwrap());
        }
        sorted.reverse();
        assert_eq!(sort_numbers(input, Direction::Descending).unwrap(), sorted);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(
            attempt("sort [] in ascending order"),
            HandlerOutcome::Matched("[]".to_string())
        );
    }

    #[test]
    fn test_non_numeric_is_friendly_error() {
        assert_eq!(
            attempt("sort the list [a, b] in ascending order"),
            HandlerOutcome::Matched(SORT_PARSE_ERROR.to_string())
        );
        assert_eq!(
            attempt("sort the list ['b', 'a'] in ascending order"),
            HandlerOutcome::Matched(SORT_PARSE_ERROR.to_string())
        );
    }

    #[test]
    fn test_partial_grammar_gives_hint() {
        assert_eq!(attempt("sort my sales figures"), HandlerOutcome::Matched(SORT_HINT.to_string()));
        assert_eq!(attempt("Order these for me"), HandlerOutcome::Matched(SORT_HINT.to_string()));
    }

    #[test]
    fn test_no_keyword_is_no_match() {
        assert_eq!(attempt("What is the population of France?"), HandlerOutcome::NoMatch);
        assert_eq!(attempt("reorder nothing"), HandlerOutcome::NoMatch);
    }
}
