//! "Group by dept: [{'name':'A','dept':'HR'}, ...]"

use super::parser::parse_literal;
use super::{HandlerOutcome, LiteralHandler};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

pub const GROUP_BY_HINT: &str = "Syntax tip → Group by dept: [{'name':'A','dept':'HR'}, …]";
pub const GROUP_BY_PARSE_ERROR: &str = "Couldn't parse the list — check the JSON syntax.";

lazy_static! {
    static ref GROUP_BY_REQUEST: Regex =
        Regex::new(r"(?i)group\s+by\s+(\w+)\s*:\s*(\[.*\])").unwrap();
    static ref GROUP_BY_TRIGGER: Regex = Regex::new(r"(?i)\bgroup\s+by\b").unwrap();
}

/// Records sharing one value at the grouping field.
/// `key` is `Value::Null` for records that lack the field.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup {
    pub key: Value,
    pub records: Vec<Value>,
}

/// Partition records by `field`. Groups appear in first-seen key order and
/// records keep their input order inside each group.
/// Returns `None` unless every element is an object.
pub fn group_records(records: Vec<Value>, field: &str) -> Option<Vec<RecordGroup>> {
    let mut groups: Vec<RecordGroup> = Vec::new();

    for record in records {
        let key = record.as_object()?.get(field).cloned().unwrap_or(Value::Null);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.records.push(record),
            None => groups.push(RecordGroup {
                key,
                records: vec![record],
            }),
        }
    }

    Some(groups)
}

/// Render as a JSON object keyed by group when every key is a string.
/// Any other key (number, bool, null, nested value) switches the whole result to
/// an array of `{"key": ..., "records": [...]}` entries so distinct keys never merge.
pub fn render_groups(groups: &[RecordGroup]) -> String {
    if groups.iter().all(|g| g.key.is_string()) {
        let mut object = Map::new();
        for group in groups {
            if let Value::String(key) = &group.key {
                object.insert(key.clone(), Value::Array(group.records.clone()));
            }
        }
        return Value::Object(object).to_string();
    }

    Value::Array(
        groups
            .iter()
            .map(|g| json!({ "key": g.key, "records": g.records }))
            .collect(),
    )
    .to_string()
}

pub struct GroupByHandler;

impl LiteralHandler for GroupByHandler {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn attempt(&self, query: &str) -> HandlerOutcome {
        let Some(caps) = GROUP_BY_REQUEST.captures(query) else {
            if GROUP_BY_TRIGGER.is_match(query) {
                return HandlerOutcome::Matched(GROUP_BY_HINT.to_string());
            }
            return HandlerOutcome::NoMatch;
        };

        let field = &caps[1];
        let records = match parse_literal(&caps[2]) {
            Ok(Value::Array(records)) => records,
            Ok(_) | Err(_) => return HandlerOutcome::Matched(GROUP_BY_PARSE_ERROR.to_string()),
        };

        match group_records(records, field) {
            Some(groups) => {
                debug!(field, groups = groups.len(), "Grouped literal records");
                HandlerOutcome::Matched(render_groups(&groups))
            }
            None => HandlerOutcome::Matched(GROUP_BY_PARSE_ERROR.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(query: &str) -> HandlerOutcome {
        GroupByHandler.attempt(query)
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let out = attempt(
            r#"Group by dept: [{"name":"A","dept":"HR"},{"name":"B","dept":"HR"},{"name":"C","dept":"IT"}]"#,
        );
        assert_eq!(
            out,
            HandlerOutcome::Matched(
                r#"{"HR":[{"name":"A","dept":"HR"},{"name":"B","dept":"HR"}],"IT":[{"name":"C","dept":"IT"}]}"#
                    .to_string()
            )
        );
    }

    #[test]
    fn test_python_style_literal() {
        let out = attempt("group BY team : [{'id': 1, 'team': 'x'}, {'id': 2, 'team': 'y'}, {'id': 3, 'team': 'x'}]");
        assert_eq!(
            out,
            HandlerOutcome::Matched(
                r#"{"x":[{"id":1,"team":"x"},{"id":3,"team":"x"}],"y":[{"id":2,"team":"y"}]}"#.to_string()
            )
        );
    }

    #[test]
    fn test_missing_field_groups_under_null() {
        let records = json!([{"n": 1, "k": "a"}, {"n": 2}, {"n": 3, "k": null}, {"n": 4, "k": "a"}]);
        let groups = group_records(records.as_array().unwrap().clone(), "k").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, json!("a"));
        assert_eq!(groups[0].records, vec![json!({"n": 1, "k": "a"}), json!({"n": 4, "k": "a"})]);
        assert_eq!(groups[1].key, Value::Null);
        assert_eq!(groups[1].records, vec![json!({"n": 2}), json!({"n": 3, "k": null})]);
        assert_eq!(
            render_groups(&groups),
            r#"[{"key":"a","records":[{"n":1,"k":"a"},{"n":4,"k":"a"}]},{"key":null,"records":[{"n":2},{"n":3,"k":null}]}]"#
        );
    }

    #[test]
    fn test_keys_that_print_alike_stay_separate() {
        let out = attempt("group by k: [{'k': 1}, {'k': '1'}, {'k': 'null'}, {'n': 0}]");
        let expected = r#"[{"key":1,"records":[{"k":1}]},{"key":"1","records":[{"k":"1"}]},{"key":"null","records":[{"k":"null"}]},{"key":null,"records":[{"n":0}]}]"#;
        assert_eq!(out, HandlerOutcome::Matched(expected.to_string()));

        let reparsed = parse_literal(expected).unwrap();
        let entries = reparsed.as_array().unwrap();
        assert_eq!(entries.len(), 4);
        let records: usize = entries.iter().map(|e| e["records"].as_array().unwrap().len()).sum();
        assert_eq!(records, 4);
    }

    #[test]
    fn test_deeply_nested_records_are_parse_error() {
        let query = format!("group by k: [{{'k': {}1{}}}]", "[".repeat(100_000), "]".repeat(100_000));
        assert_eq!(attempt(&query), HandlerOutcome::Matched(GROUP_BY_PARSE_ERROR.to_string()));
    }

    #[test]
    fn test_every_record_lands_in_one_group() {
        let records = json!([
            {"id": 0, "v": 1}, {"id": 1, "v": 2}, {"id": 2, "v": 1}, {"id": 3, "v": true},
            {"id": 4, "w": 0}, {"id": 5, "v": 2}, {"id": 6, "v": "1"}
        ]);
        let input = records.as_array().unwrap().clone();
        let groups = group_records(input.clone(), "v").unwrap();

        let total: usize = groups.iter().map(|g| g.records.len()).sum();
        assert_eq!(total, input.len());
        for g in &groups {
            for r in &g.records {
                assert_eq!(r.get("v").cloned().unwrap_or(Value::Null), g.key);
            }
        }
        for r in &input {
            let hits = groups.iter().filter(|g| g.records.contains(r)).count();
            assert_eq!(hits, 1);
        }
        assert_eq!(groups.len(), 5);
    }

    #[test]
    fn test_non_record_elements_rejected() {
        assert_eq!(
            attempt("group by dept: [{'dept': 'HR'}, 3]"),
            HandlerOutcome::Matched(GROUP_BY_PARSE_ERROR.to_string())
        );
        assert_eq!(
            attempt("group by dept: [{'dept': 'HR'}, oops]"),
            HandlerOutcome::Matched(GROUP_BY_PARSE_ERROR.to_string())
        );
    }

    #[test]
    fn test_partial_grammar_gives_hint() {
        assert_eq!(
            attempt("group by region please"),
            HandlerOutcome::Matched(GROUP_BY_HINT.to_string())
        );
    }

    #[test]
    fn test_no_keyword_is_no_match() {
        assert_eq!(attempt("show the revenue grouped nicely"), HandlerOutcome::NoMatch);
    }
}
