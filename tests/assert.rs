use objpath::{Assertion, Error, FailDetail, ObjPathExt, Status};
use serde_json::{json, Value};
#[cfg(feature = "trace")]
use test_log::test;

fn sample_json() -> Value {
    json!({
        "a": {
            "b": {
                "c": 23345
            },
            "d": {
                "e": "234",
                "f": "1234"
            }
        }
    })
}

fn report(value: &Value, document: &str) -> String {
    objpath::assert(value, document).unwrap().to_string()
}

#[test]
fn simple_map() {
    let value = sample_json();
    assert_eq!(report(&value, r#"{"a.b.c": 23345}"#), "");
    assert_eq!(report(&value, r#"{"a.b.c": "23345"}"#), "");
}

#[test]
fn multiple_conditions() {
    let value = sample_json();
    let doc = r#"{"a.b.c": "23345", "a.d.f": {"$gt": "100", "$startsWith": "12"}}"#;
    assert_eq!(report(&value, doc), "");
}

#[test]
fn non_match() {
    let value = json!({"a": {"b": {"c": 23345}, "d": "1_2BB_3"}});
    let doc = r#"{"a.b.c": "23345", "a.d": {"$contains": "2BB_4"}}"#;
    assert_eq!(
        report(&value, doc),
        "expect match, got none\nexpect a.d.$contains to be \"2BB_4\", actual: \"1_2BB_3\""
    );
}

#[test]
fn leaf_mismatch() {
    let value = sample_json();
    assert_eq!(
        report(&value, r#"{"a.d.e": "2345"}"#),
        "expect match, got none\nexpect a.d.e to be \"2345\", actual: \"234\""
    );
}

#[test]
fn wildcards() {
    let value = sample_json();
    assert_eq!(
        report(&value, r#"{"a.b.*": "23345", "a.d.*": {"$contains": "234"}}"#),
        ""
    );
    assert_eq!(
        report(&value, r#"{"a.b.*": "23345", "a.d.*": {"$contains": "1x234"}}"#),
        [
            "expect match, got none",
            "expect a.d.*.$contains to be \"1x234\", actual: \"234\"",
            "expect a.d.*.$contains to be \"1x234\", actual: \"1234\"",
        ]
        .join("\n")
    );
}

#[test]
fn nested_documents() {
    let value = sample_json();
    assert_eq!(report(&value, r#"{"a": {"b": {"c": 23345}}}"#), "");
    assert_eq!(
        report(&value, r#"{"a": {"d": {"e": "2345"}}}"#),
        "expect match, got none\nexpect a.d.e to be \"2345\", actual: \"234\""
    );
    assert_eq!(report(&value, r#"{"a": {"d.*": {"$length": 4}}}"#), "");
}

#[test]
fn references() {
    let value = sample_json();
    assert_eq!(report(&value, r#"{"a.d.f": {"$gt": "$.a.d.e"}}"#), "");
    assert_eq!(report(&value, r#"{"a.b.c": {"$gt": "$.a.d.*"}}"#), "");
    let assertion = Assertion::parse(r#"{"a.b.c": {"$gt": "$.a.d.*"}}"#).unwrap();
    let out = assertion.filter(&value);
    assert_eq!(out.survivors.len(), 1);
    assert!(out.survivors[0].is_same_value(&objpath::wrap(&value).unwrap()));
    assert!(out.report.is_empty());
    assert_eq!(
        report(&value, r#"{"a.d.e": "$.a.d.f"}"#),
        "expect match, got none\nexpect a.d.e to be \"1234\", actual: \"234\""
    );
    // nothing to compare against
    assert_eq!(
        report(&value, r#"{"a.d.e": "$.a.zz"}"#),
        "expect match, got none\nno match at a.d.e"
    );
}

#[test]
fn flattened_keys() {
    let value = json!({"a": {"b": {"c.f": 445, "c.g": 446}}});
    assert_eq!(report(&value, r#"{"a.b.[c.f]": 445}"#), "");
    assert_eq!(report(&value, r#"{"a.b[c.*]": 446}"#), "");
    assert_eq!(
        report(&value, r#"{"a.b.c.f": 445}"#),
        "expect match, got none\nno match at a.b.c.f"
    );
}

#[test]
fn length_operator() {
    let value = sample_json();
    assert_eq!(report(&value, r#"{"a.d": {"$length": 2}}"#), "");
    assert_eq!(
        report(&value, r#"{"a.d": {"$length": "0"}}"#),
        "expect match, got none\nexpect a.d.$length to be \"0\", actual: \"2\""
    );
}

#[test]
fn comments_and_operators() {
    let value = json!({"name": "web-frontend", "replicas": 3, "ready": true});
    let doc = r##"{
        "# the name must look right": "",
        "name": {"$startsWith": "web", "$endsWith": "end", "$neq": "web"},
        "replicas": {"$ge": 3, "$le": "3", "$lt": 4},
        "ready": true
    }"##;
    assert_eq!(report(&value, doc), "");
    assert_eq!(
        report(&value, r#"{"replicas": {"$all": "3"}}"#),
        "expect match, got none\nexpect replicas.$all to be \"3\", actual: \"3\""
    );
}

#[test]
fn keys_are_trimmed() {
    let value = json!({"a": 1, "b": {"c": "x"}});
    assert_eq!(report(&value, r#"{"a ": 1, "  b\t": {" c ": "x"}}"#), "");
    assert_eq!(
        report(&value, r#"{" b. c ": "y"}"#),
        "expect match, got none\nno match at b. c"
    );
}

#[test]
fn bad_keys_are_reported() {
    let value = sample_json();
    assert_eq!(
        report(&value, r#"{"a..b": 1}"#),
        "expect match, got none\nbad syntax at a..b: at position 3, expected a field after '.'"
    );
    assert_eq!(
        report(&value, r#"{"a.d.e": "$.a["}"#),
        "expect match, got none\nbad syntax at a.d.e: invalid reference \"$.a[\": at position 2, found '[', but missing ']'"
    );
}

#[test]
fn empty_assertions() {
    let value = sample_json();
    for doc in ["", "  ", "null", "{}"] {
        let report = objpath::assert(&value, doc).unwrap();
        assert_eq!(report.status(), Status::NoAssert);
        assert_eq!(report.to_string(), "no assert");
    }
}

#[test]
fn invalid_documents() {
    let value = sample_json();
    let err = objpath::assert(&value, "[]").unwrap_err();
    assert_eq!(err.to_string(), "assertion document must be an object, got array");
    let err = objpath::assert(&value, r#"{"a": {"b": null}}"#).unwrap_err();
    assert_eq!(err.to_string(), "unsupported null value at a.b");
    assert!(matches!(
        objpath::assert(&value, "{not json"),
        Err(Error::Json(_))
    ));
}

#[test]
fn assertions_are_reusable() {
    let assertion = Assertion::parse(r#"{"a.d.*": {"$contains": "1x234"}}"#).unwrap();
    let value = sample_json();
    let first = value.check_assertion(&assertion);
    let second = value.check_assertion(&assertion);
    assert_eq!(first, second);
    assert_eq!(first.details()[0], FailDetail::Unmatched);
    assert_eq!(first.len(), 3);
    assert!(assertion.matches(&json!({"a": {"d": {"x": "1x2345"}}})));
}

#[test]
fn filter_keeps_the_root() {
    let assertion = Assertion::parse(r#"{"a.b.c": 23345}"#).unwrap();
    let value = sample_json();
    let out = assertion.filter(&value);
    assert_eq!(out.survivors.len(), 1);
    assert!(out.survivors[0].is_same_value(&objpath::wrap(&value).unwrap()));
    assert!(out.report.is_passed());
}

#[test]
fn serializable_report() {
    let value = sample_json();
    let report = objpath::assert(&value, r#"{"a.d.e": "2345", "a.q": 1}"#).unwrap();
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!([
            {"kind": "unmatched"},
            {"kind": "mismatch", "field": "a.d.e", "expected": "2345", "actual": "234"},
            {"kind": "no_match", "field": "a.q"}
        ])
    );
}
