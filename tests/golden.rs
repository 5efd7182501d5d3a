use std::fs;

use objpath::Assertion;
use serde::Deserialize;
use serde_json::Value;
#[cfg(feature = "trace")]
use test_log::test;

#[derive(Deserialize)]
struct TestSuite {
    tests: Vec<TestCase>,
}

#[derive(Deserialize)]
struct TestCase {
    name: String,
    value: Value,
    document: Assertion,
    #[serde(default)]
    report: Vec<String>,
}

#[test]
fn assertion_reports() {
    let suite_json_str =
        fs::read_to_string("tests/fixtures/assertions.json").expect("read assertions.json file");

    let suite: TestSuite =
        serde_json::from_str(suite_json_str.as_str()).expect("parse assertions.json");

    for TestCase {
        name,
        value,
        document,
        report,
    } in suite.tests
    {
        let first = document.check(&value);
        let second = document.check(&value);
        assert_eq!(first, second, "{name}: checking twice differs");
        let actual: Vec<String> = first.iter().map(ToString::to_string).collect();
        assert_eq!(
            actual, report,
            "{name}: incorrect report, expected {report:#?}, got {actual:#?}"
        );
    }
}
