use super::types::TestResults;
use crate::runner::ScenarioResult;
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total = results.total.to_string();
    let failures = results.failures().to_string();
    let errors = if results.error.is_some() { "1" } else { "0" };

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "groups-e2e"));
    suites_start.push_attribute(("tests", total.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("errors", errors));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", "community-groups"));
    suite_start.push_attribute(("tests", total.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("errors", errors));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("hostname", results.base_url.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for result in &results.results {
        write_test_case(&mut writer, result)?;
    }

    if let Some(err) = &results.error {
        writer.write_event(Event::Start(BytesStart::new("system-err")))?;
        writer.write_event(Event::Text(BytesText::new(err)))?;
        writer.write_event(Event::End(BytesEnd::new("system-err")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    result: &ScenarioResult,
) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", result.name.as_str()));
    case_start.push_attribute(("classname", "community-groups"));

    if result.passed {
        writer.write_event(Event::Empty(case_start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(case_start))?;

    let message = if result.detail.is_empty() {
        "Assertion failed"
    } else {
        result.detail.as_str()
    };
    let mut fail_start = BytesStart::new("failure");
    fail_start.push_attribute(("message", message));
    fail_start.push_attribute(("type", "AssertionError"));
    writer.write_event(Event::Empty(fail_start))?;

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write `junit.xml` into the output directory
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
