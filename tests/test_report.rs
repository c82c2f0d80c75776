//! Integration tests for report generation.
//!
//! Tests cover:
//! - Writing text and HTML reports for an analysed image
//! - Reading the text report back
//! - Refusing to report without an image or without detections
//! - Reusing the shared current report as the next template
//! - Using a fixed template file
//! - Falling back to the built-in template when the current report lost its markers
//! - Rejecting a fixed template without patient fields

mod common;

use std::fs;

use spermai::report::parse_text;
use spermai::TemplateSource;
use time::macros::datetime;

use common::*;

#[test]
fn test_report_round_trip() -> anyhow::Result<()> {
    // 1. Analyse an image with a 70/20/10 split
    let (config, dir) = create_test_config();
    let image = create_test_image(dir.path());
    let mut session = Session::new(StubDetector { detections: make_detections(70, 20, 10) }, &config);
    session.load_image(image)?;

    // 2. Generate a report
    let patient = make_patient("Teshaboyev Teshavoy Teshavoyevich");
    let ts = datetime!(2026-10-17 10:30:00 UTC);
    let report = session.generate_report(&patient, ts)?;

    // 3. File names follow the timestamp
    assert_eq!(report.text_path, config.output.reports_dir.join("report_20261017_103000.txt"));
    assert_eq!(report.html_path, config.output.reports_dir.join("report_20261017_103000.html"));

    // 4. The text report reads back verbatim
    let parsed = parse_text(&fs::read_to_string(&report.text_path)?).expect("text report parses");
    assert_eq!(parsed.patient, patient);
    assert_eq!(parsed.percentages.live, 70);
    assert_eq!(parsed.percentages.dead, 20);
    assert_eq!(parsed.percentages.immature, 10);
    assert_eq!(parsed.date, "17.10.2026 10:30");

    // 5. HTML carries counts and totals, and the current file mirrors it
    let html = fs::read_to_string(&report.html_path)?;
    assert!(html.contains(r#"<td data-field="live_count">70</td>"#));
    assert!(html.contains(r#"<th data-field="total_count">100</th>"#));
    assert_eq!(fs::read_to_string(&config.output.current_report)?, html);

    Ok(())
}

#[test]
fn test_report_without_image_writes_nothing() -> anyhow::Result<()> {
    let (config, _dir) = create_test_config();
    let mut session = Session::new(StubDetector { detections: make_detections(1, 1, 1) }, &config);

    let result = session.handle(Event::GenerateReport(make_patient("Nobody")));

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationWarning::NoImageLoaded))
    ));
    assert_eq!(count_files(&config.output.reports_dir), 0);
    assert!(!config.output.current_report.exists());

    Ok(())
}

#[test]
fn test_report_without_detections_writes_nothing() -> anyhow::Result<()> {
    let (config, dir) = create_test_config();
    let image = create_test_image(dir.path());
    let mut session = Session::new(StubDetector { detections: vec![] }, &config);

    let aggregation = session.load_image(image)?;
    assert_eq!(aggregation, Aggregation::NoDetections);
    assert_eq!(session.status(), "No sperm cells found");

    let result = session.generate_report(&make_patient("Empty"), datetime!(2026-10-17 10:30:00 UTC));
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationWarning::NoAnalysisResult))
    ));
    assert_eq!(count_files(&config.output.reports_dir), 0);

    Ok(())
}

#[test]
fn test_current_report_is_reused_as_template() -> anyhow::Result<()> {
    let (config, dir) = create_test_config();
    let image = create_test_image(dir.path());

    // 1. First report
    let mut session = Session::new(StubDetector { detections: make_detections(70, 20, 10) }, &config);
    session.load_image(image.clone())?;
    let first = session.generate_report(&make_patient("First Patient"), datetime!(2026-10-17 10:00:00 UTC))?;

    // 2. Second report through a new session, so only the current file links them
    let mut session = Session::new(StubDetector { detections: make_detections(1, 2, 1) }, &config);
    session.load_image(image)?;
    let second = session.generate_report(&make_patient("Second Patient"), datetime!(2026-10-17 11:00:00 UTC))?;

    // 3. The second document holds only the second values
    let html = fs::read_to_string(&second.html_path)?;
    assert!(html.contains("Second Patient"));
    assert!(!html.contains("First Patient"));
    assert!(html.contains(r#"<td data-field="dead_percent">50%</td>"#));
    assert!(html.contains(r#"<th data-field="total_count">4</th>"#));
    assert!(html.contains(r#"<span data-field="report_time">11:00</span>"#));

    // 4. The first report is left alone
    assert!(fs::read_to_string(&first.html_path)?.contains("First Patient"));
    assert_eq!(count_files(&config.output.reports_dir), 4);

    Ok(())
}

#[test]
fn test_fixed_template_is_not_modified() -> anyhow::Result<()> {
    let (mut config, dir) = create_test_config();
    let template_path = dir.path().join("template.html");
    let template = concat!(
        r#"<html><b data-field="patient_name">NAME</b> <i data-field="live_percent">0%</i>"#,
        r#"<p data-field="birth_date"></p><p data-field="patient_id"></p>"#,
        r#"<p data-field="conclusion"></p><p data-field="doctor"></p></html>"#,
    );
    fs::write(&template_path, template)?;
    config.output.template = Some(template_path.clone());

    let image = create_test_image(dir.path());
    let mut session = Session::new(StubDetector { detections: make_detections(3, 1, 0) }, &config);
    session.load_image(image)?;
    let report = session.generate_report(&make_patient("Fixed <Template>"), datetime!(2026-10-17 12:00:00 UTC))?;

    let html = fs::read_to_string(&report.html_path)?;
    assert_eq!(
        html,
        concat!(
            r#"<html><b data-field="patient_name">Fixed &lt;Template&gt;</b> <i data-field="live_percent">75%</i>"#,
            r#"<p data-field="birth_date">15.06.1988</p><p data-field="patient_id">SP-2026/042</p>"#,
            "<p data-field=\"conclusion\">Asthenozoospermia.\nRecommend repeat analysis.</p>",
            r#"<p data-field="doctor">Dr. Rashidova</p></html>"#,
        )
    );
    assert_eq!(fs::read_to_string(&template_path)?, template);
    assert_eq!(fs::read_to_string(&config.output.current_report)?, html);

    Ok(())
}

#[test]
fn test_explicit_template_source_on_writer() -> anyhow::Result<()> {
    let (config, dir) = create_test_config();
    let missing = dir.path().join("no-such-template.html");
    let writer = spermai::ReportWriter::from_config(&config.output)
        .with_template(TemplateSource::Fixed(missing.clone()));

    let image = create_test_image(dir.path());
    let mut session = Session::new(StubDetector { detections: make_detections(1, 0, 0) }, &config)
        .with_report_writer(writer);
    session.load_image(image)?;

    let result = session.generate_report(&make_patient("X"), datetime!(2026-10-17 12:00:00 UTC));
    match result {
        Err(Error::FileIo { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected FileIo error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_current_report_without_markers_falls_back_to_builtin() -> anyhow::Result<()> {
    let (config, dir) = create_test_config();

    // 1. A hand-edited current report with the sample values but no markers
    let stale = "<html><p>Teshaboyev Teshavoy Teshavoyevich</p><td>500</td></html>";
    fs::write(&config.output.current_report, stale)?;

    // 2. Generate a report for another patient
    let image = create_test_image(dir.path());
    let mut session = Session::new(StubDetector { detections: make_detections(7, 2, 1) }, &config);
    session.load_image(image)?;
    let report = session.generate_report(&make_patient("Real Patient"), datetime!(2026-10-17 13:00:00 UTC))?;

    // 3. The document carries the new patient, not the stale content
    let html = fs::read_to_string(&report.html_path)?;
    assert!(html.contains(r#"<span data-field="patient_name">Real Patient</span>"#));
    assert!(html.contains(r#"<th data-field="total_count">10</th>"#));
    assert!(!html.contains("Teshaboyev"));

    // 4. The current file is a working template again
    assert_eq!(fs::read_to_string(&config.output.current_report)?, html);

    Ok(())
}

#[test]
fn test_fixed_template_without_patient_fields_is_rejected() -> anyhow::Result<()> {
    let (mut config, dir) = create_test_config();
    let template_path = dir.path().join("bare.html");
    fs::write(&template_path, "<html><td data-field=\"live_percent\"></td></html>")?;
    config.output.template = Some(template_path.clone());

    let image = create_test_image(dir.path());
    let mut session = Session::new(StubDetector { detections: make_detections(1, 1, 0) }, &config);
    session.load_image(image)?;

    let result = session.generate_report(&make_patient("Nobody"), datetime!(2026-10-17 13:30:00 UTC));
    match result {
        Err(Error::Template { template, missing }) => {
            assert_eq!(template, template_path.display().to_string());
            assert_eq!(missing.0, "patient_name");
        }
        other => panic!("expected Template error, got {other:?}"),
    }

    // Nothing is written when the template is unusable
    assert_eq!(count_files(&config.output.reports_dir), 0);
    assert!(!config.output.current_report.exists());

    Ok(())
}
