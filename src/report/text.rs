use time::OffsetDateTime;

use crate::aggregate::{AggregateResult, PerClass};
use crate::models::PatientRecord;
use crate::report::display_stamp;

const TITLE: &str = "=== SPERM ANALYSIS REPORT ===";
const RESULTS_HEADER: &str = "--- RESULTS ---";
const CONCLUSION_HEADER: &str = "\nCONCLUSION:\n";
const DOCTOR_PREFIX: &str = "\n\nDoctor: ";

/// Render the plain-text report. Patient fields are written verbatim.
pub fn render_text(
    result: &AggregateResult,
    patient: &PatientRecord,
    timestamp: OffsetDateTime,
) -> String {
    let p = &result.percentages;
    format!(
        "{TITLE}\n\n\
         Date: {date}\n\
         Patient: {name}\n\
         Birth date: {birth}\n\
         ID: {id}\n\n\
         {RESULTS_HEADER}\n\
         Live sperm: {live}%\n\
         Dead sperm: {dead}%\n\
         Immature sperm: {immature}%\n\
         {CONCLUSION_HEADER}\
         {conclusion}\
         {DOCTOR_PREFIX}{doctor}",
        date = display_stamp(timestamp),
        name = patient.full_name,
        birth = patient.birth_date,
        id = patient.id,
        live = p.live,
        dead = p.dead,
        immature = p.immature,
        conclusion = patient.conclusion,
        doctor = patient.doctor,
    )
}

/// Fields recovered from a plain-text report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTextReport {
    pub date: String,
    pub patient: PatientRecord,
    pub percentages: PerClass<u32>,
}

/// Read back a document produced by [`render_text`]. Returns `None` when the
/// layout does not match.
///
/// Header fields are read one line each, so a multi-line name, birth date or
/// ID comes back truncated to its first line. The doctor is whatever follows
/// the last `"\n\nDoctor: "`; a doctor value containing that sequence is
/// split, with the front part appended to the conclusion. The conclusion
/// itself may span any number of lines.
pub fn parse_text(text: &str) -> Option<ParsedTextReport> {
    let (head, tail) = text.split_once(CONCLUSION_HEADER)?;
    let doctor_at = tail.rfind(DOCTOR_PREFIX)?;
    let conclusion = &tail[..doctor_at];
    let doctor = &tail[doctor_at + DOCTOR_PREFIX.len()..];

    let mut lines = head.lines();
    if lines.next()? != TITLE {
        return None;
    }

    let mut date = None;
    let mut patient = PatientRecord {
        conclusion: conclusion.to_string(),
        doctor: doctor.to_string(),
        ..Default::default()
    };
    let mut live = None;
    let mut dead = None;
    let mut immature = None;

    for line in lines {
        if let Some(v) = line.strip_prefix("Date: ") {
            date = Some(v.to_string());
        } else if let Some(v) = line.strip_prefix("Patient: ") {
            patient.full_name = v.to_string();
        } else if let Some(v) = line.strip_prefix("Birth date: ") {
            patient.birth_date = v.to_string();
        } else if let Some(v) = line.strip_prefix("ID: ") {
            patient.id = v.to_string();
        } else if let Some(v) = line.strip_prefix("Live sperm: ") {
            live = parse_percent(v);
        } else if let Some(v) = line.strip_prefix("Dead sperm: ") {
            dead = parse_percent(v);
        } else if let Some(v) = line.strip_prefix("Immature sperm: ") {
            immature = parse_percent(v);
        }
    }

    Some(ParsedTextReport {
        date: date?,
        patient,
        percentages: PerClass {
            live: live?,
            dead: dead?,
            immature: immature?,
        },
    })
}

fn parse_percent(value: &str) -> Option<u32> {
    value.strip_suffix('%')?.parse().ok()
}
