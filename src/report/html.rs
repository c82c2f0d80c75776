use time::OffsetDateTime;

use crate::aggregate::AggregateResult;
use crate::models::{PatientRecord, SpermClass};
use crate::report::{display_date, display_time};

/// Template shipped with the binary, used when no other template exists
pub const DEFAULT_TEMPLATE: &str = include_str!("template.html");

/// A markup document whose values live in `data-field="<name>"` elements.
///
/// Filling replaces the element content, so a generated report is itself a
/// valid template for the next one.
#[derive(Debug, Clone)]
pub struct HtmlTemplate {
    source: String,
}

impl HtmlTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Replace the content of every element tagged with `field`, up to the
    /// first closing tag. Returns how many elements were filled.
    pub fn fill_field(&mut self, field: &str, value: &str) -> usize {
        let marker = format!("data-field=\"{field}\"");
        let escaped = escape(value);
        let mut filled = 0;
        let mut search_from = 0;

        while let Some(found) = self.source[search_from..].find(&marker) {
            let marker_at = search_from + found;
            let Some(tag_end) = self.source[marker_at..].find('>') else {
                break;
            };
            let content_start = marker_at + tag_end + 1;
            let Some(content_len) = self.source[content_start..].find("</") else {
                break;
            };

            self.source
                .replace_range(content_start..content_start + content_len, &escaped);
            filled += 1;
            search_from = content_start + escaped.len();
        }

        filled
    }

    /// Patient fields that have no `data-field` element in this document
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|field| !self.source.contains(&format!("data-field=\"{field}\"")))
            .collect()
    }

    /// Fill every report field and return the finished document.
    ///
    /// Fails when a patient field has nowhere to go; statistics fields
    /// missing from a custom template are only logged.
    pub fn render(
        mut self,
        result: &AggregateResult,
        patient: &PatientRecord,
        timestamp: OffsetDateTime,
    ) -> Result<String, MissingField> {
        if let Some(field) = self.missing_fields().into_iter().next() {
            return Err(MissingField(field));
        }

        let mut fields: Vec<(String, String)> = vec![
            ("patient_name".into(), patient.full_name.clone()),
            ("birth_date".into(), patient.birth_date.clone()),
            ("patient_id".into(), patient.id.clone()),
            ("report_date".into(), display_date(timestamp)),
            ("report_time".into(), display_time(timestamp)),
            ("total_count".into(), result.total_count.to_string()),
            ("conclusion".into(), patient.conclusion.clone()),
            ("doctor".into(), patient.doctor.clone()),
        ];
        for class in SpermClass::ALL {
            let key = class.label().to_lowercase();
            fields.push((format!("{key}_count"), result.counts.get(class).to_string()));
            fields.push((format!("{key}_percent"), format!("{}%", result.percentages.get(class))));
        }

        for (field, value) in &fields {
            if self.fill_field(field, value) == 0 {
                tracing::warn!(field = %field, "template has no element for report field");
            }
        }
        Ok(self.source)
    }
}

/// Operator-entered fields every template must carry
pub const REQUIRED_FIELDS: [&str; 5] = ["patient_name", "birth_date", "patient_id", "conclusion", "doctor"];

/// A template lacks an element for a required field
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("template has no element for field `{0}`")]
pub struct MissingField(pub &'static str);

/// Minimal HTML text escaping
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
