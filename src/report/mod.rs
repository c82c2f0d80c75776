pub mod html;
pub mod results;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

use crate::aggregate::AggregateResult;
use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::models::PatientRecord;

pub use html::HtmlTemplate;
pub use results::{ResultsWriter, SavedResults};
pub use text::{ParsedTextReport, parse_text, render_text};

/// Current local time, UTC when the local offset cannot be determined
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `YYYYMMDD_HHMMSS`, used in output file names
pub fn file_stamp(ts: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    ts.format(&format).unwrap_or_default()
}

/// `DD.MM.YYYY HH:MM`
pub fn display_stamp(ts: OffsetDateTime) -> String {
    format!("{} {}", display_date(ts), display_time(ts))
}

pub fn display_date(ts: OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year]");
    ts.format(&format).unwrap_or_default()
}

pub fn display_time(ts: OffsetDateTime) -> String {
    let format = format_description!("[hour]:[minute]");
    ts.format(&format).unwrap_or_default()
}

const BUILTIN_NAME: &str = "<built-in>";

/// Where a template is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Immutable template file
    Fixed(PathBuf),
    /// The shared current report, falling back to the built-in template
    /// until the first report has been written
    Chained,
}

/// Paths written for one generated report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text_path: PathBuf,
    pub html_path: PathBuf,
    pub current_path: PathBuf,
}

/// Writes text and HTML reports into the reports directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    reports_dir: PathBuf,
    current_report: PathBuf,
    template: TemplateSource,
}

impl ReportWriter {
    pub fn new(reports_dir: impl Into<PathBuf>, current_report: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            current_report: current_report.into(),
            template: TemplateSource::Chained,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        let writer = Self::new(&config.reports_dir, &config.current_report);
        match &config.template {
            Some(path) => writer.with_template(TemplateSource::Fixed(path.clone())),
            None => writer,
        }
    }

    pub fn with_template(mut self, template: TemplateSource) -> Self {
        self.template = template;
        self
    }

    fn load_template(&self) -> Result<(HtmlTemplate, String)> {
        let path = match &self.template {
            TemplateSource::Fixed(path) => path,
            TemplateSource::Chained if self.current_report.exists() => &self.current_report,
            TemplateSource::Chained => {
                tracing::debug!("no current report yet, using built-in template");
                return Ok((HtmlTemplate::builtin(), BUILTIN_NAME.to_string()));
            }
        };
        let source = fs::read_to_string(path).map_err(|e| Error::file_io(path, e))?;
        let template = HtmlTemplate::new(source);

        // A current report edited by hand may have lost its field markers
        if self.template == TemplateSource::Chained {
            let missing = template.missing_fields();
            if !missing.is_empty() {
                tracing::warn!(
                    path = %path.display(),
                    ?missing,
                    "current report has no field markers, using built-in template"
                );
                return Ok((HtmlTemplate::builtin(), BUILTIN_NAME.to_string()));
            }
        }

        tracing::debug!(path = %path.display(), "loaded report template");
        Ok((template, path.display().to_string()))
    }

    /// Write both documents and refresh the shared current report.
    ///
    /// Files are written one after another; a failure part way leaves the
    /// earlier files in place.
    pub fn write(
        &self,
        result: &AggregateResult,
        patient: &PatientRecord,
        timestamp: OffsetDateTime,
    ) -> Result<Report> {
        let (template, template_name) = self.load_template()?;
        let html = template
            .render(result, patient, timestamp)
            .map_err(|missing| Error::Template {
                template: template_name,
                missing,
            })?;

        fs::create_dir_all(&self.reports_dir).map_err(|e| Error::file_io(&self.reports_dir, e))?;
        let stamp = file_stamp(timestamp);
        let text_path = self.reports_dir.join(format!("report_{stamp}.txt"));
        let html_path = self.reports_dir.join(format!("report_{stamp}.html"));

        write_file(&text_path, &render_text(result, patient, timestamp))?;

        write_file(&html_path, &html)?;
        if let Some(parent) = self.current_report.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::file_io(parent, e))?;
        }
        write_file(&self.current_report, &html)?;

        tracing::info!(
            text = %text_path.display(),
            html = %html_path.display(),
            "report written"
        );

        Ok(Report {
            text_path,
            html_path,
            current_path: self.current_report.clone(),
        })
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::file_io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn stamps_use_fixed_layouts() {
        let ts = datetime!(2026-03-04 05:06:07 UTC);
        assert_eq!(file_stamp(ts), "20260304_050607");
        assert_eq!(display_stamp(ts), "04.03.2026 05:06");
        assert_eq!(display_date(ts), "04.03.2026");
        assert_eq!(display_time(ts), "05:06");
    }
}
