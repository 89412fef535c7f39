//! Source-annotated rendering of codec errors.

use crate::error::Error;
use ariadne::{Config, Label, Report, ReportKind, Source};

impl Error {
    /// Render this error against the text it was read from.
    ///
    /// Parse errors get an annotated excerpt of `source` labelled with
    /// `name`. Other errors, and reports that cannot be rendered, fall back
    /// to the plain message.
    pub fn render(&self, name: &str, source: &str) -> String {
        let Error::Parse { kind, mark, path } = self else {
            return self.to_string();
        };

        let length = source.chars().count();
        let start = mark.index().min(length);
        let end = (start + 1).min(length);
        let label = match path {
            Some(path) if !path.is_root() => format!("while reading {}", path),
            _ => kind.to_string(),
        };

        let report = Report::build(ReportKind::Error, name.to_string(), start)
            .with_config(Config::default().with_color(false))
            .with_message(kind.to_string())
            .with_label(Label::new((name.to_string(), start..end)).with_message(label))
            .finish();

        let mut output = Vec::new();
        match report.write((name.to_string(), Source::from(source)), &mut output) {
            Ok(()) => String::from_utf8(output).unwrap_or_else(|_| self.to_string()),
            Err(err) => {
                tracing::warn!(%err, "failed to render diagnostic");
                self.to_string()
            }
        }
    }
}
