//! Colored terminal output for build progress and the final report.

use console::{Style, Term};
use folio_build::BuildReport;

/// How a line is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a formatter writing to stderr, leaving stdout to generated content.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Error, msg);
    }

    /// Print the outcome of a build: skipped pages, the page count and any
    /// extra files written next to the pages.
    pub(crate) fn build_report(&self, report: &BuildReport) {
        for (tone, line) in report_lines(report) {
            self.line(tone, &line);
        }
    }

    fn line(&self, tone: Tone, msg: &str) {
        let styled = match tone {
            Tone::Plain => msg.to_owned(),
            Tone::Success => self.green.apply_to(msg).to_string(),
            Tone::Warning => self.yellow.apply_to(msg).to_string(),
            Tone::Error => self.red.apply_to(msg).to_string(),
        };
        // A closed stderr must not turn a finished build into a failure
        if let Err(e) = self.term.write_line(&styled) {
            tracing::debug!(error = %e, "Failed to write to terminal");
        }
    }
}

/// Lines summarizing `report`, in print order.
pub(crate) fn report_lines(report: &BuildReport) -> Vec<(Tone, String)> {
    let mut lines: Vec<(Tone, String)> = report
        .failures
        .iter()
        .map(|failure| {
            (
                Tone::Warning,
                format!(
                    "Warning: {} was not rendered: {}",
                    failure.url_path, failure.message
                ),
            )
        })
        .collect();

    let noun = if report.discovered == 1 { "page" } else { "pages" };
    let summary = format!(
        "Rendered {} of {} {noun}",
        report.rendered, report.discovered
    );
    let tone = if report.is_complete() {
        Tone::Success
    } else {
        Tone::Warning
    };
    lines.push((tone, summary));

    lines.extend(
        report
            .extra_outputs
            .iter()
            .map(|path| (Tone::Plain, format!("Wrote {}", path.display()))),
    );
    lines
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use folio_build::RouteFailure;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_complete_build_is_success() {
        let report = BuildReport {
            discovered: 3,
            rendered: 3,
            extra_outputs: vec![PathBuf::from("dist/sitemap.xml")],
            ..BuildReport::default()
        };
        assert_eq!(
            report_lines(&report),
            vec![
                (Tone::Success, "Rendered 3 of 3 pages".to_owned()),
                (Tone::Plain, "Wrote dist/sitemap.xml".to_owned()),
            ]
        );
    }

    #[test]
    fn test_failures_listed_before_summary() {
        let report = BuildReport {
            discovered: 2,
            rendered: 1,
            failures: vec![RouteFailure {
                url_path: "/guide/".to_owned(),
                message: "unknown component 'chart'".to_owned(),
            }],
            ..BuildReport::default()
        };
        assert_eq!(
            report_lines(&report),
            vec![
                (
                    Tone::Warning,
                    "Warning: /guide/ was not rendered: unknown component 'chart'".to_owned()
                ),
                (Tone::Warning, "Rendered 1 of 2 pages".to_owned()),
            ]
        );
    }

    #[test]
    fn test_single_page_wording() {
        let report = BuildReport {
            discovered: 1,
            rendered: 1,
            ..BuildReport::default()
        };
        assert_eq!(report_lines(&report)[0].1, "Rendered 1 of 1 page");
    }
}
