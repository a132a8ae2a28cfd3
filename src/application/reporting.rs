use serde::Serialize;

/// Category of an operator-facing status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Header,
    Info,
    Success,
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub severity: Severity,
    pub message: String,
}

impl StatusLine {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Sink for the status lines emitted while tagging a release.
pub trait StatusReporter {
    fn report(&mut self, line: StatusLine);

    fn header(&mut self, message: &str) {
        self.report(StatusLine::new(Severity::Header, message));
    }

    fn info(&mut self, message: &str) {
        self.report(StatusLine::new(Severity::Info, message));
    }

    fn success(&mut self, message: &str) {
        self.report(StatusLine::new(Severity::Success, message));
    }

    fn warning(&mut self, message: &str) {
        self.report(StatusLine::new(Severity::Warning, message));
    }

    fn failure(&mut self, message: &str) {
        self.report(StatusLine::new(Severity::Failure, message));
    }
}

/// Collects lines in memory
impl StatusReporter for Vec<StatusLine> {
    fn report(&mut self, line: StatusLine) {
        self.push(line);
    }
}
