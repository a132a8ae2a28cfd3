use colored::Colorize;

use crate::application::reporting::{Severity, StatusLine, StatusReporter};

/// Render one status line. Colors carry the severity; without color the
/// severity is spelled out for warnings, failures and successes.
pub fn format_status_line(severity: Severity, message: &str, use_color: bool) -> String {
    if use_color {
        match severity {
            Severity::Header => message.bright_magenta().bold().to_string(),
            Severity::Info => message.to_string(),
            Severity::Success => message.green().to_string(),
            Severity::Warning => message.yellow().to_string(),
            Severity::Failure => message.red().to_string(),
        }
    } else {
        match severity {
            Severity::Header | Severity::Info => message.to_string(),
            Severity::Success => format!("[SUCCESS] {}", message),
            Severity::Warning => format!("[WARNING] {}", message),
            Severity::Failure => format!("[ERROR] {}", message),
        }
    }
}

/// Whether stdout should get ANSI colors
pub fn color_enabled(no_color: bool) -> bool {
    !no_color && atty::is(atty::Stream::Stdout)
}

/// Prints status lines as they are reported
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    use_color: bool,
    /// Keep stdout free for machine-readable output
    to_stderr: bool,
}

impl ConsoleReporter {
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            to_stderr: false,
        }
    }

    pub fn with_stderr(mut self, to_stderr: bool) -> Self {
        self.to_stderr = to_stderr;
        self
    }
}

impl StatusReporter for ConsoleReporter {
    fn report(&mut self, line: StatusLine) {
        let rendered = format_status_line(line.severity, &line.message, self.use_color);
        if self.to_stderr {
            eprintln!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
    }
}
