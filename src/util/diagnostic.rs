//! User-friendly diagnostic messages.
//!
//! Every fatal error printed by the CLI carries its root cause, the values
//! that triggered it and, where the user can do something about it, a
//! suggested fix. Errors with a stable code render it as `error[code]`.

use std::fmt;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    fn ansi(&self) -> &'static str {
        match self {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable error code, e.g. `capnp_recipe::validate::unsupported_toolchain`
    pub code: Option<String>,
    pub message: String,
    /// Values that triggered the diagnostic
    pub context: Vec<String>,
    pub notes: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            code: None,
            message: message.into(),
            context: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render for a terminal, with ANSI colors if `color` is set.
    pub fn format(&self, color: bool) -> String {
        let paint = |text: &str, ansi: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", ansi, text)
            } else {
                text.to_string()
            }
        };

        let mut heading = self.severity.label().to_string();
        if let Some(ref code) = self.code {
            heading.push_str(&format!("[{}]", code));
        }

        let mut output = format!(
            "{}: {}\n",
            paint(&heading, self.severity.ansi()),
            self.message
        );

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        for note in &self.notes {
            output.push_str(&format!("  = {}: {}\n", paint("note", "1;36"), note));
        }

        match self.suggestions.as_slice() {
            [] => {}
            [only] => {
                output.push_str(&format!("\n{}: {}\n", paint("help", "1;32"), only));
            }
            many => {
                output.push_str(&format!("\n{}: try one of:\n", paint("help", "1;32")));
                for (i, suggestion) in many.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
