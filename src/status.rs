use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::*;

use crate::MolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub message: String,
}

impl Display for StatusMessage {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// An ordered, append-only log of the warnings and errors raised while a
/// top-level operation ran.
///
/// Warnings never stop an operation. The first error aborts the operation
/// that raised it, and the caller is expected to look at the log after
/// every call that can fail.
#[derive(Debug, Clone, Default)]
pub struct Status {
    messages: Vec<StatusMessage>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.messages.push(StatusMessage {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.messages.push(StatusMessage {
            severity: Severity::Error,
            message,
        });
    }

    /// Records the error of a failed call and hands back the value of a
    /// successful one.
    pub fn check<T>(&mut self, result: Result<T, MolError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push_error(e.to_string());
                None
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn has_warning(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Warning)
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &StatusMessage> {
        self.messages.iter().filter(|m| m.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", message)?;
        }
        Ok(())
    }
}
