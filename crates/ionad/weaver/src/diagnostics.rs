// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Diagnostic channels
//!
//! The weaver talks to its host through two channels: informational
//! messages and errors. Errors never stop a run; they only tell the host
//! that part of the module was left untouched.

use std::fmt;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A recorded diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Receiver for weaver diagnostics
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink {
    /// Informational message
    fn info(&mut self, message: &str);
    /// Error message; processing continues after it
    fn error(&mut self, message: &str);
}

/// Sink forwarding to a pair of host callbacks
pub struct CallbackSink<I, E>
where
    I: FnMut(&str),
    E: FnMut(&str),
{
    log_info: I,
    log_error: E,
}

impl<I, E> CallbackSink<I, E>
where
    I: FnMut(&str),
    E: FnMut(&str),
{
    pub fn new(log_info: I, log_error: E) -> Self {
        Self { log_info, log_error }
    }
}

impl<I, E> DiagnosticSink for CallbackSink<I, E>
where
    I: FnMut(&str),
    E: FnMut(&str),
{
    fn info(&mut self, message: &str) {
        (self.log_info)(message);
    }

    fn error(&mut self, message: &str) {
        (self.log_error)(message);
    }
}

/// Sink forwarding to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn info(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&mut self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Sink that records every message, optionally forwarding to another sink
#[derive(Default)]
pub struct CollectingSink<'a> {
    diagnostics: Vec<Diagnostic>,
    forward: Option<&'a mut dyn DiagnosticSink>,
}

impl<'a> CollectingSink<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record messages and pass them on to `sink`
    pub fn forwarding_to(sink: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            diagnostics: Vec::new(),
            forward: Some(sink),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Messages recorded at the given level
    pub fn messages(&self, level: Level) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.level == level)
            .map(|diagnostic| diagnostic.message.as_str())
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.level == Level::Error).count()
    }

    fn record(&mut self, level: Level, message: &str) {
        self.diagnostics.push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}

impl DiagnosticSink for CollectingSink<'_> {
    fn info(&mut self, message: &str) {
        self.record(Level::Info, message);
        if let Some(sink) = self.forward.as_deref_mut() {
            sink.info(message);
        }
    }

    fn error(&mut self, message: &str) {
        self.record(Level::Error, message);
        if let Some(sink) = self.forward.as_deref_mut() {
            sink.error(message);
        }
    }
}
