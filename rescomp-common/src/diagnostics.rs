// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Accumulate-then-report diagnostics sink (spec §7).
//!
//! Per-entry and per-file errors don't abort a run immediately; they're
//! collected here so one broken input doesn't hide the others. Fatal errors
//! still propagate as `Err(RescompError)` and bypass this sink entirely.

use core::fmt;

const MAX_REPORTED_ERRORS: usize = 20;

/// Where a diagnostic came from: an input file and, if known, a line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: String,
    pub line: Option<u32>
}

impl Source {
    pub fn new(path: impl Into<String>) -> Self {
        Source { path: path.into(), line: None }
    }

    pub fn with_line(path: impl Into<String>, line: u32) -> Self {
        Source { path: path.into(), line: Some(line) }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.path),
            None => write!(f, "{}", self.path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warning,
    Error
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub source: Source,
    pub message: String
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Warning => "warning",
            Level::Error => "error"
        };
        write!(f, "{tag}: {}: {}", self.source, self.message)
    }
}

/// Collects warnings and errors across a whole compile or link run.
///
/// Warnings never fail the build. Errors do, but only once the run is
/// finished accumulating them, so a caller can report every broken input in
/// one pass instead of bailing on the first.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    error_count: usize
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn warn(&mut self, source: Source, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{source}: {message}");
        self.diagnostics.push(Diagnostic { level: Level::Warning, source, message });
    }

    pub fn error(&mut self, source: Source, message: impl Into<String>) {
        let message = message.into();
        self.error_count += 1;
        if self.error_count <= MAX_REPORTED_ERRORS {
            log::error!("{source}: {message}");
            self.diagnostics.push(Diagnostic { level: Level::Error, source, message });
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of errors that were recorded but not kept, because the run
    /// already hit [MAX_REPORTED_ERRORS].
    pub fn suppressed_error_count(&self) -> usize {
        self.error_count.saturating_sub(MAX_REPORTED_ERRORS)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Renders every kept diagnostic plus, if any were dropped, an
    /// "N more suppressed" trailer line (spec §7).
    pub fn render(&self) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            out.push_str(&diag.to_string());
            out.push('\n');
        }
        let suppressed = self.suppressed_error_count();
        if suppressed > 0 {
            out.push_str(&format!("{suppressed} more suppressed\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_reported_errors_but_keeps_counting() {
        let mut diags = Diagnostics::new();
        for i in 0..25 {
            diags.error(Source::new(format!("file{i}.xml")), "broken");
        }
        assert_eq!(diags.error_count(), 25);
        assert_eq!(diags.diagnostics().len(), MAX_REPORTED_ERRORS);
        assert_eq!(diags.suppressed_error_count(), 5);
        assert!(diags.render().ends_with("5 more suppressed\n"));
    }

    #[test]
    fn warnings_never_count_as_errors() {
        let mut diags = Diagnostics::new();
        diags.warn(Source::new("a.xml"), "heads up");
        assert!(!diags.has_errors());
    }
}
