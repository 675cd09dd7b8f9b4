//! Accumulates the non-fatal diagnostics of one parse.

use crate::error::{Diagnostic, ErrorCode, Severity};

#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink(Vec<Diagnostic>);

impl DiagnosticSink {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a non-fatal error; parsing continues.
    pub fn error(&mut self, code: ErrorCode, offset: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::error(code, offset, message);
        log::debug!("recorded {}", diagnostic);
        self.0.push(diagnostic);
    }

    pub fn warning(&mut self, code: ErrorCode, offset: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(code, offset, message);
        log::warn!("{}", diagnostic);
        self.0.push(diagnostic);
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.0.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl IntoIterator for DiagnosticSink {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_severity() {
        let mut sink = DiagnosticSink::new();
        sink.error(ErrorCode::DuplicateDefaultCollation, 10, "duplicate");
        sink.warning(ErrorCode::EncodingIgnored, 0, "ignored");
        assert_eq!(sink.len(), 2);
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.warning_count(), 1);
        let codes: Vec<_> = sink.into_iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![ErrorCode::DuplicateDefaultCollation, ErrorCode::EncodingIgnored]
        );
    }
}
