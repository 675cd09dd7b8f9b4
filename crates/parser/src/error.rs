//! Error codes, diagnostics and the fatal parse error.
use std::fmt;
use thiserror::Error;
use xqfront_ast::ModuleId;

/// The standardized error codes the parser reports.
///
/// Each variant maps to a fixed short code via [`ErrorCode::as_str`]; callers
/// that match on specific codes should match on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Syntax,
    UnknownPrefix,
    UnsupportedVersion,
    DuplicateBaseUri,
    DuplicateNamespacePrefix,
    DuplicateFunction,
    DuplicateDefaultCollation,
    DuplicateParameter,
    DuplicateAttribute,
    NamespaceAttributeNotLiteral,
    ReservedFunctionNamespace,
    DuplicateModuleImport,
    ComponentOutsideModuleNamespace,
    DuplicateVariable,
    DuplicateCopyNamespaces,
    DuplicateSchemaImport,
    ModuleNotFound,
    DuplicateOrdering,
    DuplicateDefaultNamespace,
    DuplicateConstruction,
    DuplicateBoundarySpace,
    DuplicateEmptyOrder,
    ReservedNamespace,
    DuplicateNamespaceAttribute,
    EmptyNamespaceUri,
    InvalidEncoding,
    EmptyModuleNamespace,
    PositionalVariableConflict,
    InvalidCharacterReference,
    CyclicImport,
    GroupingVariableNotInScope,
    InvalidDecimalFormatValue,
    DuplicateContextItem,
    DuplicateWindowVariable,
    DuplicateAnnotation,
    DuplicateDecimalFormat,
    DuplicateDecimalFormatProperty,
    TagMismatch,
    DuplicateRevalidation,
    DuplicateMatchOption,
    EncodingIgnored,
    ImplementationLimit,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "XPST0003",
            ErrorCode::UnknownPrefix => "XPST0081",
            ErrorCode::UnsupportedVersion => "XQST0031",
            ErrorCode::DuplicateBaseUri => "XQST0032",
            ErrorCode::DuplicateNamespacePrefix => "XQST0033",
            ErrorCode::DuplicateFunction => "XQST0034",
            ErrorCode::DuplicateDefaultCollation => "XQST0038",
            ErrorCode::DuplicateParameter => "XQST0039",
            ErrorCode::DuplicateAttribute => "XQST0040",
            ErrorCode::NamespaceAttributeNotLiteral => "XQST0022",
            ErrorCode::ReservedFunctionNamespace => "XQST0045",
            ErrorCode::DuplicateModuleImport => "XQST0047",
            ErrorCode::ComponentOutsideModuleNamespace => "XQST0048",
            ErrorCode::DuplicateVariable => "XQST0049",
            ErrorCode::DuplicateCopyNamespaces => "XQST0055",
            ErrorCode::DuplicateSchemaImport => "XQST0058",
            ErrorCode::ModuleNotFound => "XQST0059",
            ErrorCode::DuplicateOrdering => "XQST0065",
            ErrorCode::DuplicateDefaultNamespace => "XQST0066",
            ErrorCode::DuplicateConstruction => "XQST0067",
            ErrorCode::DuplicateBoundarySpace => "XQST0068",
            ErrorCode::DuplicateEmptyOrder => "XQST0069",
            ErrorCode::ReservedNamespace => "XQST0070",
            ErrorCode::DuplicateNamespaceAttribute => "XQST0071",
            ErrorCode::EmptyNamespaceUri => "XQST0085",
            ErrorCode::InvalidEncoding => "XQST0087",
            ErrorCode::EmptyModuleNamespace => "XQST0088",
            ErrorCode::PositionalVariableConflict => "XQST0089",
            ErrorCode::InvalidCharacterReference => "XQST0090",
            ErrorCode::CyclicImport => "XQST0093",
            ErrorCode::GroupingVariableNotInScope => "XQST0094",
            ErrorCode::InvalidDecimalFormatValue => "XQST0097",
            ErrorCode::DuplicateContextItem => "XQST0099",
            ErrorCode::DuplicateWindowVariable => "XQST0103",
            ErrorCode::DuplicateAnnotation => "XQST0106",
            ErrorCode::DuplicateDecimalFormat => "XQST0111",
            ErrorCode::DuplicateDecimalFormatProperty => "XQST0114",
            ErrorCode::TagMismatch => "XQST0118",
            ErrorCode::DuplicateRevalidation => "XUST0003",
            ErrorCode::DuplicateMatchOption => "FTST0019",
            ErrorCode::EncodingIgnored => "XQWN0001",
            ErrorCode::ImplementationLimit => "XPDY0130",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One error or warning, tagged with a code and a byte offset into the
/// module text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub offset: usize,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, offset: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            offset,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(code: ErrorCode, offset: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            offset,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Line and column of this diagnostic within `source`.
    pub fn location(&self, source: &str) -> Location {
        Location::of(source, self.offset)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at offset {}: {}",
            self.severity, self.code, self.offset, self.message
        )
    }
}

/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    /// Computes the location of a byte offset. Columns count characters, and
    /// offsets past the end clamp to the end of the text.
    pub fn of(source: &str, offset: usize) -> Self {
        let mut end = offset.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let before = &source[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count() + 1;
        Self { line, col }
    }
}

impl From<(usize, usize)> for Location {
    fn from((line, col): (usize, usize)) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

/// The single fatal failure of one parse attempt.
///
/// `recorded` holds the non-fatal diagnostics collected before the failure, in
/// the order they were reported.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{module}: {diagnostic}")]
pub struct ParseError {
    pub diagnostic: Diagnostic,
    pub recorded: Vec<Diagnostic>,
    pub module: ModuleId,
}

impl ParseError {
    pub fn new(diagnostic: Diagnostic, module: ModuleId) -> Self {
        Self {
            diagnostic,
            recorded: Vec::new(),
            module,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.diagnostic.code
    }

    pub fn offset(&self) -> usize {
        self.diagnostic.offset
    }

    pub fn message(&self) -> &str {
        &self.diagnostic.message
    }
}
