use thiserror::Error;
use xqfront_parser::ParseError;
use xqfront_traits::SourceError;

/// Failure to produce a parsed main module.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Could not read query: {0}")]
    Source(#[from] SourceError),
}

impl CompileError {
    /// The fatal parse error, if parsing was reached.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            CompileError::Parse(e) => Some(e),
            CompileError::Source(_) => None,
        }
    }
}
