//! Context-sensitive scanner and recursive-descent parser for XQuery.
//!
//! XQuery cannot be tokenized up front: `div`, `element` or `<` mean
//! different things depending on where they appear. The parser therefore
//! drives a scanner that matches small patterns against the raw text on
//! demand, with a lexical state deciding which patterns are legal at each
//! point.
//!
//! # Key Types
//!
//! - [`Parser`]: one parse of one module text
//! - [`ParserConfig`]: extensions, predeclared namespaces, limits
//! - [`ParsedModule`]: AST, static context and recorded diagnostics
//! - [`ParseError`]: the fatal error that ended a parse
//! - [`ModuleResolver`]: seam for loading imported library modules
//!
//! # Example
//!
//! ```ignore
//! use xqfront_parser::{parse_main_module, ParserConfig};
//!
//! let parsed = parse_main_module("for $i in 1 to 3 return $i * 2", ParserConfig::default())?;
//! assert!(parsed.is_ok());
//! ```

pub mod config;
pub mod context;
pub mod cursor;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod resolver;
pub mod rules;
pub mod scanner;

pub use config::{Extension, ParserConfig};
pub use context::{FunctionSignature, StaticContext, VariableSignature};
pub use diagnostics::DiagnosticSink;
pub use error::{Diagnostic, ErrorCode, ParseError, Severity};
pub use lexer::LexState;
pub use parser::{ModuleKind, Parser};
pub use resolver::{ModuleResolver, ParsedModule, ResolveError};

use xqfront_ast::Expr;

/// Parses a main module (optional prolog followed by a query body).
pub fn parse_main_module(src: &str, config: ParserConfig) -> Result<ParsedModule, ParseError> {
    Parser::new(src, config).parse_main_module()
}

/// Parses a library module (`module namespace p = "uri";` and a prolog).
pub fn parse_library_module(src: &str, config: ParserConfig) -> Result<ParsedModule, ParseError> {
    Parser::new(src, config).parse_library_module()
}

/// Parses a standalone expression with no prolog.
pub fn parse_expression(src: &str, config: ParserConfig) -> Result<Expr, ParseError> {
    Parser::new(src, config).parse_expression()
}
