//! Recursive-descent grammar over the pattern matcher.
//!
//! One method per production, split by area: [`prolog`] for module structure
//! and declarations, [`expr`] for the operator layers and keyword expressions,
//! [`path`] for steps and primaries, then FLWOR, types, constructors and the
//! full-text, update and scripting extensions.

mod constructors;
mod expr;
mod flwor;
mod fulltext;
mod path;
mod prolog;
mod scripting;
mod types;
mod update;

use crate::config::ParserConfig;
use crate::context::StaticContext;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Diagnostic, ErrorCode, ParseError};
use crate::lexer::LexState;
use crate::pattern::{Matcher, Rule};
use crate::resolver::{ModuleResolver, ParsedModule};
use crate::scanner::ScanError;
use std::collections::HashSet;
use xqfront_ast::{Expr, ExprKind, Module, ModuleId, QName};

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Which kind of module the input must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Main,
    Library,
}

/// Parser for one module text.
///
/// ```ignore
/// let parsed = Parser::new("1 + 2", ParserConfig::default()).parse_main_module()?;
/// assert!(parsed.is_ok());
/// ```
pub struct Parser<'src, 'r> {
    scan: Matcher<'src>,
    config: ParserConfig,
    context: StaticContext,
    diagnostics: DiagnosticSink,
    module: ModuleId,
    resolver: Option<&'r dyn ModuleResolver>,
    depth: usize,
    library_namespace: Option<String>,
    declared_prefixes: HashSet<String>,
}

impl<'src, 'r> Parser<'src, 'r> {
    pub fn new(src: &'src str, config: ParserConfig) -> Self {
        let module = config
            .source_uri
            .as_deref()
            .map(ModuleId::from)
            .unwrap_or_default();
        Self {
            scan: Matcher::new(src, &config),
            context: StaticContext::new(&config),
            config,
            diagnostics: DiagnosticSink::new(),
            module,
            resolver: None,
            depth: 0,
            library_namespace: None,
            declared_prefixes: HashSet::new(),
        }
    }

    /// Resolver consulted for `import module` declarations. Without one,
    /// imports are recorded in the prolog but not loaded.
    pub fn with_resolver(mut self, resolver: &'r dyn ModuleResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn context(&self) -> &StaticContext {
        &self.context
    }

    pub fn parse_main_module(self) -> Result<ParsedModule, ParseError> {
        self.run(Some(ModuleKind::Main))
    }

    pub fn parse_library_module(self) -> Result<ParsedModule, ParseError> {
        self.run(Some(ModuleKind::Library))
    }

    /// Parses either kind, deciding on the presence of a module declaration.
    pub fn parse_module(self) -> Result<ParsedModule, ParseError> {
        self.run(None)
    }

    /// Parses a single expression with no prolog.
    pub fn parse_expression(self) -> Result<Expr, ParseError> {
        let stack = self.config.stack_size();
        let module = self.module.clone();
        on_parser_stack(stack, &module, move || self.expression_unit())
    }

    fn expression_unit(mut self) -> Result<Expr, ParseError> {
        let result = self.expr().and_then(|expr| {
            self.expect_end()?;
            Ok(expr)
        });
        result.map_err(|mut err| {
            err.recorded = self.diagnostics.into_vec();
            err
        })
    }

    fn run(self, kind: Option<ModuleKind>) -> Result<ParsedModule, ParseError> {
        let stack = self.config.stack_size();
        let module = self.module.clone();
        on_parser_stack(stack, &module, move || self.module_result(kind))
    }

    fn module_result(mut self, kind: Option<ModuleKind>) -> Result<ParsedModule, ParseError> {
        log::debug!("parsing module {}", self.module);
        match self.module_unit(kind) {
            Ok(module) => {
                log::debug!(
                    "parsed module {} with {} diagnostic(s)",
                    self.module,
                    self.diagnostics.len()
                );
                Ok(ParsedModule {
                    id: self.module,
                    module,
                    context: self.context,
                    diagnostics: self.diagnostics.into_vec(),
                })
            }
            Err(mut err) => {
                log::debug!("parse of {} failed: {}", self.module, err.diagnostic);
                err.recorded = self.diagnostics.into_vec();
                Err(err)
            }
        }
    }

    fn module_unit(&mut self, kind: Option<ModuleKind>) -> PResult<Module> {
        let version = self.version_decl()?;
        let is_library = self.peek(&crate::rules::MODULE_NAMESPACE)?;
        match (kind, is_library) {
            (Some(ModuleKind::Main), true) => Err(self.fatal(
                ErrorCode::Syntax,
                self.scan.next_offset(),
                "expected a main module, found a library module declaration",
            )),
            (Some(ModuleKind::Library), _) | (None, true) => self.library_module(version),
            _ => self.main_module(version),
        }
    }

    // Scanning helpers

    fn eat(&mut self, rule: &Rule) -> PResult<bool> {
        self.scan.eat(rule).map_err(|d| self.fail(d))
    }

    fn peek(&mut self, rule: &Rule) -> PResult<bool> {
        self.scan.peek(rule).map_err(|d| self.fail(d))
    }

    fn expect(&mut self, rule: &Rule) -> PResult<()> {
        if self.eat(rule)? {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", rule.describe())))
        }
    }

    fn goto(&mut self, state: LexState) {
        self.scan.goto(state);
    }

    /// Offset where the last matched rule's text began.
    fn start(&self) -> usize {
        self.scan.token_start()
    }

    /// Runs a sub-scanner at the cursor, for text the rule table does not
    /// describe: markup content, pragma bodies.
    fn lex<T>(
        &mut self,
        scanner: impl nom::Parser<&'src str, Output = T, Error = ScanError<'src>>,
    ) -> PResult<Option<T>> {
        self.scan.run(scanner).map_err(|d| self.fail(d))
    }

    fn at_end(&mut self) -> PResult<bool> {
        self.scan.at_end().map_err(|d| self.fail(d))
    }

    fn expect_end(&mut self) -> PResult<()> {
        if self.at_end()? {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    // Nodes and names

    fn node(&self, kind: ExprKind, offset: usize) -> Expr {
        Expr::new(kind, offset, self.module.clone())
    }

    fn captured_qname(&self, index: usize) -> (Option<String>, String) {
        self.scan.captures().qname(index)
    }

    fn captured_name(&self, index: usize) -> String {
        self.scan.captures().name(index)
    }

    fn captured_string(&self, index: usize) -> String {
        self.scan.captures().string(index)
    }

    /// Resolves a lexical QName. Unprefixed names take `default`; an unknown
    /// prefix is recorded and leaves the namespace unresolved.
    fn resolve_name(
        &mut self,
        (prefix, local): (Option<String>, String),
        default: Option<String>,
        offset: usize,
    ) -> QName {
        match prefix {
            Some(prefix) => {
                let namespace = self.context.resolve_prefix(&prefix).map(str::to_string);
                if namespace.is_none() {
                    self.record(
                        ErrorCode::UnknownPrefix,
                        offset,
                        format!("namespace prefix '{}' is not declared", prefix),
                    );
                }
                QName {
                    prefix: Some(prefix),
                    local_part: local,
                    namespace,
                }
            }
            None => QName {
                prefix: None,
                local_part: local,
                namespace: default,
            },
        }
    }

    /// Element and type names use the default element namespace.
    fn element_name(&mut self, lexical: (Option<String>, String), offset: usize) -> QName {
        let default = self.context.default_element_namespace().map(str::to_string);
        self.resolve_name(lexical, default, offset)
    }

    fn function_name(&mut self, lexical: (Option<String>, String), offset: usize) -> QName {
        let default = self.context.default_function_namespace().map(str::to_string);
        self.resolve_name(lexical, default, offset)
    }

    /// Variables, attributes and other names with no default namespace.
    fn plain_name(&mut self, lexical: (Option<String>, String), offset: usize) -> QName {
        self.resolve_name(lexical, None, offset)
    }

    // Diagnostics

    fn fail(&self, diagnostic: Diagnostic) -> ParseError {
        ParseError::new(diagnostic, self.module.clone())
    }

    fn fatal(&self, code: ErrorCode, offset: usize, message: impl Into<String>) -> ParseError {
        self.fail(Diagnostic::error(code, offset, message))
    }

    /// Syntax error at the next significant character.
    fn unexpected(&self, expected: &str) -> ParseError {
        self.fatal(
            ErrorCode::Syntax,
            self.scan.next_offset(),
            format!("expected {}, found {}", expected, self.scan.excerpt()),
        )
    }

    fn record(&mut self, code: ErrorCode, offset: usize, message: impl Into<String>) {
        self.diagnostics.error(code, offset, message);
    }

    fn warn(&mut self, code: ErrorCode, offset: usize, message: impl Into<String>) {
        self.diagnostics.warning(code, offset, message);
    }

    /// Guards recursive productions against unbounded nesting.
    fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(self.fatal(
                ErrorCode::ImplementationLimit,
                self.scan.next_offset(),
                format!("expression nesting exceeds {} levels", self.config.max_depth),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Runs one parse on a scoped thread whose stack fits the configured
/// nesting limit, so deep input ends in a diagnostic instead of an overflow.
fn on_parser_stack<T: Send>(
    stack: usize,
    module: &ModuleId,
    parse: impl FnOnce() -> Result<T, ParseError> + Send,
) -> Result<T, ParseError> {
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("xqfront-parse".into())
            .stack_size(stack)
            .spawn_scoped(scope, parse)
            .map_err(|e| {
                ParseError::new(
                    Diagnostic::error(
                        ErrorCode::ImplementationLimit,
                        0,
                        format!("cannot reserve {} bytes of parser stack: {}", stack, e),
                    ),
                    module.clone(),
                )
            })?;
        handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })
}
