//! Module structure: version declaration, module declaration, prolog
//! declarations and module imports.

use super::{PResult, Parser};
use crate::context::{
    ANNOTATIONS_NS, FunctionSignature, Setter, VariableSignature, XML_NS, XMLNS_NS,
    is_reserved_function_namespace,
};
use crate::error::ErrorCode;
use crate::lexer::LexState;
use crate::resolver::ResolveError;
use crate::rules::*;
use std::collections::HashSet;
use xqfront_ast::{
    Annotation, BoundarySpace, ConstructionMode, DecimalFormatProperty, Declaration,
    DeclarationKind, DefaultNamespaceKind, EmptyOrder, Expr, ExprKind, FunctionDecl,
    FunctionKind, LibraryModule, Literal, MainModule, Module, ModuleId, ModuleImport,
    OrderingMode, Param, Prolog, QName, SchemaImport, ValidationMode, VariableDecl, VersionDecl,
};

const SUPPORTED_VERSIONS: [&str; 4] = ["1.0", "1.1", "3.0", "3.1"];

/// Setters, namespace declarations and imports must all precede variable,
/// function, option and context item declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Setup,
    Declarations,
}

fn is_valid_encoding(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn is_reserved_prefix(prefix: &str) -> bool {
    prefix == "xml" || prefix == "xmlns"
}

impl<'src, 'r> Parser<'src, 'r> {
    pub(super) fn main_module(&mut self, version: Option<VersionDecl>) -> PResult<Module> {
        let prolog = self.prolog(version)?;
        let body = self.query_body()?;
        self.expect_end()?;
        Ok(Module::Main(MainModule { prolog, body }))
    }

    pub(super) fn library_module(&mut self, version: Option<VersionDecl>) -> PResult<Module> {
        self.expect(&MODULE_NAMESPACE)?;
        let offset = self.start();
        self.expect(&NS_BINDING)?;
        let prefix = self.captured_name(0);
        let namespace = self.captured_string(1);
        if namespace.is_empty() {
            self.record(
                ErrorCode::EmptyModuleNamespace,
                offset,
                "the target namespace of a library module must not be empty",
            );
        }
        self.check_namespace_binding(&prefix, &namespace, offset);
        self.declared_prefixes.insert(prefix.clone());
        self.context.bind(&prefix, &namespace);
        if self.config.source_uri.is_none() && !namespace.is_empty() {
            self.module = ModuleId::from(namespace.as_str());
        }
        self.library_namespace = Some(namespace.clone());
        self.expect(&SEMICOLON)?;
        let prolog = self.prolog(version)?;
        self.expect_end()?;
        Ok(Module::Library(LibraryModule {
            prefix,
            namespace,
            prolog,
        }))
    }

    pub(super) fn version_decl(&mut self) -> PResult<Option<VersionDecl>> {
        let (offset, version, encoding) = if self.eat(&VERSION)? {
            let offset = self.start();
            let version = self.captured_string(0);
            let encoding = if self.eat(&VERSION_ENCODING)? {
                Some(self.captured_string(0))
            } else {
                None
            };
            (offset, Some(version), encoding)
        } else if self.eat(&XQUERY_ENCODING)? {
            (self.start(), None, Some(self.captured_string(0)))
        } else {
            return Ok(None);
        };
        if let Some(v) = &version
            && !SUPPORTED_VERSIONS.contains(&v.as_str())
        {
            self.record(
                ErrorCode::UnsupportedVersion,
                offset,
                format!("XQuery version '{}' is not supported", v),
            );
        }
        if let Some(enc) = &encoding {
            if is_valid_encoding(enc) {
                self.warn(
                    ErrorCode::EncodingIgnored,
                    offset,
                    format!("encoding '{}' ignored: the module text is already decoded", enc),
                );
            } else {
                self.record(
                    ErrorCode::InvalidEncoding,
                    offset,
                    format!("'{}' is not a valid encoding name", enc),
                );
            }
        }
        self.expect(&SEMICOLON)?;
        Ok(Some(VersionDecl {
            version,
            encoding,
            offset,
        }))
    }

    fn prolog(&mut self, version: Option<VersionDecl>) -> PResult<Prolog> {
        let mut declarations = Vec::new();
        let mut section = Section::Setup;
        while let Some((decl, decl_section)) = self.declaration()? {
            match (section, decl_section) {
                (Section::Declarations, Section::Setup) => self.record(
                    ErrorCode::Syntax,
                    decl.offset,
                    "setters, namespace declarations and imports must precede \
                     variable, function, option and context item declarations",
                ),
                (_, Section::Declarations) => section = Section::Declarations,
                _ => {}
            }
            declarations.push(decl);
        }
        Ok(Prolog {
            version,
            declarations,
        })
    }

    /// One prolog declaration including its `;`, or `None` at the start of
    /// the query body.
    fn declaration(&mut self) -> PResult<Option<(Declaration, Section)>> {
        let mark = self.scan.mark();
        let (kind, section, offset) = if self.eat(&IMPORT_SCHEMA)? {
            let offset = self.start();
            (self.schema_import(offset)?, Section::Setup, offset)
        } else if self.eat(&IMPORT_MODULE)? {
            let offset = self.start();
            (self.module_import(offset)?, Section::Setup, offset)
        } else if self.eat(&DECLARE)? || self.eat(&DECLARE_ANNOTATED)? {
            let offset = self.start();
            match self.declare(offset)? {
                Some((kind, section)) => (kind, section, offset),
                None => {
                    // `declare` was a name in the query body.
                    self.scan.restore(mark);
                    return Ok(None);
                }
            }
        } else {
            return Ok(None);
        };
        self.expect(&SEMICOLON)?;
        Ok(Some((Declaration { kind, offset }, section)))
    }

    fn declare(&mut self, offset: usize) -> PResult<Option<(DeclarationKind, Section)>> {
        use Section::{Declarations, Setup};

        if self.eat(&DECL_BOUNDARY_SPACE)? {
            let policy = if self.eat(&PRESERVE)? {
                BoundarySpace::Preserve
            } else {
                self.expect(&STRIP)?;
                BoundarySpace::Strip
            };
            self.claim(Setter::BoundarySpace, ErrorCode::DuplicateBoundarySpace, offset);
            self.context.boundary_space = policy;
            return Ok(Some((DeclarationKind::BoundarySpace(policy), Setup)));
        }
        if self.eat(&DECL_DEFAULT_COLLATION)? {
            let uri = self.captured_string(0);
            self.claim(Setter::DefaultCollation, ErrorCode::DuplicateDefaultCollation, offset);
            self.context.default_collation = Some(uri.clone());
            return Ok(Some((DeclarationKind::DefaultCollation(uri), Setup)));
        }
        if self.eat(&DECL_BASE_URI)? {
            let uri = self.captured_string(0);
            self.claim(Setter::BaseUri, ErrorCode::DuplicateBaseUri, offset);
            self.context.base_uri = Some(uri.clone());
            return Ok(Some((DeclarationKind::BaseUri(uri), Setup)));
        }
        if self.eat(&DECL_CONSTRUCTION)? {
            let mode = if self.eat(&PRESERVE)? {
                ConstructionMode::Preserve
            } else {
                self.expect(&STRIP)?;
                ConstructionMode::Strip
            };
            self.claim(Setter::Construction, ErrorCode::DuplicateConstruction, offset);
            self.context.construction = mode;
            return Ok(Some((DeclarationKind::Construction(mode), Setup)));
        }
        if self.eat(&DECL_ORDERING)? {
            let mode = if self.eat(&ORDERED_MODE)? {
                OrderingMode::Ordered
            } else {
                self.expect(&UNORDERED_MODE)?;
                OrderingMode::Unordered
            };
            self.claim(Setter::Ordering, ErrorCode::DuplicateOrdering, offset);
            self.context.ordering = mode;
            return Ok(Some((DeclarationKind::Ordering(mode), Setup)));
        }
        if self.eat(&DECL_EMPTY_ORDER)? {
            let order = if self.eat(&GREATEST)? {
                EmptyOrder::Greatest
            } else {
                self.expect(&LEAST)?;
                EmptyOrder::Least
            };
            self.claim(Setter::EmptyOrder, ErrorCode::DuplicateEmptyOrder, offset);
            self.context.empty_order = order;
            return Ok(Some((DeclarationKind::EmptyOrder(order), Setup)));
        }
        if self.eat(&DECL_COPY_NAMESPACES)? {
            let preserve = if self.eat(&PRESERVE)? {
                true
            } else {
                self.expect(&NO_PRESERVE)?;
                false
            };
            self.expect(&DECL_COMMA)?;
            let inherit = if self.eat(&INHERIT)? {
                true
            } else {
                self.expect(&NO_INHERIT)?;
                false
            };
            self.claim(Setter::CopyNamespaces, ErrorCode::DuplicateCopyNamespaces, offset);
            self.context.copy_namespaces_preserve = preserve;
            self.context.copy_namespaces_inherit = inherit;
            return Ok(Some((DeclarationKind::CopyNamespaces { preserve, inherit }, Setup)));
        }
        if self.eat(&DECL_DEFAULT_DECIMAL_FORMAT)? {
            return Ok(Some((self.decimal_format(None, offset)?, Setup)));
        }
        if self.eat(&DECL_DECIMAL_FORMAT)? {
            let lexical = self.captured_qname(0);
            let name = self.plain_name(lexical, offset);
            return Ok(Some((self.decimal_format(Some(name), offset)?, Setup)));
        }
        if self.eat(&DECL_DEFAULT_ELEMENT_NS)? {
            let uri = self.captured_string(0);
            return Ok(Some((self.default_namespace(DefaultNamespaceKind::Element, uri, offset), Setup)));
        }
        if self.eat(&DECL_DEFAULT_FUNCTION_NS)? {
            let uri = self.captured_string(0);
            return Ok(Some((self.default_namespace(DefaultNamespaceKind::Function, uri, offset), Setup)));
        }
        if self.eat(&DECL_NAMESPACE)? {
            self.expect(&NS_BINDING)?;
            let prefix = self.captured_name(0);
            let uri = self.captured_string(1);
            self.check_namespace_binding(&prefix, &uri, offset);
            if !self.declared_prefixes.insert(prefix.clone()) {
                self.record(
                    ErrorCode::DuplicateNamespacePrefix,
                    offset,
                    format!("namespace prefix '{}' is declared more than once", prefix),
                );
            }
            self.context.bind(&prefix, &uri);
            return Ok(Some((DeclarationKind::Namespace { prefix, uri }, Setup)));
        }
        if self.eat(&DECL_OPTION)? {
            let lexical = self.captured_qname(0);
            let value = self.captured_string(1);
            let name = self.plain_name(lexical, offset);
            self.context.set_option(name.expanded(), value.clone());
            return Ok(Some((DeclarationKind::Option { name, value }, Declarations)));
        }
        if self.eat(&DECL_FT_OPTION)? {
            let options = self.match_options()?;
            if options.is_empty() {
                return Err(self.unexpected("'using'"));
            }
            self.context.ft_options = Some(options.clone());
            return Ok(Some((DeclarationKind::FtOption(options), Setup)));
        }
        if self.eat(&DECL_REVALIDATION)? {
            let mode = if self.eat(&STRICT)? {
                ValidationMode::Strict
            } else if self.eat(&LAX)? {
                ValidationMode::Lax
            } else {
                self.expect(&SKIP)?;
                ValidationMode::Skip
            };
            self.claim(Setter::Revalidation, ErrorCode::DuplicateRevalidation, offset);
            self.context.revalidation = Some(mode);
            return Ok(Some((DeclarationKind::Revalidation(mode), Setup)));
        }
        if self.eat(&DECL_CONTEXT_ITEM)? {
            return Ok(Some((self.context_item_decl(offset)?, Declarations)));
        }

        let annotations = self.annotations()?;
        let kind = if self.eat(&DECL_UPDATING)? {
            FunctionKind::Updating
        } else if self.eat(&DECL_SEQUENTIAL)? {
            FunctionKind::Sequential
        } else {
            self.eat(&DECL_SIMPLE)?;
            FunctionKind::Simple
        };
        if self.eat(&DECL_VARIABLE)? {
            let decl = self.variable_decl(annotations, offset)?;
            return Ok(Some((DeclarationKind::Variable(decl), Declarations)));
        }
        if self.eat(&DECL_FUNCTION)? {
            let decl = self.function_decl(annotations, kind, offset)?;
            return Ok(Some((DeclarationKind::Function(decl), Declarations)));
        }
        if !annotations.is_empty() || kind != FunctionKind::Simple {
            return Err(self.unexpected("'variable' or 'function'"));
        }
        Ok(None)
    }

    fn claim(&mut self, setter: Setter, code: ErrorCode, offset: usize) {
        if !self.context.claim(setter) {
            self.record(code, offset, format!("{:?} is declared more than once", setter));
        }
    }

    /// Prefix and URI restrictions shared by namespace declarations, module
    /// declarations and imports.
    pub(super) fn check_namespace_binding(&mut self, prefix: &str, uri: &str, offset: usize) {
        if is_reserved_prefix(prefix) {
            self.record(
                ErrorCode::ReservedNamespace,
                offset,
                format!("the prefix '{}' cannot be redeclared", prefix),
            );
        } else if uri == XML_NS || uri == XMLNS_NS {
            self.record(
                ErrorCode::ReservedNamespace,
                offset,
                format!("the namespace '{}' cannot be bound to '{}'", uri, prefix),
            );
        }
    }

    fn default_namespace(
        &mut self,
        kind: DefaultNamespaceKind,
        uri: String,
        offset: usize,
    ) -> DeclarationKind {
        let setter = match kind {
            DefaultNamespaceKind::Element => Setter::DefaultElementNamespace,
            DefaultNamespaceKind::Function => Setter::DefaultFunctionNamespace,
        };
        self.claim(setter, ErrorCode::DuplicateDefaultNamespace, offset);
        if uri == XML_NS || uri == XMLNS_NS {
            self.record(
                ErrorCode::ReservedNamespace,
                offset,
                format!("'{}' cannot be a default namespace", uri),
            );
        }
        match kind {
            DefaultNamespaceKind::Element => self.context.bind("", &uri),
            DefaultNamespaceKind::Function => self.context.set_default_function_namespace(uri.clone()),
        }
        DeclarationKind::DefaultNamespace { kind, uri }
    }

    fn decimal_format(&mut self, name: Option<QName>, offset: usize) -> PResult<DeclarationKind> {
        let mut properties: Vec<(DecimalFormatProperty, String)> = Vec::new();
        while self.eat(&DECIMAL_FORMAT_PROPERTY)? {
            let at = self.start();
            let property_name = self.captured_name(0);
            let value = self.captured_string(1);
            let Some(property) = DecimalFormatProperty::from_name(&property_name) else {
                return Err(self.fatal(
                    ErrorCode::Syntax,
                    at,
                    format!("unknown decimal-format property '{}'", property_name),
                ));
            };
            if properties.iter().any(|(p, _)| *p == property) {
                self.record(
                    ErrorCode::DuplicateDecimalFormatProperty,
                    at,
                    format!("decimal-format property '{}' is given more than once", property_name),
                );
                continue;
            }
            if property.is_single_char() && value.chars().count() != 1 {
                self.record(
                    ErrorCode::InvalidDecimalFormatValue,
                    at,
                    format!("decimal-format property '{}' must be a single character", property_name),
                );
            }
            properties.push((property, value));
        }
        let key = name.as_ref().map(QName::expanded);
        if !self.context.add_decimal_format(key, properties.clone()) {
            let label = name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "default".to_string());
            self.record(
                ErrorCode::DuplicateDecimalFormat,
                offset,
                format!("decimal format '{}' is declared more than once", label),
            );
        }
        Ok(DeclarationKind::DecimalFormat { name, properties })
    }

    /// `%name("literal", 1)` annotations in front of a declaration or inline
    /// function.
    pub(super) fn annotations(&mut self) -> PResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        let mut visibility = 0;
        while self.eat(&ANNOTATION)? {
            let offset = self.start();
            let lexical = self.captured_qname(0);
            let name = self.resolve_name(lexical, Some(ANNOTATIONS_NS.to_string()), offset);
            let mut values = Vec::new();
            if self.eat(&ANNOTATION_OPEN)? {
                loop {
                    if self.eat(&ANNOTATION_STRING)? {
                        values.push(Literal::String(self.captured_string(0)));
                    } else if self.eat(&ANNOTATION_NUMBER)? {
                        if let Some(n) = self.scan.captures().number(0) {
                            values.push(n);
                        }
                    } else {
                        return Err(self.unexpected("an annotation literal"));
                    }
                    if !self.eat(&ANNOTATION_COMMA)? {
                        break;
                    }
                }
                self.expect(&ANNOTATION_CLOSE)?;
            }
            if name.namespace.as_deref() == Some(ANNOTATIONS_NS)
                && matches!(name.local_part.as_str(), "public" | "private")
            {
                visibility += 1;
                if visibility > 1 {
                    self.record(
                        ErrorCode::DuplicateAnnotation,
                        offset,
                        "only one %public or %private annotation is allowed",
                    );
                }
            }
            annotations.push(Annotation { name, values });
        }
        Ok(annotations)
    }

    fn is_private(annotations: &[Annotation]) -> bool {
        annotations.iter().any(|a| {
            a.name.namespace.as_deref() == Some(ANNOTATIONS_NS) && a.name.local_part == "private"
        })
    }

    /// Library components must live in the module's target namespace.
    fn check_library_namespace(&mut self, name: &QName, what: &str, offset: usize) {
        if let Some(ns) = &self.library_namespace
            && name.namespace.as_deref() != Some(ns.as_str())
        {
            self.record(
                ErrorCode::ComponentOutsideModuleNamespace,
                offset,
                format!("{} '{}' is not in the library module namespace '{}'", what, name, ns),
            );
        }
    }

    fn variable_decl(&mut self, annotations: Vec<Annotation>, offset: usize) -> PResult<VariableDecl> {
        self.expect(&VAR_NAME)?;
        let at = self.start();
        let lexical = self.captured_qname(0);
        let name = self.plain_name(lexical, at);
        self.check_library_namespace(&name, "variable", at);
        let type_decl = if self.eat(&VAR_AS)? {
            Some(self.sequence_type(LexState::VarDecl)?)
        } else {
            None
        };
        let (value, external) = if self.eat(&VAR_ASSIGN)? {
            (Some(self.expr_single()?), false)
        } else if self.eat(&EXTERNAL)? {
            let default = if self.eat(&VAR_ASSIGN)? {
                Some(self.expr_single()?)
            } else {
                None
            };
            (default, true)
        } else {
            return Err(self.unexpected("':=' or 'external'"));
        };
        let signature = VariableSignature {
            name: name.clone(),
            type_decl: type_decl.clone(),
            external,
            public: !Self::is_private(&annotations),
        };
        if !self.context.declare_variable(signature) {
            self.record(
                ErrorCode::DuplicateVariable,
                offset,
                format!("variable ${} is declared more than once", name),
            );
        }
        Ok(VariableDecl {
            annotations,
            name,
            type_decl,
            value,
            external,
        })
    }

    fn context_item_decl(&mut self, offset: usize) -> PResult<DeclarationKind> {
        let item_type = if self.eat(&VAR_AS)? {
            Some(self.sequence_type(LexState::VarDecl)?)
        } else {
            None
        };
        let (value, external) = if self.eat(&VAR_ASSIGN)? {
            (Some(self.expr_single()?), false)
        } else if self.eat(&EXTERNAL)? {
            let default = if self.eat(&VAR_ASSIGN)? {
                Some(self.expr_single()?)
            } else {
                None
            };
            (default, true)
        } else {
            return Err(self.unexpected("':=' or 'external'"));
        };
        self.claim(Setter::ContextItem, ErrorCode::DuplicateContextItem, offset);
        self.context.context_item_type = item_type.clone();
        Ok(DeclarationKind::ContextItem {
            item_type,
            value,
            external,
        })
    }

    fn function_decl(
        &mut self,
        annotations: Vec<Annotation>,
        kind: FunctionKind,
        offset: usize,
    ) -> PResult<FunctionDecl> {
        let at = self.start();
        let lexical = self.captured_qname(0);
        let name = self.function_name(lexical, at);
        if let Some(ns) = &name.namespace
            && is_reserved_function_namespace(ns)
        {
            self.record(
                ErrorCode::ReservedFunctionNamespace,
                at,
                format!("function {} is declared in the reserved namespace '{}'", name, ns),
            );
        }
        self.check_library_namespace(&name, "function", at);
        self.expect(&PARAMS_OPEN)?;
        let params = self.param_list()?;
        let return_type = if self.eat(&VAR_AS)? {
            Some(self.sequence_type(LexState::VarDecl)?)
        } else {
            None
        };
        let body = if self.eat(&EXTERNAL)? {
            None
        } else {
            self.expect(&BODY_OPEN)?;
            let body_offset = self.start();
            Some(self.function_body(kind == FunctionKind::Sequential, body_offset)?)
        };
        let signature = FunctionSignature {
            name: name.clone(),
            params: params.iter().map(|p| p.type_decl.clone()).collect(),
            return_type: return_type.clone(),
            kind,
            external: body.is_none(),
            public: !Self::is_private(&annotations),
        };
        if !self.context.declare_function(signature) {
            self.record(
                ErrorCode::DuplicateFunction,
                offset,
                format!("function {}#{} is declared more than once", name, params.len()),
            );
        }
        Ok(FunctionDecl {
            annotations,
            kind,
            name,
            params,
            return_type,
            body,
        })
    }

    /// Parameters after the opening parenthesis, through the closing one.
    pub(super) fn param_list(&mut self) -> PResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        if self.eat(&PARAMS_CLOSE)? {
            return Ok(params);
        }
        let mut seen = HashSet::new();
        loop {
            self.expect(&VAR_NAME)?;
            let at = self.start();
            let lexical = self.captured_qname(0);
            let name = self.plain_name(lexical, at);
            if !seen.insert(name.expanded()) {
                self.record(
                    ErrorCode::DuplicateParameter,
                    at,
                    format!("parameter ${} appears more than once", name),
                );
            }
            let type_decl = if self.eat(&VAR_AS)? {
                Some(self.sequence_type(LexState::VarDecl)?)
            } else {
                None
            };
            params.push(Param { name, type_decl });
            if !self.eat(&PARAM_COMMA)? {
                break;
            }
        }
        self.expect(&PARAMS_CLOSE)?;
        Ok(params)
    }

    /// Function body after `{`, through the closing `}`. An empty body is
    /// the empty sequence.
    pub(super) fn function_body(&mut self, statements: bool, offset: usize) -> PResult<Expr> {
        if statements {
            return self.block_body(offset);
        }
        if self.eat(&RBRACE)? {
            return Ok(self.node(ExprKind::Sequence(Vec::new()), offset));
        }
        let body = self.expr()?;
        self.expect(&RBRACE)?;
        Ok(body)
    }

    fn at_hints(&mut self) -> PResult<Vec<String>> {
        let mut locations = Vec::new();
        if self.eat(&NS_AT)? {
            locations.push(self.captured_string(0));
            while self.eat(&NS_MORE)? {
                locations.push(self.captured_string(0));
            }
        }
        Ok(locations)
    }

    fn schema_import(&mut self, offset: usize) -> PResult<DeclarationKind> {
        let mut prefix = None;
        let mut default_element_namespace = false;
        if self.eat(&NS_PREFIX)? {
            prefix = Some(self.captured_name(0));
        } else if self.eat(&NS_DEFAULT_ELEMENT)? {
            default_element_namespace = true;
        }
        self.expect(&NS_URI)?;
        let namespace = self.captured_string(0);
        let locations = self.at_hints()?;
        if let Some(p) = &prefix {
            self.check_namespace_binding(p, &namespace, offset);
            if !self.declared_prefixes.insert(p.clone()) {
                self.record(
                    ErrorCode::DuplicateNamespacePrefix,
                    offset,
                    format!("namespace prefix '{}' is declared more than once", p),
                );
            }
            self.context.bind(p, &namespace);
        }
        if default_element_namespace {
            self.claim(
                Setter::DefaultElementNamespace,
                ErrorCode::DuplicateDefaultNamespace,
                offset,
            );
            self.context.bind("", &namespace);
        }
        if !self.context.add_schema_import(&namespace, locations.clone()) {
            self.record(
                ErrorCode::DuplicateSchemaImport,
                offset,
                format!("schema '{}' is imported more than once", namespace),
            );
        }
        Ok(DeclarationKind::SchemaImport(SchemaImport {
            prefix,
            default_element_namespace,
            namespace,
            locations,
        }))
    }

    fn module_import(&mut self, offset: usize) -> PResult<DeclarationKind> {
        let prefix = if self.eat(&NS_PREFIX)? {
            Some(self.captured_name(0))
        } else {
            None
        };
        self.expect(&NS_URI)?;
        let namespace = self.captured_string(0);
        let locations = self.at_hints()?;
        if namespace.is_empty() {
            self.record(
                ErrorCode::EmptyModuleNamespace,
                offset,
                "the target namespace of a module import must not be empty",
            );
        }
        if let Some(p) = &prefix {
            self.check_namespace_binding(p, &namespace, offset);
            if !self.declared_prefixes.insert(p.clone()) {
                self.record(
                    ErrorCode::DuplicateNamespacePrefix,
                    offset,
                    format!("namespace prefix '{}' is declared more than once", p),
                );
            }
            self.context.bind(p, &namespace);
        }
        let import = ModuleImport {
            prefix,
            namespace,
            locations,
        };
        if self.context.add_module_import(&import.namespace, import.locations.clone()) {
            self.load_import(&import, offset)?;
        } else {
            self.record(
                ErrorCode::DuplicateModuleImport,
                offset,
                format!("module '{}' is imported more than once", import.namespace),
            );
        }
        Ok(DeclarationKind::ModuleImport(import))
    }

    /// Loads an imported module through the resolver and merges its public
    /// signatures. A cycle or a broken imported module aborts the parse;
    /// a missing module is recorded.
    fn load_import(&mut self, import: &ModuleImport, offset: usize) -> PResult<()> {
        let Some(resolver) = self.resolver else {
            return Ok(());
        };
        log::debug!("{} imports module '{}'", self.module, import.namespace);
        let locations = match resolver.resolve(&import.namespace, &import.locations, &self.module) {
            Ok(locations) => locations,
            Err(e) => return self.import_failed(e, offset),
        };
        if locations.is_empty() {
            self.record(
                ErrorCode::ModuleNotFound,
                offset,
                format!("no module found for namespace '{}'", import.namespace),
            );
        }
        for location in locations {
            let parsed = match resolver.load(&location) {
                Ok(parsed) => parsed,
                Err(e) => {
                    self.import_failed(e, offset)?;
                    continue;
                }
            };
            if parsed.namespace() != Some(import.namespace.as_str()) {
                self.record(
                    ErrorCode::ModuleNotFound,
                    offset,
                    format!(
                        "module at '{}' does not have the target namespace '{}'",
                        location, import.namespace
                    ),
                );
                continue;
            }
            for name in self.context.import_signatures(&parsed.context, &import.namespace) {
                let (code, what) = if parsed.context.variable(&name.expanded()).is_some() {
                    (ErrorCode::DuplicateVariable, "variable")
                } else {
                    (ErrorCode::DuplicateFunction, "function")
                };
                self.record(
                    code,
                    offset,
                    format!("imported {} {} clashes with an existing declaration", what, name),
                );
            }
        }
        Ok(())
    }

    fn import_failed(&mut self, error: ResolveError, offset: usize) -> PResult<()> {
        match error {
            ResolveError::Cycle { chain } => Err(self.fatal(
                ErrorCode::CyclicImport,
                offset,
                format!("cyclic module import: {}", chain.join(" -> ")),
            )),
            ResolveError::Parse { location, error } => Err(self.fatal(
                error.code(),
                offset,
                format!("in imported module '{}': {}", location, error.diagnostic),
            )),
            other => {
                self.record(ErrorCode::ModuleNotFound, offset, other.to_string());
                Ok(())
            }
        }
    }
}
