//! Per-module static context: namespace bindings, prolog settings and the
//! signatures of global declarations.

use crate::config::ParserConfig;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use xqfront_ast::{
    BoundarySpace, ConstructionMode, DecimalFormatProperty, EmptyOrder, ExpandedName,
    FtMatchOptions, FunctionKind, OrderingMode, QName, SequenceType, ValidationMode,
};

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const FN_NS: &str = "http://www.w3.org/2005/xpath-functions";
pub const LOCAL_NS: &str = "http://www.w3.org/2005/xquery-local-functions";
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";
/// Namespace of unprefixed annotation names such as `%private`.
pub const ANNOTATIONS_NS: &str = "http://www.w3.org/2012/xquery";

const PREDECLARED: [(&str, &str); 6] = [
    ("xml", XML_NS),
    ("xs", XS_NS),
    ("xsi", XSI_NS),
    ("fn", FN_NS),
    ("local", LOCAL_NS),
    ("err", ERR_NS),
];

/// Namespaces in which user functions may not be declared.
pub fn is_reserved_function_namespace(ns: &str) -> bool {
    matches!(ns, XML_NS | XS_NS | XSI_NS | FN_NS)
}

/// Prolog settings that may be declared at most once per module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setter {
    BoundarySpace,
    DefaultCollation,
    BaseUri,
    Construction,
    Ordering,
    EmptyOrder,
    CopyNamespaces,
    DefaultElementNamespace,
    DefaultFunctionNamespace,
    ContextItem,
    Revalidation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSignature {
    pub name: QName,
    pub type_decl: Option<SequenceType>,
    pub external: bool,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: QName,
    pub params: Vec<Option<SequenceType>>,
    pub return_type: Option<SequenceType>,
    pub kind: FunctionKind,
    pub external: bool,
    pub public: bool,
}

impl FunctionSignature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Static context of one module.
///
/// Prefix bindings live in a single table. Direct element constructors open a
/// frame with [`StaticContext::push_frame`]; every [`StaticContext::bind`]
/// made while the frame is open records the binding it replaced, and
/// [`StaticContext::pop_frame`] restores those exactly. The empty prefix holds
/// the default element namespace.
#[derive(Debug, Clone)]
pub struct StaticContext {
    bindings: HashMap<String, String>,
    frames: Vec<Vec<(String, Option<String>)>>,
    default_function_namespace: String,
    pub boundary_space: BoundarySpace,
    pub construction: ConstructionMode,
    pub ordering: OrderingMode,
    pub empty_order: EmptyOrder,
    pub copy_namespaces_preserve: bool,
    pub copy_namespaces_inherit: bool,
    pub default_collation: Option<String>,
    pub base_uri: Option<String>,
    pub revalidation: Option<ValidationMode>,
    pub context_item_type: Option<SequenceType>,
    pub ft_options: Option<FtMatchOptions>,
    declared: HashSet<Setter>,
    options: IndexMap<ExpandedName, String>,
    decimal_formats: IndexMap<Option<ExpandedName>, Vec<(DecimalFormatProperty, String)>>,
    variables: IndexMap<ExpandedName, VariableSignature>,
    functions: IndexMap<(ExpandedName, usize), FunctionSignature>,
    module_imports: IndexMap<String, Vec<String>>,
    schema_imports: IndexMap<String, Vec<String>>,
}

impl Default for StaticContext {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl StaticContext {
    pub fn new(config: &ParserConfig) -> Self {
        let mut bindings: HashMap<String, String> = PREDECLARED
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect();
        for (prefix, uri) in &config.namespaces {
            bindings.insert(prefix.clone(), uri.clone());
        }
        Self {
            bindings,
            frames: Vec::new(),
            default_function_namespace: FN_NS.to_string(),
            boundary_space: config.boundary_space,
            construction: ConstructionMode::default(),
            ordering: OrderingMode::default(),
            empty_order: EmptyOrder::Least,
            copy_namespaces_preserve: true,
            copy_namespaces_inherit: true,
            default_collation: None,
            base_uri: config.source_uri.clone(),
            revalidation: None,
            context_item_type: None,
            ft_options: None,
            declared: HashSet::new(),
            options: IndexMap::new(),
            decimal_formats: IndexMap::new(),
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            module_imports: IndexMap::new(),
            schema_imports: IndexMap::new(),
        }
    }

    // Namespaces

    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .get(prefix)
            .map(String::as_str)
            .filter(|ns| !ns.is_empty())
    }

    pub fn default_element_namespace(&self) -> Option<&str> {
        self.resolve_prefix("")
    }

    pub fn default_function_namespace(&self) -> Option<&str> {
        Some(self.default_function_namespace.as_str()).filter(|ns| !ns.is_empty())
    }

    pub fn set_default_function_namespace(&mut self, uri: impl Into<String>) {
        self.default_function_namespace = uri.into();
    }

    /// Binds `prefix` (or the default element namespace for `""`). Inside an
    /// open frame the binding is undone by the matching `pop_frame`. An empty
    /// `uri` undeclares the prefix.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        let old = if uri.is_empty() && !prefix.is_empty() {
            self.bindings.remove(prefix)
        } else {
            self.bindings.insert(prefix.to_string(), uri.to_string())
        };
        if let Some(frame) = self.frames.last_mut() {
            frame.push((prefix.to_string(), old));
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for (prefix, old) in frame.into_iter().rev() {
            match old {
                Some(uri) => self.bindings.insert(prefix, uri),
                None => self.bindings.remove(&prefix),
            };
        }
    }

    /// Number of open namespace frames.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn in_scope_prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .filter(|(p, _)| !p.is_empty())
            .map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    // Prolog settings

    /// Marks `setter` as declared; false if it already was.
    pub fn claim(&mut self, setter: Setter) -> bool {
        self.declared.insert(setter)
    }

    pub fn is_declared(&self, setter: Setter) -> bool {
        self.declared.contains(&setter)
    }

    pub fn set_option(&mut self, name: ExpandedName, value: impl Into<String>) {
        self.options.insert(name, value.into());
    }

    pub fn option(&self, name: &ExpandedName) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (&ExpandedName, &str)> {
        self.options.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Registers a decimal format; `None` is the default format. False if one
    /// of that name already exists.
    pub fn add_decimal_format(
        &mut self,
        name: Option<ExpandedName>,
        properties: Vec<(DecimalFormatProperty, String)>,
    ) -> bool {
        if self.decimal_formats.contains_key(&name) {
            return false;
        }
        self.decimal_formats.insert(name, properties);
        true
    }

    pub fn decimal_format(
        &self,
        name: Option<&ExpandedName>,
    ) -> Option<&[(DecimalFormatProperty, String)]> {
        self.decimal_formats
            .get(&name.cloned())
            .map(Vec::as_slice)
    }

    // Global declarations

    /// False if a variable of the same expanded name exists.
    pub fn declare_variable(&mut self, signature: VariableSignature) -> bool {
        let key = signature.name.expanded();
        if self.variables.contains_key(&key) {
            return false;
        }
        self.variables.insert(key, signature);
        true
    }

    /// False if a function of the same expanded name and arity exists.
    pub fn declare_function(&mut self, signature: FunctionSignature) -> bool {
        let key = (signature.name.expanded(), signature.arity());
        if self.functions.contains_key(&key) {
            return false;
        }
        self.functions.insert(key, signature);
        true
    }

    pub fn variable(&self, name: &ExpandedName) -> Option<&VariableSignature> {
        self.variables.get(name)
    }

    pub fn function(&self, name: &ExpandedName, arity: usize) -> Option<&FunctionSignature> {
        self.functions.get(&(name.clone(), arity))
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableSignature> {
        self.variables.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions.values()
    }

    /// False if the namespace was already imported.
    pub fn add_module_import(&mut self, namespace: &str, locations: Vec<String>) -> bool {
        if self.module_imports.contains_key(namespace) {
            return false;
        }
        self.module_imports.insert(namespace.to_string(), locations);
        true
    }

    pub fn module_imports(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.module_imports
            .iter()
            .map(|(ns, locs)| (ns.as_str(), locs.as_slice()))
    }

    /// False if the namespace was already imported.
    pub fn add_schema_import(&mut self, namespace: &str, locations: Vec<String>) -> bool {
        if self.schema_imports.contains_key(namespace) {
            return false;
        }
        self.schema_imports.insert(namespace.to_string(), locations);
        true
    }

    pub fn schema_imports(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.schema_imports
            .iter()
            .map(|(ns, locs)| (ns.as_str(), locs.as_slice()))
    }

    /// Copies the public variables and functions of `namespace` from an
    /// imported module's context. Returns the names that clashed with
    /// existing declarations.
    pub fn import_signatures(&mut self, other: &StaticContext, namespace: &str) -> Vec<QName> {
        let mut conflicts = Vec::new();
        let in_namespace = |name: &QName| name.namespace.as_deref() == Some(namespace);
        for var in other.variables().filter(|v| v.public && in_namespace(&v.name)) {
            if !self.declare_variable(var.clone()) {
                conflicts.push(var.name.clone());
            }
        }
        for func in other.functions().filter(|f| f.public && in_namespace(&f.name)) {
            if !self.declare_function(func.clone()) {
                conflicts.push(func.name.clone());
            }
        }
        conflicts
    }
}
