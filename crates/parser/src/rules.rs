//! The grammar's terminal rules: a pattern, the states it may match in, and
//! the state it leaves the scanner in.
//!
//! Several rules share a pattern with different masks or transitions; the
//! grammar code picks the one that fits its position.

use crate::config::Extension;
use crate::lexer::{LexState, StateSet};
use crate::pattern::{Next, Rule};

const E: StateSet = StateSet::EXPR;
const O: StateSet = StateSet::OPERATOR;
const C: StateSet = StateSet::CODE;
const D: StateSet = StateSet::DECLARE;
const NS: StateSet = StateSet::NAMESPACE_DECL;
const V: StateSet = StateSet::VAR_DECL;
const KT: StateSet = StateSet::KIND_TEST;
const OCC: StateSet = StateSet::OCCURRENCE;
const TH: StateSet = StateSet::THESAURUS;
const ANYWHERE: StateSet = StateSet::NON_MARKUP;

const TO_EXPR: Next = Next::Goto(LexState::Expression);
const TO_OPERATOR: Next = Next::Goto(LexState::Operator);
const TO_KIND_TEST: Next = Next::Goto(LexState::KindTest);
const TO_VAR_DECL: Next = Next::Goto(LexState::VarDecl);
const TO_NAMESPACE_DECL: Next = Next::Goto(LexState::NamespaceDecl);
const TO_DECLARE: Next = Next::Goto(LexState::Declare);
const STAY: Next = Next::Stay;

const fn rule(pattern: &'static str, states: StateSet, next: Next) -> Rule {
    Rule::new(pattern, states, next)
}

const fn ft(pattern: &'static str, states: StateSet, next: Next) -> Rule {
    Rule::new(pattern, states, next).ext(Extension::FullText)
}

const fn update(pattern: &'static str, states: StateSet, next: Next) -> Rule {
    Rule::new(pattern, states, next).ext(Extension::Update)
}

const fn script(pattern: &'static str, states: StateSet, next: Next) -> Rule {
    Rule::new(pattern, states, next).ext(Extension::Scripting)
}

// Module structure and prolog.
pub const VERSION: Rule = rule("xquery version %S", E, STAY);
pub const VERSION_ENCODING: Rule = rule("encoding %S", E, STAY);
pub const XQUERY_ENCODING: Rule = rule("xquery encoding %S", E, STAY);
pub const MODULE_NAMESPACE: Rule = rule("module namespace", E, TO_NAMESPACE_DECL);
pub const SEMICOLON: Rule = rule(";", ANYWHERE, TO_EXPR);
pub const DECLARE: Rule = rule("declare %^%N", E, TO_DECLARE);
pub const DECLARE_ANNOTATED: Rule = rule("declare %^%%", E, TO_DECLARE);
pub const IMPORT_SCHEMA: Rule = rule("import schema", E, TO_NAMESPACE_DECL);
pub const IMPORT_MODULE: Rule = rule("import module", E, TO_NAMESPACE_DECL);

pub const NS_BINDING: Rule = rule("%N = %S", NS, STAY);
pub const NS_PREFIX: Rule = rule("namespace %N =", NS, STAY);
pub const NS_DEFAULT_ELEMENT: Rule = rule("default element namespace", NS, STAY);
pub const NS_URI: Rule = rule("%S", NS, STAY);
pub const NS_AT: Rule = rule("at %S", NS, STAY);
pub const NS_MORE: Rule = rule(", %S", NS, STAY);

pub const DECL_BOUNDARY_SPACE: Rule = rule("boundary-space", D, STAY);
pub const DECL_DEFAULT_COLLATION: Rule = rule("default collation %S", D, STAY);
pub const DECL_BASE_URI: Rule = rule("base-uri %S", D, STAY);
pub const DECL_CONSTRUCTION: Rule = rule("construction", D, STAY);
pub const DECL_ORDERING: Rule = rule("ordering", D, STAY);
pub const DECL_EMPTY_ORDER: Rule = rule("default order empty", D, STAY);
pub const DECL_COPY_NAMESPACES: Rule = rule("copy-namespaces", D, STAY);
pub const DECL_DECIMAL_FORMAT: Rule = rule("decimal-format %Q", D, STAY);
pub const DECL_DEFAULT_DECIMAL_FORMAT: Rule = rule("default decimal-format", D, STAY);
pub const DECIMAL_FORMAT_PROPERTY: Rule = rule("%N = %S", D, STAY);
pub const DECL_NAMESPACE: Rule = rule("namespace", D, TO_NAMESPACE_DECL);
pub const DECL_DEFAULT_ELEMENT_NS: Rule = rule("default element namespace %S", D, STAY);
pub const DECL_DEFAULT_FUNCTION_NS: Rule = rule("default function namespace %S", D, STAY);
pub const DECL_OPTION: Rule = rule("option %Q %S", D, STAY);
pub const DECL_CONTEXT_ITEM: Rule = rule("context item", D, TO_VAR_DECL);
pub const DECL_VARIABLE: Rule = rule("variable", D, TO_VAR_DECL);
pub const DECL_FUNCTION: Rule = rule("function %Q", D, STAY);
pub const DECL_UPDATING: Rule = update("updating", D, STAY);
pub const DECL_SEQUENTIAL: Rule = script("sequential", D, STAY);
pub const DECL_SIMPLE: Rule = script("simple", D, STAY);
pub const DECL_REVALIDATION: Rule = update("revalidation", D, STAY);
pub const DECL_FT_OPTION: Rule = ft("ft-option", D, TO_OPERATOR);

pub const PRESERVE: Rule = rule("preserve", D, STAY);
pub const STRIP: Rule = rule("strip", D, STAY);
pub const NO_PRESERVE: Rule = rule("no-preserve", D, STAY);
pub const INHERIT: Rule = rule("inherit", D, STAY);
pub const NO_INHERIT: Rule = rule("no-inherit", D, STAY);
pub const DECL_COMMA: Rule = rule(",", D, STAY);
pub const ORDERED_MODE: Rule = rule("ordered", D, STAY);
pub const UNORDERED_MODE: Rule = rule("unordered", D, STAY);
pub const GREATEST: Rule = rule("greatest", D, STAY);
pub const LEAST: Rule = rule("least", D, STAY);
pub const STRICT: Rule = rule("strict", D, STAY);
pub const LAX: Rule = rule("lax", D, STAY);
pub const SKIP: Rule = rule("skip", D, STAY);

// Annotations, in the prolog and on inline functions.
pub const ANNOTATION: Rule = rule("%%%Q", D.union(E), STAY);
pub const ANNOTATION_OPEN: Rule = rule("(", D.union(E), STAY);
pub const ANNOTATION_STRING: Rule = rule("%S", D.union(E), STAY);
pub const ANNOTATION_NUMBER: Rule = rule("%D", D.union(E), STAY);
pub const ANNOTATION_COMMA: Rule = rule(",", D.union(E), STAY);
pub const ANNOTATION_CLOSE: Rule = rule(")", D.union(E), STAY);

// Variable, context item and function declarations.
pub const VAR_NAME: Rule = rule("$ %Q", V, STAY);
pub const VAR_AS: Rule = rule("as", V, TO_KIND_TEST);
pub const VAR_ASSIGN: Rule = rule(":=", V, TO_EXPR);
pub const EXTERNAL: Rule = rule("external", V, STAY);
pub const PARAMS_OPEN: Rule = rule("(", D.union(E), TO_VAR_DECL);
pub const PARAM_COMMA: Rule = rule(",", V, STAY);
pub const PARAMS_CLOSE: Rule = rule(")", V, STAY);
pub const BODY_OPEN: Rule = rule("{", V, TO_EXPR);

// Separators and brackets.
pub const COMMA: Rule = rule(",", C, TO_EXPR);
pub const LPAREN: Rule = rule("(", E, TO_EXPR);
pub const RPAREN: Rule = rule(")", C, TO_OPERATOR);
pub const LBRACE: Rule = rule("{", C, TO_EXPR);
pub const RBRACE: Rule = rule("}", C, TO_OPERATOR);
pub const PREDICATE_OPEN: Rule = rule("[", O, TO_EXPR);
pub const PREDICATE_CLOSE: Rule = rule("]", C, TO_OPERATOR);
pub const DYNAMIC_CALL: Rule = rule("(", O, TO_EXPR);
pub const ASSIGN: Rule = rule(":=", O, TO_EXPR);
pub const AS_TYPE: Rule = rule("as", O, TO_KIND_TEST);

// Binary operators.
pub const OR: Rule = rule("or", O, TO_EXPR);
pub const AND: Rule = rule("and", O, TO_EXPR);
pub const GENERAL_NE: Rule = rule("!=", O, TO_EXPR);
pub const GENERAL_LE: Rule = rule("<=", O, TO_EXPR);
pub const NODE_PRECEDES: Rule = rule("<<", O, TO_EXPR);
pub const GENERAL_LT: Rule = rule("<", O, TO_EXPR);
pub const GENERAL_GE: Rule = rule(">=", O, TO_EXPR);
pub const NODE_FOLLOWS: Rule = rule(">>", O, TO_EXPR);
pub const GENERAL_GT: Rule = rule(">", O, TO_EXPR);
pub const GENERAL_EQ: Rule = rule("=", O, TO_EXPR);
pub const VALUE_EQ: Rule = rule("eq", O, TO_EXPR);
pub const VALUE_NE: Rule = rule("ne", O, TO_EXPR);
pub const VALUE_LT: Rule = rule("lt", O, TO_EXPR);
pub const VALUE_LE: Rule = rule("le", O, TO_EXPR);
pub const VALUE_GT: Rule = rule("gt", O, TO_EXPR);
pub const VALUE_GE: Rule = rule("ge", O, TO_EXPR);
pub const NODE_IS: Rule = rule("is", O, TO_EXPR);
pub const TO: Rule = rule("to", O, TO_EXPR);
pub const PLUS: Rule = rule("+", O, TO_EXPR);
pub const MINUS: Rule = rule("-", O, TO_EXPR);
pub const MULTIPLY: Rule = rule("*", O, TO_EXPR);
pub const DIV: Rule = rule("div", O, TO_EXPR);
pub const IDIV: Rule = rule("idiv", O, TO_EXPR);
pub const MOD: Rule = rule("mod", O, TO_EXPR);
pub const UNION: Rule = rule("union", O, TO_EXPR);
pub const UNION_BAR: Rule = rule("|", O, TO_EXPR);
pub const INTERSECT: Rule = rule("intersect", O, TO_EXPR);
pub const EXCEPT: Rule = rule("except", O, TO_EXPR);
pub const INSTANCE_OF: Rule = rule("instance of", O, TO_KIND_TEST);
pub const TREAT_AS: Rule = rule("treat as", O, TO_KIND_TEST);
pub const CASTABLE_AS: Rule = rule("castable as", O, TO_KIND_TEST);
pub const CAST_AS: Rule = rule("cast as", O, TO_KIND_TEST);
pub const UNARY_MINUS: Rule = rule("-", E, STAY);
pub const UNARY_PLUS: Rule = rule("+", E, STAY);

// Paths.
pub const ROOT_DESCENDANTS: Rule = rule("//", E, TO_EXPR);
pub const ROOT: Rule = rule("/", E, TO_EXPR);
pub const DESCENDANTS_SEP: Rule = rule("//", O, TO_EXPR);
pub const SLASH_SEP: Rule = rule("/", O, TO_EXPR);
pub const AXIS: Rule = rule("%N ::", E, STAY);
pub const ABBREV_ATTRIBUTE: Rule = rule("@", E, STAY);
pub const PARENT: Rule = rule("..", E, TO_OPERATOR);
pub const CONTEXT_ITEM: Rule = rule(".", E, TO_OPERATOR);
pub const WILDCARD_PREFIX: Rule = rule("*:%N", E, TO_OPERATOR);
pub const WILDCARD_LOCAL: Rule = rule("%N:*", E, TO_OPERATOR);
pub const WILDCARD: Rule = rule("*", E, TO_OPERATOR);
pub const NAME_TEST: Rule = rule("%Q", E, TO_OPERATOR);

// Primary expressions.
pub const NUMBER: Rule = rule("%D", E, TO_OPERATOR);
pub const STRING: Rule = rule("%S", E, TO_OPERATOR);
pub const VARIABLE: Rule = rule("$ %Q", E, TO_OPERATOR);
pub const FUNCTION_CALL: Rule = rule("%Q (", E, TO_EXPR);
pub const NAMED_FUNCTION_REF: Rule = rule("%Q #%D", E, TO_OPERATOR);
pub const ARGUMENT_PLACEHOLDER: Rule = rule("?", E, TO_OPERATOR);
pub const INLINE_FUNCTION: Rule = rule("function %^(", E, STAY);
pub const PRAGMA_OPEN: Rule = rule("(# %Q", E, STAY);
pub const ORDERED: Rule = rule("ordered %^{", E, STAY);
pub const UNORDERED: Rule = rule("unordered %^{", E, STAY);
pub const VALIDATE: Rule = rule("validate %^{", E, STAY);
pub const VALIDATE_TYPE: Rule = rule("validate type %Q %^{", E, STAY);
pub const VALIDATE_MODE: Rule = rule("validate %N %^{", E, STAY);

// Keyword expressions.
pub const IF: Rule = rule("if %^(", E, STAY);
pub const THEN: Rule = rule("then", O, TO_EXPR);
pub const ELSE: Rule = rule("else", O, TO_EXPR);
pub const SOME: Rule = rule("some %^$", E, STAY);
pub const EVERY: Rule = rule("every %^$", E, STAY);
pub const SATISFIES: Rule = rule("satisfies", O, TO_EXPR);
pub const SWITCH: Rule = rule("switch %^(", E, STAY);
pub const TYPESWITCH: Rule = rule("typeswitch %^(", E, STAY);
pub const CASE: Rule = rule("case", O, TO_EXPR);
pub const TYPE_UNION: Rule = rule("|", O, TO_KIND_TEST);
pub const DEFAULT_RETURN: Rule = rule("default return", O, TO_EXPR);
pub const DEFAULT_VARIABLE: Rule = rule("default %^$", O, TO_EXPR);
pub const TRY: Rule = rule("try %^{", E, STAY);
pub const CATCH_LEGACY: Rule = rule("catch (", O, TO_EXPR);
pub const CATCH: Rule = rule("catch", O, TO_EXPR);

// FLWOR.
pub const FOR_TUMBLING: Rule = rule("for tumbling window %^$", C, TO_EXPR);
pub const FOR_SLIDING: Rule = rule("for sliding window %^$", C, TO_EXPR);
pub const FOR: Rule = rule("for %^$", C, TO_EXPR);
pub const LET_SCORE: Rule = ft("let score %^$", C, TO_EXPR);
pub const LET: Rule = rule("let %^$", C, TO_EXPR);
pub const COUNT: Rule = rule("count %^$", O, TO_EXPR);
pub const ALLOWING_EMPTY: Rule = rule("allowing empty", O, STAY);
pub const AT_VARIABLE: Rule = rule("at %^$", O, TO_EXPR);
pub const SCORE_VARIABLE: Rule = ft("score %^$", O, TO_EXPR);
pub const IN: Rule = rule("in", O, TO_EXPR);
pub const WHERE: Rule = rule("where", O, TO_EXPR);
pub const GROUP_BY: Rule = rule("group by", O, TO_EXPR);
pub const STABLE_ORDER_BY: Rule = rule("stable order by", O, TO_EXPR);
pub const ORDER_BY: Rule = rule("order by", O, TO_EXPR);
pub const ASCENDING: Rule = rule("ascending", O, STAY);
pub const DESCENDING: Rule = rule("descending", O, STAY);
pub const EMPTY_GREATEST: Rule = rule("empty greatest", O, STAY);
pub const EMPTY_LEAST: Rule = rule("empty least", O, STAY);
pub const COLLATION: Rule = rule("collation %S", O, STAY);
pub const RETURN: Rule = rule("return", O, TO_EXPR);
pub const WINDOW_START: Rule = rule("start", O, TO_EXPR);
pub const WINDOW_ONLY_END: Rule = rule("only end", O, TO_EXPR);
pub const WINDOW_END: Rule = rule("end", O, TO_EXPR);
pub const WINDOW_PREVIOUS: Rule = rule("previous %^$", C, TO_EXPR);
pub const WINDOW_NEXT: Rule = rule("next %^$", C, TO_EXPR);
pub const WINDOW_AT: Rule = rule("at %^$", C, TO_EXPR);
pub const WHEN: Rule = rule("when", C, TO_EXPR);

// Direct constructors.
pub const ELEMENT_OPEN: Rule = rule(
    "<%Q",
    E,
    Next::Enter {
        state: LexState::Tag,
        resume: LexState::Operator,
    },
);
pub const NESTED_ELEMENT_OPEN: Rule = rule("<%Q", StateSet::CONTENT, Next::Push(LexState::Tag));
pub const ATTRIBUTE_NAME: Rule = rule("%Q =", StateSet::TAG, STAY);
pub const ATTRIBUTE_QUOT_OPEN: Rule = rule("\"", StateSet::TAG, Next::Goto(LexState::AttrQuot));
pub const ATTRIBUTE_APOS_OPEN: Rule = rule("'", StateSet::TAG, Next::Goto(LexState::AttrApos));
pub const ATTRIBUTE_QUOT_CLOSE: Rule =
    rule("\"", StateSet::of(LexState::AttrQuot), Next::Goto(LexState::Tag));
pub const ATTRIBUTE_APOS_CLOSE: Rule =
    rule("'", StateSet::of(LexState::AttrApos), Next::Goto(LexState::Tag));
pub const START_TAG_CLOSE: Rule = rule(">", StateSet::TAG, Next::Goto(LexState::Content));
pub const EMPTY_TAG_CLOSE: Rule = rule("/>", StateSet::TAG, Next::Pop);
pub const END_TAG: Rule = rule("</%Q >", StateSet::CONTENT, Next::Pop);
pub const ENCLOSED_OPEN: Rule = rule(
    "{",
    StateSet::CONTENT.union(StateSet::ATTR),
    Next::Push(LexState::Expression),
);
pub const ENCLOSED_CLOSE: Rule = rule("}", C, Next::Pop);
pub const CDATA_OPEN: Rule = rule("<![CDATA[", StateSet::CONTENT, STAY);
pub const COMMENT_OPEN: Rule = rule("<!--", E, TO_OPERATOR);
pub const NESTED_COMMENT_OPEN: Rule = rule("<!--", StateSet::CONTENT, STAY);
pub const PI_OPEN: Rule = rule("<?%N", E, TO_OPERATOR);
pub const NESTED_PI_OPEN: Rule = rule("<?%N", StateSet::CONTENT, STAY);

// Computed constructors.
pub const COMP_DOCUMENT: Rule = rule("document %^{", E, STAY);
pub const COMP_ELEMENT_NAMED: Rule = rule("element %Q %^{", E, STAY);
pub const COMP_ELEMENT: Rule = rule("element %^{", E, STAY);
pub const COMP_ATTRIBUTE_NAMED: Rule = rule("attribute %Q %^{", E, STAY);
pub const COMP_ATTRIBUTE: Rule = rule("attribute %^{", E, STAY);
pub const COMP_TEXT: Rule = rule("text %^{", E, STAY);
pub const COMP_COMMENT: Rule = rule("comment %^{", E, STAY);
pub const COMP_PI_NAMED: Rule = rule("processing-instruction %N %^{", E, STAY);
pub const COMP_PI: Rule = rule("processing-instruction %^{", E, STAY);
pub const COMP_NAMESPACE_NAMED: Rule = rule("namespace %N %^{", E, STAY);
pub const COMP_NAMESPACE: Rule = rule("namespace %^{", E, STAY);

// Sequence types and kind tests.
pub const EMPTY_SEQUENCE: Rule = rule("empty-sequence ( )", KT, STAY);
pub const ITEM: Rule = rule("item ( )", KT, STAY);
pub const ANY_FUNCTION: Rule = rule("function ( * )", KT, STAY);
pub const FUNCTION_TEST: Rule = rule("function (", KT, STAY);
pub const TYPE_PAREN_OPEN: Rule = rule("(", KT, STAY);
pub const TYPE_NAME: Rule = rule("%Q", KT, STAY);
pub const KT_DOCUMENT: Rule = rule("document-node (", E.union(KT), TO_KIND_TEST);
pub const KT_ELEMENT: Rule = rule("element (", E.union(KT), TO_KIND_TEST);
pub const KT_ATTRIBUTE: Rule = rule("attribute (", E.union(KT), TO_KIND_TEST);
pub const KT_SCHEMA_ELEMENT: Rule = rule("schema-element (", E.union(KT), TO_KIND_TEST);
pub const KT_SCHEMA_ATTRIBUTE: Rule = rule("schema-attribute (", E.union(KT), TO_KIND_TEST);
pub const KT_PI: Rule = rule("processing-instruction (", E.union(KT), TO_KIND_TEST);
pub const KT_COMMENT: Rule = rule("comment (", E.union(KT), TO_KIND_TEST);
pub const KT_TEXT: Rule = rule("text (", E.union(KT), TO_KIND_TEST);
pub const KT_NAMESPACE_NODE: Rule = rule("namespace-node (", E.union(KT), TO_KIND_TEST);
pub const KT_NODE: Rule = rule("node (", E.union(KT), TO_KIND_TEST);
pub const KT_WILDCARD: Rule = rule("*", KT, STAY);
pub const KT_NAME: Rule = rule("%Q", KT, STAY);
pub const KT_NCNAME: Rule = rule("%N", KT, STAY);
pub const KT_STRING: Rule = rule("%S", KT, STAY);
pub const KT_COMMA: Rule = rule(",", KT, STAY);
pub const KT_NILLABLE: Rule = rule("?", KT, STAY);
pub const KT_AS: Rule = rule("as", KT, STAY);
pub const KT_CLOSE: Rule = rule(")", KT, STAY);
pub const OCCURS_OPTIONAL: Rule = rule("?", OCC, STAY);
pub const OCCURS_ZERO_OR_MORE: Rule = rule("*", OCC, STAY);
pub const OCCURS_ONE_OR_MORE: Rule = rule("+", OCC, STAY);

// Update facility.
pub const INSERT: Rule = update("insert node", E, TO_EXPR);
pub const INSERT_NODES: Rule = update("insert nodes", E, TO_EXPR);
pub const AS_FIRST_INTO: Rule = update("as first into", O, TO_EXPR);
pub const AS_LAST_INTO: Rule = update("as last into", O, TO_EXPR);
pub const INTO: Rule = update("into", O, TO_EXPR);
pub const AFTER: Rule = update("after", O, TO_EXPR);
pub const BEFORE: Rule = update("before", O, TO_EXPR);
pub const DELETE: Rule = update("delete node", E, TO_EXPR);
pub const DELETE_NODES: Rule = update("delete nodes", E, TO_EXPR);
pub const REPLACE_VALUE: Rule = update("replace value of node", E, TO_EXPR);
pub const REPLACE: Rule = update("replace node", E, TO_EXPR);
pub const WITH: Rule = update("with", O, TO_EXPR);
pub const RENAME: Rule = update("rename node", E, TO_EXPR);
pub const AS_NAME: Rule = update("as", O, TO_EXPR);
pub const COPY: Rule = update("copy %^$", E, TO_EXPR);
pub const MODIFY: Rule = update("modify", O, TO_EXPR);

// Scripting.
pub const BLOCK: Rule = script("block %^{", E, STAY);
pub const BLOCK_DECLARE: Rule = script("declare %^$", E, TO_EXPR);
pub const STATEMENT_SEPARATOR: Rule = script(";", C, TO_EXPR);
pub const ASSIGNMENT: Rule = script("$ %Q :=", E, TO_EXPR);
pub const SET: Rule = script("set %^$", E, TO_EXPR);
pub const WHILE: Rule = script("while %^(", E, STAY);
pub const EXIT_RETURNING: Rule = script("exit returning", E, TO_EXPR);
pub const EXIT_WITH: Rule = script("exit with", E, TO_EXPR);
pub const BREAK_LOOP: Rule = script("break loop", E, TO_OPERATOR);
pub const CONTINUE_LOOP: Rule = script("continue loop", E, TO_OPERATOR);

// Full text.
pub const FTCONTAINS: Rule = ft("ftcontains", O, TO_EXPR);
pub const CONTAINS_TEXT: Rule = ft("contains text", O, TO_EXPR);
pub const FTOR: Rule = ft("ftor", O, TO_EXPR);
pub const FTAND: Rule = ft("ftand", O, TO_EXPR);
pub const NOT_IN: Rule = ft("not in", O, TO_EXPR);
pub const FTNOT: Rule = ft("ftnot", E, STAY);
pub const FT_WORDS: Rule = ft("%S", E, TO_OPERATOR);
pub const FT_GROUP_OPEN: Rule = ft("(", E, TO_EXPR);
pub const ANY_WORD: Rule = ft("any word", O, STAY);
pub const ANY: Rule = ft("any", O, STAY);
pub const ALL_WORDS: Rule = ft("all words", O, STAY);
pub const ALL: Rule = ft("all", O, STAY);
pub const PHRASE: Rule = ft("phrase", O, STAY);
pub const OCCURS: Rule = ft("occurs", O, STAY);
pub const TIMES: Rule = ft("times", O, STAY);
pub const EXACTLY: Rule = ft("exactly", O, TO_EXPR);
pub const AT_LEAST: Rule = ft("at least", O, TO_EXPR);
pub const AT_MOST: Rule = ft("at most", O, TO_EXPR);
pub const FROM: Rule = ft("from", O, TO_EXPR);
pub const FT_TO: Rule = ft("to", O, TO_EXPR);
pub const FT_ORDERED: Rule = ft("ordered", O, STAY);
pub const FT_WINDOW: Rule = ft("window", O, TO_EXPR);
pub const DISTANCE: Rule = ft("distance", O, STAY);
pub const WORDS: Rule = ft("words", O, STAY);
pub const SENTENCES: Rule = ft("sentences", O, STAY);
pub const PARAGRAPHS: Rule = ft("paragraphs", O, STAY);
pub const SAME: Rule = ft("same", O, STAY);
pub const DIFFERENT: Rule = ft("different", O, STAY);
pub const SENTENCE: Rule = ft("sentence", O, STAY);
pub const PARAGRAPH: Rule = ft("paragraph", O, STAY);
pub const AT_START: Rule = ft("at start", O, STAY);
pub const AT_END: Rule = ft("at end", O, STAY);
pub const ENTIRE_CONTENT: Rule = ft("entire content", O, STAY);
pub const WEIGHT: Rule = ft("weight %^{", O, STAY);
pub const WITHOUT_CONTENT: Rule = ft("without content", O, TO_EXPR);
pub const USING: Rule = ft("using", O, STAY);
pub const CASE_INSENSITIVE: Rule = ft("case insensitive", O, STAY);
pub const CASE_SENSITIVE: Rule = ft("case sensitive", O, STAY);
pub const LOWERCASE: Rule = ft("lowercase", O, STAY);
pub const UPPERCASE: Rule = ft("uppercase", O, STAY);
pub const DIACRITICS_INSENSITIVE: Rule = ft("diacritics insensitive", O, STAY);
pub const DIACRITICS_SENSITIVE: Rule = ft("diacritics sensitive", O, STAY);
pub const STEMMING: Rule = ft("stemming", O, STAY);
pub const NO_STEMMING: Rule = ft("no stemming", O, STAY);
pub const WILDCARDS: Rule = ft("wildcards", O, STAY);
pub const NO_WILDCARDS: Rule = ft("no wildcards", O, STAY);
pub const LANGUAGE: Rule = ft("language %S", O, STAY);
pub const FT_EXTENSION_OPTION: Rule = ft("option %Q %S", O, STAY);
pub const NO_THESAURUS: Rule = ft("no thesaurus", O, STAY);
pub const THESAURUS: Rule = ft("thesaurus", O, Next::Goto(LexState::Thesaurus));
pub const NO_STOP_WORDS: Rule = ft("no stop words", O, STAY);
pub const STOP_WORDS_DEFAULT: Rule = ft("stop words default", O, STAY);
pub const STOP_WORDS_AT: Rule = ft("stop words at %S", O, STAY);
pub const STOP_WORDS_LIST: Rule = ft("stop words (", O, STAY);
pub const STOP_WORDS_UNION: Rule = ft("union", O, STAY);
pub const STOP_WORDS_EXCEPT: Rule = ft("except", O, STAY);
pub const FT_LIST_AT: Rule = ft("at %S", O, STAY);
pub const FT_LIST_OPEN: Rule = ft("(", O, STAY);
pub const FT_LIST_STRING: Rule = ft("%S", O, STAY);
pub const FT_LIST_COMMA: Rule = ft(",", O, STAY);
pub const FT_LIST_CLOSE: Rule = ft(")", O, STAY);

pub const THESAURUS_DEFAULT: Rule = ft("default", TH, STAY);
pub const THESAURUS_AT: Rule = ft("at %S", TH, STAY);
pub const THESAURUS_OPEN: Rule = ft("(", TH, STAY);
pub const THESAURUS_COMMA: Rule = ft(",", TH, STAY);
pub const THESAURUS_CLOSE: Rule = ft(")", TH, STAY);
pub const RELATIONSHIP: Rule = ft("relationship %S", TH, STAY);
pub const LITERAL_EXACTLY: Rule = ft("exactly %D", TH, STAY);
pub const LITERAL_AT_LEAST: Rule = ft("at least %D", TH, STAY);
pub const LITERAL_AT_MOST: Rule = ft("at most %D", TH, STAY);
pub const LITERAL_FROM: Rule = ft("from %D to %D", TH, STAY);
pub const LEVELS: Rule = ft("levels", TH, STAY);
