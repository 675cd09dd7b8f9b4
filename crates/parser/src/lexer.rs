//! Lexical states and the state stack used for expressions nested in markup.

/// The scanning context. It decides which rules may match and whether
/// whitespace and comments are skipped implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexState {
    /// Before an operand: keywords such as `for`, `if` or `element` start
    /// expressions.
    Expression,
    /// After an operand: the same spellings are operators or clause keywords.
    Operator,
    /// After `declare`.
    Declare,
    Tag,
    Content,
    AttrApos,
    AttrQuot,
    KindTest,
    NamespaceDecl,
    VarDecl,
    Occurrence,
    Thesaurus,
}

impl LexState {
    pub const ALL: [LexState; 12] = [
        LexState::Expression,
        LexState::Operator,
        LexState::Declare,
        LexState::Tag,
        LexState::Content,
        LexState::AttrApos,
        LexState::AttrQuot,
        LexState::KindTest,
        LexState::NamespaceDecl,
        LexState::VarDecl,
        LexState::Occurrence,
        LexState::Thesaurus,
    ];

    pub const fn bit(self) -> u16 {
        1 << self as u16
    }

    pub fn is_markup(self) -> bool {
        matches!(
            self,
            LexState::Tag | LexState::Content | LexState::AttrApos | LexState::AttrQuot
        )
    }

    pub fn skips_comments(self) -> bool {
        !self.is_markup()
    }

    /// Whitespace is significant in element content and attribute values.
    pub fn skips_whitespace(self) -> bool {
        !matches!(
            self,
            LexState::Content | LexState::AttrApos | LexState::AttrQuot
        )
    }
}

/// A set of lexical states, as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSet(u16);

impl StateSet {
    pub const NONE: StateSet = StateSet(0);
    pub const EXPR: StateSet = StateSet::of(LexState::Expression);
    pub const OPERATOR: StateSet = StateSet::of(LexState::Operator);
    /// Expression or operator position.
    pub const CODE: StateSet = StateSet::EXPR.with(LexState::Operator);
    pub const DECLARE: StateSet = StateSet::of(LexState::Declare);
    pub const TAG: StateSet = StateSet::of(LexState::Tag);
    pub const CONTENT: StateSet = StateSet::of(LexState::Content);
    pub const ATTR: StateSet = StateSet::of(LexState::AttrApos).with(LexState::AttrQuot);
    pub const KIND_TEST: StateSet = StateSet::of(LexState::KindTest);
    pub const NAMESPACE_DECL: StateSet = StateSet::of(LexState::NamespaceDecl);
    pub const VAR_DECL: StateSet = StateSet::of(LexState::VarDecl);
    pub const OCCURRENCE: StateSet = StateSet::of(LexState::Occurrence);
    pub const THESAURUS: StateSet = StateSet::of(LexState::Thesaurus);
    /// Every state that is not inside markup.
    pub const NON_MARKUP: StateSet = StateSet(
        StateSet::CODE.0
            | StateSet::DECLARE.0
            | StateSet::KIND_TEST.0
            | StateSet::NAMESPACE_DECL.0
            | StateSet::VAR_DECL.0
            | StateSet::OCCURRENCE.0
            | StateSet::THESAURUS.0,
    );

    pub const fn of(state: LexState) -> StateSet {
        StateSet(state.bit())
    }

    pub const fn with(self, state: LexState) -> StateSet {
        StateSet(self.0 | state.bit())
    }

    pub const fn union(self, other: StateSet) -> StateSet {
        StateSet(self.0 | other.0)
    }

    pub const fn contains(self, state: LexState) -> bool {
        self.0 & state.bit() != 0
    }
}

/// The active state plus the states saved by nested enclosed expressions
/// and element constructors.
#[derive(Debug, Clone)]
pub struct Lexer {
    state: LexState,
    saved: Vec<LexState>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(LexState::Expression)
    }
}

impl Lexer {
    pub fn new(state: LexState) -> Self {
        Self {
            state,
            saved: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> LexState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn goto(&mut self, state: LexState) {
        if state != self.state {
            log::trace!("lexer {:?} -> {:?}", self.state, state);
        }
        self.state = state;
    }

    /// Enters `state`; a later [`Lexer::pop`] resumes in `resume`.
    pub fn push(&mut self, state: LexState, resume: LexState) {
        log::trace!("lexer push {:?}, resume {:?}", state, resume);
        self.saved.push(resume);
        self.state = state;
    }

    /// Returns to the saved state. An unbalanced pop falls back to
    /// [`LexState::Operator`], which is where a closed construct leaves the
    /// scanner outside markup.
    pub fn pop(&mut self) {
        let state = self.saved.pop().unwrap_or(LexState::Operator);
        log::trace!("lexer pop {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_sets() {
        assert!(StateSet::CODE.contains(LexState::Expression));
        assert!(StateSet::CODE.contains(LexState::Operator));
        assert!(!StateSet::CODE.contains(LexState::Tag));
        assert!(StateSet::ATTR.contains(LexState::AttrQuot));
        for state in LexState::ALL {
            assert_eq!(StateSet::NON_MARKUP.contains(state), !state.is_markup());
        }
        assert!(!StateSet::NONE.contains(LexState::Expression));
    }

    #[test]
    fn test_skip_flags() {
        assert!(LexState::Expression.skips_comments());
        assert!(LexState::Tag.skips_whitespace());
        assert!(!LexState::Tag.skips_comments());
        assert!(!LexState::Content.skips_whitespace());
        assert!(!LexState::AttrApos.skips_whitespace());
    }

    #[test]
    fn test_push_pop_restores() {
        let mut lexer = Lexer::default();
        lexer.push(LexState::Tag, LexState::Operator);
        lexer.goto(LexState::Content);
        lexer.push(LexState::Expression, LexState::Content);
        assert_eq!(lexer.depth(), 2);
        lexer.pop();
        assert_eq!(lexer.state(), LexState::Content);
        lexer.pop();
        assert_eq!(lexer.state(), LexState::Operator);
        assert_eq!(lexer.depth(), 0);
    }
}
