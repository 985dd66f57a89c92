//! Shift-reduce dependency parser replaying the reference bank.
//!
//! State is `(stack, buffer, arcs, assigned)`, starting from `stack = [root]`
//! and `buffer = tokens`. Each step takes the first applicable transition in
//! this fixed order:
//!
//! 1. LEFT-ARC: un-assigned bank entry `(front, top)`: emit, pop `top`.
//! 2. RIGHT-ARC: un-assigned bank entry `(top, front)`: emit, shift `front`;
//!    a `question`/`punctuation` label ends the parse.
//! 3. REDUCE: `top` is already a dependent and the bank expects no more
//!    dependents of it among the remaining buffer tokens: pop. A head expects
//!    a dependent only under a label it has not produced yet.
//! 4. SHIFT: move `front` onto the stack.
//!
//! Otherwise the stack is popped (never below `root`) or the parse halts.
//! After every transition, the first main verb seen on top of the stack gets
//! a synthesized `root(root, verb)` arc.
//!
//! Every token is pushed once and popped at most once, so a parse of `n`
//! tokens takes at most `2n` transitions. Coverage is exactly the bank's: a
//! sentence with no matching entries yields an empty arc list, which callers
//! treat as "no structure", not as an error.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::arc::{DependencyArc, RelationLabel, ROOT};
use crate::bank::{lexical_key, EntryId, RelationBank};
use crate::lexicon::is_main_verb;
use crate::tokenizer::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "label", rename_all = "kebab-case")]
pub enum Transition {
    LeftArc(RelationLabel),
    RightArc(RelationLabel),
    Reduce,
    Shift,
    Pop,
}

/// Parser output: arcs in production order plus the transition trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parse {
    pub arcs: Vec<DependencyArc>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Root,
    Word(usize),
}

struct ParserState<'t> {
    tokens: &'t [Token],
    stack: Vec<Node>,
    buffer: VecDeque<usize>,
    arcs: Vec<DependencyArc>,
    assigned: HashSet<EntryId>,
    /// Token positions that are already the dependent of some arc.
    attached: HashSet<usize>,
    /// Labels each head position has already taken a dependent under.
    filled: HashMap<usize, HashSet<RelationLabel>>,
    has_root: bool,
    closed: bool,
}

impl<'t> ParserState<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            stack: vec![Node::Root],
            buffer: (0..tokens.len()).collect(),
            arcs: Vec::new(),
            assigned: HashSet::new(),
            attached: HashSet::new(),
            filled: HashMap::new(),
            has_root: false,
            closed: false,
        }
    }

    fn text(&self, node: Node) -> &'t str {
        match node {
            Node::Root => ROOT,
            Node::Word(i) => &self.tokens[i],
        }
    }

    fn top(&self) -> Node {
        self.stack.last().copied().unwrap_or(Node::Root)
    }

    fn is_terminal(&self) -> bool {
        self.closed || (self.buffer.is_empty() && self.stack.len() == 1)
    }

    fn emit(&mut self, id: EntryId, head: Node, dependent: usize, label: RelationLabel) {
        self.assigned.insert(id);
        self.attached.insert(dependent);
        if let Node::Word(h) = head {
            self.filled.entry(h).or_default().insert(label);
        }
        self.arcs.push(DependencyArc::new(
            self.text(head),
            self.tokens[dependent].as_str(),
            label,
        ));
    }

    fn synthesize_root(&mut self) {
        if self.has_root {
            return;
        }
        if let Node::Word(i) = self.top() {
            if is_main_verb(&self.tokens[i]) {
                self.arcs.push(DependencyArc::root(self.tokens[i].as_str()));
                self.attached.insert(i);
                self.has_root = true;
            }
        }
    }
}

pub struct DependencyParser<'b> {
    bank: &'b RelationBank,
}

impl Default for DependencyParser<'static> {
    fn default() -> Self {
        Self::new(RelationBank::reference())
    }
}

impl<'b> DependencyParser<'b> {
    pub fn new(bank: &'b RelationBank) -> Self {
        Self { bank }
    }

    pub fn parse(&self, tokens: &[Token]) -> Parse {
        let mut state = ParserState::new(tokens);
        let mut transitions = Vec::with_capacity(tokens.len() * 2);

        while !state.is_terminal() {
            let Some(transition) = self.step(&mut state) else {
                break;
            };
            tracing::trace!(?transition, stack = state.stack.len(), buffer = state.buffer.len(), "transition");
            transitions.push(transition);
            state.synthesize_root();
        }
        debug_assert!(transitions.len() <= 2 * tokens.len());

        for token in tokens.iter().filter(|t| !self.bank.covers(t)) {
            tracing::debug!(token = %token, "token not covered by relation bank");
        }

        Parse {
            arcs: state.arcs,
            transitions,
        }
    }

    /// Un-assigned bank entry `head → dependent`.
    fn available(&self, state: &ParserState<'_>, head: &str, dependent: &str) -> Option<(EntryId, RelationLabel)> {
        self.bank
            .lookup(head, dependent)
            .filter(|(id, _)| !state.assigned.contains(id))
    }

    /// Whether the bank still expects a dependent of `word` among the
    /// remaining buffer tokens, under a label `word` has not used yet.
    fn expects_dependent(&self, state: &ParserState<'_>, word: usize) -> bool {
        let filled = state.filled.get(&word);
        let remaining: HashSet<String> = state
            .buffer
            .iter()
            .map(|&b| lexical_key(&state.tokens[b]))
            .collect();
        self.bank
            .headed_by(&state.tokens[word])
            .any(|(id, entry)| {
                !state.assigned.contains(&id)
                    && !filled.is_some_and(|labels| labels.contains(&entry.label))
                    && remaining.contains(&entry.dependent)
            })
    }

    fn step(&self, state: &mut ParserState<'_>) -> Option<Transition> {
        let top = state.top();

        if let Some(&front) = state.buffer.front() {
            if let Node::Word(t) = top {
                if let Some((id, label)) = self.available(state, &state.tokens[front], &state.tokens[t]) {
                    state.emit(id, Node::Word(front), t, label);
                    state.stack.pop();
                    return Some(Transition::LeftArc(label));
                }
            }

            if let Some((id, label)) = self.available(state, state.text(top), &state.tokens[front]) {
                state.emit(id, top, front, label);
                state.buffer.pop_front();
                state.stack.push(Node::Word(front));
                if label.ends_clause() {
                    state.closed = true;
                }
                return Some(Transition::RightArc(label));
            }
        }

        if let Node::Word(t) = top {
            if state.attached.contains(&t) && !self.expects_dependent(state, t) {
                state.stack.pop();
                return Some(Transition::Reduce);
            }
        }

        if let Some(front) = state.buffer.pop_front() {
            state.stack.push(Node::Word(front));
            return Some(Transition::Shift);
        }

        if state.stack.len() > 1 {
            state.stack.pop();
            return Some(Transition::Pop);
        }
        None
    }
}
