use std::collections::BTreeMap;

use crate::automaton::{StateId, NIL_STATE};

/// A construction-time trie state.
///
/// States live in the builder's arena and refer to each other by id. Forward transitions
/// are owned edges; `fail` and `dict_link` are plain indices into the same arena.
#[derive(Debug, Clone)]
pub(crate) struct State {
    /// Label of the edge from the parent
    pub value: u8,
    /// Parent id, kept for diagnostics only
    pub parent: StateId,
    /// Sparse forward transitions, ordered by byte
    pub trans: BTreeMap<u8, StateId>,
    /// Length of the pattern ending here, or 0
    pub dict_len: usize,
    /// Index of the pattern ending here; meaningful only when `dict_len > 0`
    pub pattern: usize,
    pub fail: StateId,
    pub dict_link: StateId,
}

impl State {
    fn new(value: u8, parent: StateId) -> Self {
        Self {
            value,
            parent,
            trans: BTreeMap::new(),
            dict_len: 0,
            pattern: 0,
            fail: NIL_STATE,
            dict_link: NIL_STATE,
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.dict_len > 0
    }
}

/// Arena of trie states addressed by dense id. Id 0 is the sentinel, id 1 the root.
#[derive(Debug, Clone)]
pub(crate) struct Trie {
    pub states: Vec<State>,
}

impl Trie {
    pub fn new() -> Self {
        // sentinel, then root
        Self {
            states: vec![State::new(0, NIL_STATE), State::new(0, NIL_STATE)],
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns the child of `from` on `byte`, creating it if absent.
    pub fn child_or_insert(&mut self, from: StateId, byte: u8) -> StateId {
        if let Some(&next) = self.states[from].trans.get(&byte) {
            return next;
        }
        let id = self.states.len();
        self.states.push(State::new(byte, from));
        self.states[from].trans.insert(byte, id);
        id
    }

    pub fn transition(&self, from: StateId, byte: u8) -> Option<StateId> {
        self.states[from].trans.get(&byte).copied()
    }

    /// Reconstructs the bytes spelled by the path from the root to `id`.
    pub fn path_to(&self, mut id: StateId) -> Vec<u8> {
        let mut bytes = Vec::new();
        while id > crate::automaton::ROOT_STATE {
            bytes.push(self.states[id].value);
            id = self.states[id].parent;
        }
        bytes.reverse();
        bytes
    }
}
