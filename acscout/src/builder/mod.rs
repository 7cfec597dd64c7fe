/// Construction of Aho-Corasick automata.
///
/// Building happens in four steps, all driven by [`TrieBuilder`]:
///
/// 1. **Insertion**: each pattern is threaded into a byte trie, sharing prefixes with
///    patterns inserted before it. The state where a pattern ends is marked accepting.
/// 2. **Failure links**: a breadth-first pass gives every state the longest proper suffix
///    of its string that is also a prefix in the trie.
/// 3. **Dictionary links**: each state points at the nearest accepting state on its
///    failure chain, so nested matches ("he" inside "she") can be reported without
///    re-reading the input.
/// 4. **Compilation**: failure chasing is simulated once per (state, byte) and baked into
///    a dense transition table.
///
/// ```rust,ignore
/// let mut builder = TrieBuilder::new();
/// builder.add_strings(["he", "she", "his", "hers"]);
/// let automaton = builder.build();
///
/// for m in automaton.find_all("ushers") {
///     println!("{} at {}", m.pattern(), m.start());
/// }
/// ```
///
/// `build` consumes the builder. The trie arena is dropped once the flat arrays exist,
/// and a builder cannot be extended after its automaton has been produced.
mod compile;
mod links;
mod trie;

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::automaton::{Automaton, StateId, ROOT_STATE};
use crate::errors::AcResult;
use crate::loader;
use trie::Trie;

/// Accumulates patterns and compiles them into an [`Automaton`]
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    trie: Trie,
    num_patterns: usize,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    /// Creates a builder holding only the sentinel and root states
    pub fn new() -> Self {
        Self {
            trie: Trie::new(),
            num_patterns: 0,
        }
    }

    /// Adds a byte pattern. Its index is the number of patterns added before it.
    ///
    /// Empty patterns are rejected: nothing is inserted and no index is consumed.
    ///
    /// Adding a pattern that is already present reuses its terminal state and overwrites
    /// its index with the new one; the counter still advances, so the earlier index is
    /// never reported.
    pub fn add_pattern(&mut self, pattern: impl AsRef<[u8]>) -> &mut Self {
        let pattern = pattern.as_ref();
        if pattern.is_empty() {
            warn!("Ignoring empty pattern");
            return self;
        }

        let mut s: StateId = ROOT_STATE;
        for &c in pattern {
            s = self.trie.child_or_insert(s, c);
        }

        if self.trie.states[s].is_accepting() {
            debug!(
                "Pattern {} duplicates pattern {} ({:?}); the earlier index is superseded",
                self.num_patterns,
                self.trie.states[s].pattern,
                String::from_utf8_lossy(&self.trie.path_to(s))
            );
        }
        let state = &mut self.trie.states[s];
        state.dict_len = pattern.len();
        state.pattern = self.num_patterns;
        self.num_patterns += 1;

        self
    }

    /// Adds several byte patterns in order
    pub fn add_patterns<I, P>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        for pattern in patterns {
            self.add_pattern(pattern);
        }
        self
    }

    /// Adds a string pattern; matching happens over its UTF-8 bytes
    pub fn add_string(&mut self, pattern: &str) -> &mut Self {
        self.add_pattern(pattern.as_bytes())
    }

    /// Adds several string patterns in order
    pub fn add_strings<I, S>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.add_string(pattern.as_ref());
        }
        self
    }

    /// Loads hex-encoded byte patterns from a file, one per line
    pub fn load_patterns(&mut self, path: &Path) -> AcResult<&mut Self> {
        loader::load_patterns(self, path)?;
        Ok(self)
    }

    /// Loads literal string patterns from a file, one per line
    pub fn load_strings(&mut self, path: &Path) -> AcResult<&mut Self> {
        loader::load_strings(self, path)?;
        Ok(self)
    }

    /// Number of indices handed out so far, including any superseded by duplicates
    pub fn pattern_count(&self) -> usize {
        self.num_patterns
    }

    /// Number of states in the trie, including the sentinel
    pub fn state_count(&self) -> usize {
        self.trie.len()
    }

    /// Links and compiles the trie into an immutable automaton
    pub fn build(mut self) -> Automaton {
        let started = Instant::now();

        let order = links::compute_fail_links(&mut self.trie);
        links::compute_dict_links(&mut self.trie, &order);
        let trans = compile::compile_transitions(&self.trie, &order);

        let states = self.trie.states;
        let dict_len = states.iter().map(|s| s.dict_len).collect();
        let pattern = states.iter().map(|s| s.pattern).collect();
        let dict_link = states.iter().map(|s| s.dict_link).collect();

        let automaton = Automaton::from_parts(trans, dict_len, pattern, dict_link);

        info!(
            "Built automaton: {} patterns, {} states",
            self.num_patterns,
            automaton.state_count()
        );
        debug!("Automaton build took {:?}", started.elapsed());

        automaton
    }
}
