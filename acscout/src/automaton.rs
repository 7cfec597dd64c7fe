/// The compiled, immutable Aho-Corasick automaton and its matching walk.
///
/// An [`Automaton`] is a handful of parallel arrays indexed by state id:
///
/// - `trans[state * 256 + byte]`: the next state, defined for every pair
/// - `dict_len[state]`: length of the pattern ending at `state`, or 0
/// - `pattern[state]`: index of that pattern
/// - `dict_link[state]`: next accepting state on the suffix chain, or the sentinel
///
/// Because the transition table already has failure chasing folded in, the scan loop
/// is one table lookup per input byte. Nothing in the automaton is mutated after
/// construction, so one instance can serve any number of threads at once:
///
/// ```rust,ignore
/// let automaton = Arc::new(builder.build());
/// inputs.par_iter().map(|text| automaton.find_all(text).len()).sum::<usize>();
/// ```
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pool::{MatchPool, PooledMatches};

/// Dense state identifier
pub type StateId = usize;

/// Reserved "no state" value terminating link chains
pub const NIL_STATE: StateId = 0;
/// Start state of every scan
pub const ROOT_STATE: StateId = 1;
/// Size of the byte alphabet; width of one transition row
pub const ALPHABET: usize = 256;

/// A single occurrence of a pattern, borrowing the matched bytes from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    start: usize,
    pattern: usize,
    bytes: &'a [u8],
}

impl<'a> Match<'a> {
    /// Offset of the first matched byte
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last matched byte
    pub fn end(&self) -> usize {
        self.start + self.bytes.len()
    }

    /// Length of the matched pattern
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Index of the pattern that matched
    pub fn pattern(&self) -> usize {
        self.pattern
    }

    /// The matched bytes, as a view into the scanned input
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Drops the borrowed view, keeping position and pattern
    pub fn to_record(&self) -> MatchRecord {
        MatchRecord {
            start: self.start,
            len: self.bytes.len(),
            pattern: self.pattern,
        }
    }
}

/// An owned match without a view into the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    pub start: usize,
    pub len: usize,
    pub pattern: usize,
}

impl MatchRecord {
    /// Offset one past the last matched byte
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Immutable multi-pattern matcher produced by [`crate::TrieBuilder::build`] or
/// [`crate::codec::decode`]
pub struct Automaton {
    trans: Vec<StateId>,
    dict_len: Vec<usize>,
    pattern: Vec<usize>,
    dict_link: Vec<StateId>,
    pool: MatchPool,
}

impl Automaton {
    /// Assembles an automaton from already validated arrays.
    pub(crate) fn from_parts(
        trans: Vec<StateId>,
        dict_len: Vec<usize>,
        pattern: Vec<usize>,
        dict_link: Vec<StateId>,
    ) -> Self {
        debug_assert_eq!(trans.len(), dict_len.len() * ALPHABET);
        debug_assert_eq!(dict_len.len(), pattern.len());
        debug_assert_eq!(dict_len.len(), dict_link.len());
        Self {
            trans,
            dict_len,
            pattern,
            dict_link,
            pool: MatchPool::new(),
        }
    }

    pub(crate) fn transitions(&self) -> &[StateId] {
        &self.trans
    }

    pub(crate) fn dict_lengths(&self) -> &[usize] {
        &self.dict_len
    }

    pub(crate) fn pattern_indices(&self) -> &[usize] {
        &self.pattern
    }

    pub(crate) fn dict_links(&self) -> &[StateId] {
        &self.dict_link
    }

    /// Runs the automaton over `input`, calling `on_match(end, len, pattern)` for every
    /// occurrence, where `end` is the offset of the last matched byte.
    ///
    /// Occurrences come in ascending `end` order. At one position the state's own
    /// pattern is reported first, then the dictionary chain by strictly decreasing
    /// length. Returning `false` from the callback stops the walk immediately.
    pub fn walk<I, F>(&self, input: &I, mut on_match: F)
    where
        I: AsRef<[u8]> + ?Sized,
        F: FnMut(usize, usize, usize) -> bool,
    {
        let mut s = ROOT_STATE;

        for (i, &c) in input.as_ref().iter().enumerate() {
            s = self.trans[s * ALPHABET + c as usize];

            let len = self.dict_len[s];
            if len != 0 && !on_match(i, len, self.pattern[s]) {
                return;
            }

            let mut u = self.dict_link[s];
            while u != NIL_STATE {
                if !on_match(i, self.dict_len[u], self.pattern[u]) {
                    return;
                }
                u = self.dict_link[u];
            }
        }
    }

    /// Collects every occurrence of every pattern, overlapping ones included
    pub fn find_all<'a, I>(&self, input: &'a I) -> Vec<Match<'a>>
    where
        I: AsRef<[u8]> + ?Sized,
    {
        let input = input.as_ref();
        let mut matches = Vec::with_capacity(input.len() >> 5);
        self.walk(input, |end, len, pattern| {
            matches.push(Self::make_match(input, end, len, pattern));
            true
        });
        matches
    }

    /// Returns the first occurrence the walk reports, if any
    pub fn find_first<'a, I>(&self, input: &'a I) -> Option<Match<'a>>
    where
        I: AsRef<[u8]> + ?Sized,
    {
        let input = input.as_ref();
        let mut first = None;
        self.walk(input, |end, len, pattern| {
            first = Some(Self::make_match(input, end, len, pattern));
            false
        });
        first
    }

    /// Returns true if any pattern occurs in `input`
    pub fn is_match<I>(&self, input: &I) -> bool
    where
        I: AsRef<[u8]> + ?Sized,
    {
        let mut found = false;
        self.walk(input, |_, _, _| {
            found = true;
            false
        });
        found
    }

    /// Like [`Automaton::find_all`], but collects owned records into a buffer borrowed
    /// from this automaton's pool. The buffer goes back to the pool when dropped.
    pub fn find_all_pooled<I>(&self, input: &I) -> PooledMatches<'_>
    where
        I: AsRef<[u8]> + ?Sized,
    {
        let mut buffer = self.pool.acquire();
        self.walk(input, |end, len, pattern| {
            buffer.push(MatchRecord {
                start: end + 1 - len,
                len,
                pattern,
            });
            true
        });
        buffer
    }

    /// The scratch-buffer pool used by [`Automaton::find_all_pooled`]
    pub fn pool(&self) -> &MatchPool {
        &self.pool
    }

    /// Number of states, including the sentinel
    pub fn state_count(&self) -> usize {
        self.dict_len.len()
    }

    /// Number of accepting states, i.e. distinct patterns that can be reported
    pub fn accepting_count(&self) -> usize {
        self.dict_len.iter().filter(|&&len| len > 0).count()
    }

    /// Length of the longest pattern, or 0 for an empty automaton
    pub fn max_pattern_len(&self) -> usize {
        self.dict_len.iter().copied().max().unwrap_or(0)
    }

    /// Approximate heap footprint of the matching tables in bytes
    pub fn heap_size(&self) -> usize {
        self.trans.len() * std::mem::size_of::<StateId>()
            + self.dict_len.len() * std::mem::size_of::<usize>()
            + self.pattern.len() * std::mem::size_of::<usize>()
            + self.dict_link.len() * std::mem::size_of::<StateId>()
    }

    fn make_match(input: &[u8], end: usize, len: usize, pattern: usize) -> Match<'_> {
        let start = end + 1 - len;
        Match {
            start,
            pattern,
            bytes: &input[start..=end],
        }
    }
}

impl Clone for Automaton {
    /// Copies the tables; the clone gets a fresh pool of its own.
    fn clone(&self) -> Self {
        Self::from_parts(
            self.trans.clone(),
            self.dict_len.clone(),
            self.pattern.clone(),
            self.dict_link.clone(),
        )
    }
}

impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        self.trans == other.trans
            && self.dict_len == other.dict_len
            && self.pattern == other.pattern
            && self.dict_link == other.dict_link
    }
}

impl Eq for Automaton {}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("states", &self.state_count())
            .field("accepting", &self.accepting_count())
            .field("heap_size", &self.heap_size())
            .finish()
    }
}
