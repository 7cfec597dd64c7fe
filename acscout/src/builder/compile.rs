use super::trie::Trie;
use crate::automaton::{StateId, ALPHABET, NIL_STATE, ROOT_STATE};

/// Flattens the linked trie into a total `states x 256` transition table.
///
/// Rows are filled in breadth-first `order`, so a state's failure target already has a
/// complete row: the state copies it and overwrites the bytes it has its own edges for.
/// This yields the same table as chasing failure links per (state, byte), in
/// O(states x 256). The sentinel row sends every byte to the root.
pub(crate) fn compile_transitions(trie: &Trie, order: &[StateId]) -> Vec<StateId> {
    let mut table = vec![ROOT_STATE; trie.len() * ALPHABET];

    for &s in order {
        let row = s * ALPHABET;
        if s != ROOT_STATE {
            let fail_row = trie.states[s].fail * ALPHABET;
            table.copy_within(fail_row..fail_row + ALPHABET, row);
        }
        for (&c, &t) in &trie.states[s].trans {
            table[row + c as usize] = t;
        }
    }

    debug_assert!(table[ALPHABET..].iter().all(|&t| t != NIL_STATE));
    table
}
