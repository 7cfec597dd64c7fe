use std::collections::VecDeque;

use super::trie::Trie;
use crate::automaton::{StateId, NIL_STATE, ROOT_STATE};

/// Computes the failure function breadth-first and returns the visit order.
///
/// The root keeps the sentinel as its failure link. Every other state fails to the
/// longest proper suffix of its string that is also a trie prefix. The returned order
/// has every state after its failure target, which the compiler relies on.
pub(crate) fn compute_fail_links(trie: &mut Trie) -> Vec<StateId> {
    let mut order = Vec::with_capacity(trie.len());
    let mut queue = VecDeque::from([ROOT_STATE]);

    while let Some(s) = queue.pop_front() {
        order.push(s);
        let children: Vec<(u8, StateId)> =
            trie.states[s].trans.iter().map(|(&c, &t)| (c, t)).collect();

        for (c, t) in children {
            queue.push_back(t);

            let mut fail = trie.states[s].fail;
            let target = loop {
                if fail == NIL_STATE {
                    break ROOT_STATE;
                }
                if let Some(next) = trie.transition(fail, c) {
                    break next;
                }
                fail = trie.states[fail].fail;
            };
            trie.states[t].fail = target;
        }
    }

    order
}

/// Points each state at the nearest accepting state on its failure chain.
///
/// Walking `order` (from [`compute_fail_links`]) guarantees a state's failure target has
/// its own link already, so each state either takes its failure target directly or
/// inherits that target's link instead of re-walking the whole chain.
pub(crate) fn compute_dict_links(trie: &mut Trie, order: &[StateId]) {
    for &s in order {
        if s == ROOT_STATE {
            continue;
        }
        let fail = trie.states[s].fail;
        trie.states[s].dict_link = if trie.states[fail].is_accepting() {
            fail
        } else {
            trie.states[fail].dict_link
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(trie: &mut Trie, pattern: &[u8], index: usize) -> StateId {
        let mut s = ROOT_STATE;
        for &c in pattern {
            s = trie.child_or_insert(s, c);
        }
        trie.states[s].dict_len = pattern.len();
        trie.states[s].pattern = index;
        s
    }

    fn state_for(trie: &Trie, bytes: &[u8]) -> StateId {
        bytes.iter().fold(ROOT_STATE, |s, &c| {
            trie.transition(s, c).unwrap_or(NIL_STATE)
        })
    }

    #[test]
    fn test_fail_links_classic_example() {
        let mut trie = Trie::new();
        for (i, p) in ["he", "she", "his", "hers"].iter().enumerate() {
            insert(&mut trie, p.as_bytes(), i);
        }
        let order = compute_fail_links(&mut trie);
        assert_eq!(order.len(), trie.len() - 1);
        assert_eq!(order[0], ROOT_STATE);

        assert_eq!(trie.states[ROOT_STATE].fail, NIL_STATE);
        assert_eq!(trie.states[state_for(&trie, b"h")].fail, ROOT_STATE);
        assert_eq!(
            trie.states[state_for(&trie, b"sh")].fail,
            state_for(&trie, b"h")
        );
        assert_eq!(
            trie.states[state_for(&trie, b"she")].fail,
            state_for(&trie, b"he")
        );
        assert_eq!(
            trie.states[state_for(&trie, b"hers")].fail,
            state_for(&trie, b"s")
        );
        assert_eq!(
            trie.states[state_for(&trie, b"his")].fail,
            state_for(&trie, b"s")
        );
    }

    #[test]
    fn test_order_visits_fail_target_first() {
        let mut trie = Trie::new();
        for (i, p) in ["abcab", "bca", "cab", "ab"].iter().enumerate() {
            insert(&mut trie, p.as_bytes(), i);
        }
        let order = compute_fail_links(&mut trie);
        let mut position = vec![usize::MAX; trie.len()];
        for (i, &s) in order.iter().enumerate() {
            position[s] = i;
        }
        for &s in order.iter().skip(1) {
            let fail = trie.states[s].fail;
            assert!(position[fail] < position[s]);
        }
    }

    #[test]
    fn test_dict_links_skip_non_accepting() {
        let mut trie = Trie::new();
        for (i, p) in ["he", "she", "his", "hers"].iter().enumerate() {
            insert(&mut trie, p.as_bytes(), i);
        }
        let order = compute_fail_links(&mut trie);
        compute_dict_links(&mut trie, &order);

        // she -> he is accepting
        assert_eq!(
            trie.states[state_for(&trie, b"she")].dict_link,
            state_for(&trie, b"he")
        );
        // hers fails to "s", which is not accepting, and "s" fails to root
        assert_eq!(trie.states[state_for(&trie, b"hers")].dict_link, NIL_STATE);
        assert_eq!(trie.states[ROOT_STATE].dict_link, NIL_STATE);
    }

    #[test]
    fn test_deep_pattern_is_iterative() {
        let mut trie = Trie::new();
        let long = vec![b'a'; 20_000];
        insert(&mut trie, &long, 0);
        insert(&mut trie, b"a", 1);
        let order = compute_fail_links(&mut trie);
        compute_dict_links(&mut trie, &order);

        let deepest = state_for(&trie, &long);
        assert_eq!(
            trie.states[deepest].fail,
            state_for(&trie, &long[..long.len() - 1])
        );
        assert_eq!(trie.states[deepest].dict_link, state_for(&trie, b"a"));
    }
}
