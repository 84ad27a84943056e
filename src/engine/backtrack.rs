// This is the naive reference matcher. It executes the same NFA as the PikeVM,
// but by exploring one path at a time in priority order, the way a classical
// backtracking engine does.
//
// It retains worst case `O(mn)` time per start position by keeping track of
// the `(state, offset)` pairs it has visited using a bitmap. Once a pair is
// visited, every continuation from it has been explored, so revisiting it
// through a lower priority path can never produce anything new. The visited
// set is cleared for every start position, which makes an unanchored search
// `O(mn^2)`. That is fine for the tiny haystacks this engine is used on, and
// keeps each start position independent of the others.

use crate::{
    engine::{
        nfa::{State, StateID, NFA},
        Anchor, MatchKind,
    },
    int::{NonMaxUsize, U32},
};

type Bits = u32;
const BIT_SIZE: usize = 32;

/// A backtracking matching engine.
#[derive(Clone, Debug)]
pub(crate) struct Backtracker {
    nfa: NFA,
}

impl Backtracker {
    pub(crate) fn new(nfa: NFA) -> Backtracker {
        Backtracker { nfa }
    }

    /// Run a search over the entire haystack. Start positions are tried from
    /// left to right and the first one that produces a match wins.
    ///
    /// Under leftmost-first semantics, the first path (in priority order)
    /// that reaches a match wins. Under leftmost-longest semantics, every
    /// path from the winning start position is explored, and the first path
    /// reaching the longest end wins.
    ///
    /// `slots` may be shorter than the number of slots in the NFA.
    pub(crate) fn search(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        anchor: Anchor,
        kind: MatchKind,
        slots: &mut [Option<NonMaxUsize>],
    ) -> bool {
        assert!(
            slots.len() <= self.nfa.slot_len(),
            "got {} slots, but regex only has {}",
            slots.len(),
            self.nfa.slot_len(),
        );
        cache.setup_search(&self.nfa, haystack.len(), slots.len());
        let last_start = match anchor {
            Anchor::Unanchored => haystack.len(),
            Anchor::Start | Anchor::Both => 0,
        };
        for start in 0..=last_start {
            cache.clear_visited();
            if self.backtrack(cache, haystack, start, anchor, kind, slots) {
                return true;
            }
        }
        false
    }

    fn backtrack(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        start: usize,
        anchor: Anchor,
        kind: MatchKind,
        slots: &mut [Option<NonMaxUsize>],
    ) -> bool {
        let mut best_end: Option<usize> = None;
        cache.jobs.push(Job::Inst { sid: self.nfa.start(), at: start });
        while let Some(job) = cache.jobs.pop() {
            match job {
                Job::Inst { sid, at } => {
                    let Some(end) = self.step(cache, haystack, sid, at, anchor)
                    else {
                        continue;
                    };
                    match kind {
                        MatchKind::LeftmostFirst => {
                            slots.copy_from_slice(&cache.caps);
                            return true;
                        }
                        MatchKind::LeftmostLongest => {
                            if best_end.map_or(true, |best| end > best) {
                                best_end = Some(end);
                                slots.copy_from_slice(&cache.caps);
                            }
                        }
                    }
                }
                Job::SaveRestore { slot, offset } => {
                    cache.caps[slot] = offset;
                }
            }
        }
        best_end.is_some()
    }

    /// Follow a single path from `sid` at `at` until it either dies or
    /// reaches a match. Alternatives are pushed on to the job stack. When a
    /// match is reached, its end offset is returned.
    fn step(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        mut sid: StateID,
        mut at: usize,
        anchor: Anchor,
    ) -> Option<usize> {
        loop {
            if cache.has_visited(sid, at) {
                return None;
            }
            match *self.nfa.state(sid) {
                State::Match => {
                    if anchor == Anchor::Both && at < haystack.len() {
                        return None;
                    }
                    return Some(at);
                }
                State::Fail => return None,
                ref state @ (State::Byte { .. } | State::Ranges { .. }) => {
                    sid = haystack.get(at).and_then(|&b| state.transition(b))?;
                    at += 1;
                }
                State::Goto { target, look } => {
                    if let Some(look) = look {
                        if !look.is_match(haystack, at) {
                            return None;
                        }
                    }
                    sid = target;
                }
                State::Splits { ref targets, reverse: false } => {
                    sid = *targets.first()?;
                    for &alt in targets[1..].iter().rev() {
                        cache.jobs.push(Job::Inst { sid: alt, at });
                    }
                }
                State::Splits { ref targets, reverse: true } => {
                    sid = *targets.last()?;
                    for &alt in targets[..targets.len() - 1].iter() {
                        cache.jobs.push(Job::Inst { sid: alt, at });
                    }
                }
                State::Capture { target, slot } => {
                    let slot = slot.as_usize();
                    if slot < cache.caps.len() {
                        // If this path doesn't work out, then the old offset
                        // is restored when the alternate job is popped.
                        let offset = cache.caps[slot];
                        cache.jobs.push(Job::SaveRestore { slot, offset });
                        cache.caps[slot] = NonMaxUsize::new(at);
                    }
                    sid = target;
                }
            }
        }
    }
}

/// Mutable scratch space used by the backtracker during a search.
#[derive(Clone, Debug)]
pub(crate) struct Cache {
    jobs: Vec<Job>,
    visited: Vec<Bits>,
    /// The number of offsets, including the end of the haystack, tracked per
    /// state in `visited`.
    stride: usize,
    /// The capture slots of the path currently being explored.
    caps: Vec<Option<NonMaxUsize>>,
}

impl Cache {
    pub(crate) fn new() -> Cache {
        Cache { jobs: vec![], visited: vec![], stride: 0, caps: vec![] }
    }

    fn setup_search(&mut self, nfa: &NFA, haystack_len: usize, slots: usize) {
        self.jobs.clear();
        self.stride = haystack_len + 1;
        let visited_len = (nfa.len() * self.stride + BIT_SIZE - 1) / BIT_SIZE;
        self.visited.resize(visited_len, 0);
        self.caps.clear();
        self.caps.resize(slots, None);
    }

    fn clear_visited(&mut self) {
        for v in self.visited.iter_mut() {
            *v = 0;
        }
    }

    /// Marks `(sid, at)` as visited and returns true if it was already
    /// visited.
    fn has_visited(&mut self, sid: StateID, at: usize) -> bool {
        let k = sid.as_usize() * self.stride + at;
        let k1 = k / BIT_SIZE;
        let k2 = (1 << (k & (BIT_SIZE - 1))) as Bits;
        if self.visited[k1] & k2 == 0 {
            self.visited[k1] |= k2;
            false
        } else {
            true
        }
    }
}

/// A job is an explicit unit of stack space in the backtracking engine.
///
/// The "normal" representation is a single state transition, which corresponds
/// to an NFA state and an offset in the haystack. However, the backtracking
/// engine must keep track of old capture group values. We use the explicit
/// stack to do it.
#[derive(Clone, Copy, Debug)]
enum Job {
    Inst { sid: StateID, at: usize },
    SaveRestore { slot: usize, offset: Option<NonMaxUsize> },
}
