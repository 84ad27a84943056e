use crate::{
    engine::{
        nfa::{State, StateID, NFA},
        Anchor, MatchKind,
    },
    int::{NonMaxUsize, U32},
};

/// A PikeVM searcher.
///
/// A PikeVM uses the standard Thompson NFA linear time search algorithm, but
/// augmented to support tracking the offsets of matching capture groups. This
/// one also supports leftmost-longest semantics and an anchor at both ends of
/// the haystack.
#[derive(Clone, Debug)]
pub(crate) struct PikeVM {
    nfa: NFA,
}

impl PikeVM {
    /// Create a new PikeVM searcher that uses the given NFA.
    pub(crate) fn new(nfa: NFA) -> PikeVM {
        PikeVM { nfa }
    }

    /// Return the underlying NFA used by this PikeVM.
    pub(crate) fn nfa(&self) -> &NFA {
        &self.nfa
    }

    /// Run a search over the entire haystack.
    ///
    /// Capturing group spans are written to `slots`, but only if requested.
    /// `slots` may be shorter than the number of slots in the NFA (it may
    /// even be empty), in which case any slot beyond its length is not
    /// reported. Whether or not a match is found never depends on the number
    /// of slots given.
    ///
    /// # Panics
    ///
    /// When `slots` is longer than the number of slots in the NFA.
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
        // Leftmost-longest always needs the start of each thread, in order to
        // know which threads can still beat the best match seen so far.
        let track = match kind {
            MatchKind::LeftmostFirst => slots.len(),
            MatchKind::LeftmostLongest => slots.len().max(2),
        };
        cache.setup_search(track);
        assert!(
            haystack.len() < core::usize::MAX,
            "byte slice lengths must be less than usize MAX",
        );

        let Cache {
            ref mut stack,
            ref mut curr,
            ref mut next,
            ref mut found,
        } = *cache;
        let found = &mut found[..track];
        let start_id = self.nfa().start();
        let anchored = anchor != Anchor::Unanchored;
        let mut matched = false;
        // Matches are delayed by one byte, so the search visits the position
        // at the end of the haystack too.
        let mut at = 0;
        loop {
            if curr.set.is_empty() {
                if matched {
                    break;
                }
                if anchored && at > 0 {
                    break;
                }
            }
            // Simulate a non-greedy '(?s:.)*?' prefix for unanchored
            // searches by adding the start state at every position until a
            // match is found.
            if !matched && (!anchored || at == 0) {
                let slots = next.slot_table.all_absent();
                self.epsilon_closure(
                    stack, slots, curr, haystack, at, start_id,
                );
            }
            if self.nexts(
                stack, curr, next, haystack, at, anchor, kind, matched, found,
            ) {
                matched = true;
            }
            if at >= haystack.len() {
                break;
            }
            core::mem::swap(curr, next);
            next.set.clear();
            at += 1;
        }
        if matched {
            slots.copy_from_slice(&found[..slots.len()]);
        }
        matched
    }

    /// Process the active states in 'curr' to find the states (written to
    /// 'next') we should process for the next byte in the haystack.
    ///
    /// When a match is recorded, the slots for that match state are copied
    /// to `found`. Under leftmost-first semantics, processing for 'curr'
    /// stops at the first match. Under leftmost-longest semantics, the first
    /// match in a step is recorded, threads that started after it are
    /// dropped and the remaining threads keep running in case they produce a
    /// longer match.
    ///
    /// `matched` indicates whether `found` already holds a match from a
    /// previous step. This returns true only when a match was recorded in
    /// this step.
    #[allow(clippy::too_many_arguments)]
    fn nexts(
        &self,
        stack: &mut Vec<FollowEpsilon>,
        curr: &mut ActiveStates,
        next: &mut ActiveStates,
        haystack: &[u8],
        at: usize,
        anchor: Anchor,
        kind: MatchKind,
        matched: bool,
        found: &mut [Option<NonMaxUsize>],
    ) -> bool {
        let ActiveStates { ref set, ref mut slot_table } = *curr;
        let byte = haystack.get(at).copied();
        let mut step_matched = false;
        for sid in set.iter() {
            if kind == MatchKind::LeftmostLongest
                && (matched || step_matched)
                && slot_table.for_state(sid)[0] > found[0]
            {
                continue;
            }
            match *self.nfa.state(sid) {
                State::Match => {
                    if anchor == Anchor::Both && at < haystack.len() {
                        continue;
                    }
                    match kind {
                        MatchKind::LeftmostFirst => {
                            found.copy_from_slice(slot_table.for_state(sid));
                            return true;
                        }
                        MatchKind::LeftmostLongest => {
                            if !step_matched {
                                found.copy_from_slice(
                                    slot_table.for_state(sid),
                                );
                                step_matched = true;
                            }
                        }
                    }
                }
                ref state => {
                    let Some(target) = byte.and_then(|b| state.transition(b))
                    else {
                        continue;
                    };
                    let slots = slot_table.for_state(sid);
                    self.epsilon_closure(
                        stack,
                        slots,
                        next,
                        haystack,
                        at + 1,
                        target,
                    );
                }
            }
        }
        step_matched
    }

    /// Compute the epsilon closure of `sid`, writing the closure into `next`
    /// while copying slot values from `curr_slots` into corresponding states
    /// in `next`. `curr_slots` should be the slot values corresponding to
    /// `sid`.
    ///
    /// Conditional epsilon transitions are followed if and only if they are
    /// satisfied for the position `at` in the haystack.
    ///
    /// While this routine may write to `curr_slots`, once it returns, any
    /// writes are undone and the original values (even if absent) are
    /// restored.
    fn epsilon_closure(
        &self,
        stack: &mut Vec<FollowEpsilon>,
        curr_slots: &mut [Option<NonMaxUsize>],
        next: &mut ActiveStates,
        haystack: &[u8],
        at: usize,
        sid: StateID,
    ) {
        stack.push(FollowEpsilon::Explore(sid));
        while let Some(frame) = stack.pop() {
            match frame {
                FollowEpsilon::RestoreCapture { slot, offset } => {
                    curr_slots[slot.as_usize()] = offset;
                }
                FollowEpsilon::Explore(sid) => {
                    self.epsilon_closure_explore(
                        stack, curr_slots, next, haystack, at, sid,
                    );
                }
            }
        }
    }

    /// Explore all of the epsilon transitions out of `sid`, pushing any
    /// additional explorations on to `stack`.
    fn epsilon_closure_explore(
        &self,
        stack: &mut Vec<FollowEpsilon>,
        curr_slots: &mut [Option<NonMaxUsize>],
        next: &mut ActiveStates,
        haystack: &[u8],
        at: usize,
        mut sid: StateID,
    ) {
        loop {
            if !next.set.insert(sid) {
                return;
            }
            match *self.nfa.state(sid) {
                State::Fail
                | State::Match
                | State::Byte { .. }
                | State::Ranges { .. } => {
                    next.slot_table.for_state(sid).copy_from_slice(curr_slots);
                    return;
                }
                State::Goto { target, look: None } => {
                    sid = target;
                }
                State::Goto { target, look: Some(look) } => {
                    if !look.is_match(haystack, at) {
                        return;
                    }
                    sid = target;
                }
                State::Splits { ref targets, reverse: false } => {
                    sid = match targets.first() {
                        None => return,
                        Some(&sid) => sid,
                    };
                    stack.extend(
                        targets[1..]
                            .iter()
                            .copied()
                            .rev()
                            .map(FollowEpsilon::Explore),
                    );
                }
                State::Splits { ref targets, reverse: true } => {
                    sid = match targets.last() {
                        None => return,
                        Some(&sid) => sid,
                    };
                    stack.extend(
                        targets[..targets.len() - 1]
                            .iter()
                            .copied()
                            .map(FollowEpsilon::Explore),
                    );
                }
                State::Capture { target, slot } => {
                    // Slots that won't be copied into the caller's slots are
                    // never tracked.
                    if slot.as_usize() < curr_slots.len() {
                        stack.push(FollowEpsilon::RestoreCapture {
                            slot,
                            offset: curr_slots[slot.as_usize()],
                        });
                        curr_slots[slot.as_usize()] = NonMaxUsize::new(at);
                    }
                    sid = target;
                }
            }
        }
    }
}

/// A cache represents mutable state that a `PikeVM` requires during a
/// search.
#[derive(Clone, Debug)]
pub(crate) struct Cache {
    /// Stack used while computing epsilon closure.
    stack: Vec<FollowEpsilon>,
    /// The current active states being explored for the current byte in the
    /// haystack.
    curr: ActiveStates,
    /// The next set of states we're building that will be explored for the
    /// next byte in the haystack.
    next: ActiveStates,
    /// The slots of the best match seen so far in the current search.
    found: Vec<Option<NonMaxUsize>>,
}

impl Cache {
    /// Create a new `PikeVM` cache.
    pub(crate) fn new(re: &PikeVM) -> Cache {
        Cache {
            stack: vec![],
            curr: ActiveStates::new(re),
            next: ActiveStates::new(re),
            found: vec![None; re.nfa().slot_len()],
        }
    }

    /// Clears this cache and sets the number of slots tracked for each
    /// thread in the upcoming search.
    fn setup_search(&mut self, captures_slot_len: usize) {
        self.stack.clear();
        self.curr.setup_search(captures_slot_len);
        self.next.setup_search(captures_slot_len);
        for slot in self.found.iter_mut() {
            *slot = None;
        }
    }
}

/// A set of active states used to "simulate" the execution of an NFA via the
/// PikeVM.
///
/// There are two sets of these used during NFA simulation. One set corresponds
/// to the "current" set of states being traversed for the current position
/// in a haystack. The other set corresponds to the "next" set of states being
/// built, which will become the new "current" set for the next position in the
/// haystack.
#[derive(Clone, Debug)]
struct ActiveStates {
    /// The set of active NFA states. This set preserves insertion order, which
    /// is critical for simulating the match semantics of backtracking regex
    /// engines.
    set: SparseSet,
    /// The slots for every NFA state.
    slot_table: SlotTable,
}

impl ActiveStates {
    fn new(re: &PikeVM) -> ActiveStates {
        ActiveStates {
            set: SparseSet::new(re.nfa().len()),
            slot_table: SlotTable::new(re),
        }
    }

    fn setup_search(&mut self, captures_slot_len: usize) {
        self.set.clear();
        self.slot_table.setup_search(captures_slot_len);
    }
}

/// A table of slots, where each row represent a state in an NFA.
///
/// The table has one extra row at the end that is always absent. It is used
/// as scratch space for computing the epsilon closure of the start state.
#[derive(Clone, Debug)]
struct SlotTable {
    /// The actual table of offsets.
    table: Vec<Option<NonMaxUsize>>,
    /// The number of slots per state, i.e., the table's stride or the length
    /// of each row.
    slots_per_state: usize,
    /// The number of slots actually tracked in the current search.
    slots_for_captures: usize,
}

impl SlotTable {
    fn new(re: &PikeVM) -> SlotTable {
        let nfa = re.nfa();
        let slots_per_state = nfa.slot_len();
        let len = (nfa.len() + 1) * slots_per_state;
        SlotTable {
            table: vec![None; len],
            slots_per_state,
            slots_for_captures: slots_per_state,
        }
    }

    fn setup_search(&mut self, captures_slot_len: usize) {
        self.slots_for_captures = captures_slot_len;
    }

    /// Return a mutable slice of the slots for the given state.
    fn for_state(&mut self, sid: StateID) -> &mut [Option<NonMaxUsize>] {
        let i = sid.as_usize() * self.slots_per_state;
        &mut self.table[i..i + self.slots_for_captures]
    }

    /// Return a slice of slots of appropriate length where every slot offset
    /// is guaranteed to be absent.
    fn all_absent(&mut self) -> &mut [Option<NonMaxUsize>] {
        let i = self.table.len() - self.slots_per_state;
        &mut self.table[i..i + self.slots_for_captures]
    }
}

/// Represents a stack frame for use while computing an epsilon closure.
///
/// `Explore` visits the epsilon transitions out of a state. `RestoreCapture`
/// puts a slot back to the offset it had before a `Capture` state was
/// traversed, which scopes that capture to the states explored after it.
#[derive(Clone, Debug)]
enum FollowEpsilon {
    Explore(StateID),
    RestoreCapture { slot: u32, offset: Option<NonMaxUsize> },
}

/// A sparse set used for representing ordered NFA states.
///
/// This supports constant time addition and membership testing. Clearing an
/// entire set can also be done in constant time. Iteration yields elements
/// in the order in which they were inserted.
///
/// The data structure is based on: https://research.swtch.com/sparse
#[derive(Clone)]
struct SparseSet {
    len: usize,
    dense: Vec<StateID>,
    sparse: Vec<StateID>,
}

impl SparseSet {
    fn new(capacity: usize) -> SparseSet {
        assert!(
            capacity <= u32::MAX.as_usize(),
            "sparse set capacity cannot exceed {:?}",
            u32::MAX,
        );
        let (dense, sparse) = (vec![0; capacity], vec![0; capacity]);
        SparseSet { len: 0, dense, sparse }
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert the state ID value into this set and return true if the given
    /// state ID was not previously in this set.
    fn insert(&mut self, id: StateID) -> bool {
        if self.contains(id) {
            return false;
        }
        let index = self.len;
        assert!(
            index < self.dense.len(),
            "{:?} exceeds capacity of {:?} when inserting {:?}",
            index,
            self.dense.len(),
            id,
        );
        self.dense[index] = id;
        // OK because the capacity never exceeds u32::MAX.
        self.sparse[id.as_usize()] = index as u32;
        self.len += 1;
        true
    }

    fn contains(&self, id: StateID) -> bool {
        let index = self.sparse[id.as_usize()];
        index.as_usize() < self.len && self.dense[index.as_usize()] == id
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn iter(&self) -> impl Iterator<Item = StateID> + '_ {
        self.dense[..self.len].iter().copied()
    }
}

impl core::fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let elements: Vec<StateID> = self.iter().collect();
        f.debug_tuple("SparseSet").field(&elements).finish()
    }
}
