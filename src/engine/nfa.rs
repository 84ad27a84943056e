use core::{cell::RefCell, mem::size_of};

use regex_syntax::hir::{self, Hir, HirKind};

use crate::{engine::look::Look, error::Error, int::U32};

pub(crate) type StateID = u32;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Config {
    pub(crate) size_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Config {
        Config { size_limit: Some(10 * (1 << 20)) }
    }
}

/// A byte oriented Thompson NFA.
///
/// Both the PikeVM and the backtracker execute this same NFA. That way, any
/// disagreement between them is a disagreement in how they search and not in
/// how the pattern was compiled.
#[derive(Clone)]
pub(crate) struct NFA {
    /// The pattern string this NFA was generated from.
    pattern: String,
    /// The states that make up this NFA.
    states: Vec<State>,
    /// The ID of the start state.
    start: StateID,
    /// The total number of capture groups, including the implicit group 0.
    group_len: usize,
    /// Heap memory used indirectly by NFA states.
    memory_extra: usize,
}

impl NFA {
    /// Creates a new NFA from the given configuration and HIR.
    pub(crate) fn new(
        config: Config,
        pattern: String,
        hir: &Hir,
    ) -> Result<NFA, Error> {
        Compiler::new(config, pattern).compile(hir)
    }

    /// Returns the pattern string used to construct this NFA.
    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the state corresponding to the given ID.
    ///
    /// # Panics
    ///
    /// If the ID does not refer to a valid state, then this panics.
    pub(crate) fn state(&self, id: StateID) -> &State {
        &self.states[id.as_usize()]
    }

    /// Returns the total number of states in this NFA.
    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns the ID of the starting state for this NFA.
    pub(crate) fn start(&self) -> StateID {
        self.start
    }

    /// Returns the total number of capture groups, including the first and
    /// implicit group, in this NFA.
    pub(crate) fn group_len(&self) -> usize {
        self.group_len
    }

    /// Returns the total number of capture slots in this NFA. Every group
    /// has two slots: one for its start offset and one for its end offset.
    pub(crate) fn slot_len(&self) -> usize {
        // OK because the NFA wouldn't have compiled if this could overflow.
        self.group_len * 2
    }

    /// Returns the heap memory usage, in bytes, used by this NFA.
    fn memory_usage(&self) -> usize {
        (self.states.len() * size_of::<State>()) + self.memory_extra
    }
}

impl core::fmt::Debug for NFA {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "NFA(")?;
        writeln!(f, "pattern: {}", self.pattern)?;
        for (sid, state) in self.states.iter().enumerate() {
            let marker = if sid == self.start.as_usize() { '>' } else { ' ' };
            writeln!(f, "{}{:06?}: {:?}", marker, sid, state)?;
        }
        writeln!(f, ")")?;
        Ok(())
    }
}

#[derive(Clone, Eq, PartialEq)]
pub(crate) enum State {
    Byte { target: StateID, byte: u8 },
    Ranges { target: StateID, ranges: Vec<(u8, u8)> },
    Splits { targets: Vec<StateID>, reverse: bool },
    Goto { target: StateID, look: Option<Look> },
    Capture { target: StateID, slot: u32 },
    Fail,
    Match,
}

impl State {
    /// Returns the heap memory usage of this NFA state in bytes.
    fn memory_usage(&self) -> usize {
        match *self {
            State::Byte { .. }
            | State::Goto { .. }
            | State::Capture { .. }
            | State::Fail
            | State::Match => 0,
            State::Splits { ref targets, .. } => {
                targets.len() * size_of::<StateID>()
            }
            State::Ranges { ref ranges, .. } => {
                ranges.len() * size_of::<(u8, u8)>()
            }
        }
    }

    /// Returns an iterator over the given split targets. The order of the
    /// iterator yields elements in reverse when `reverse` is true.
    pub(crate) fn iter_splits<'a>(
        splits: &'a [StateID],
        reverse: bool,
    ) -> impl Iterator<Item = StateID> + 'a {
        let mut it = splits.iter();
        core::iter::from_fn(move || {
            if reverse { it.next_back() } else { it.next() }.copied()
        })
    }

    /// If this state consumes a byte and `byte` is accepted by it, then this
    /// returns the state to transition to.
    pub(crate) fn transition(&self, byte: u8) -> Option<StateID> {
        match *self {
            State::Byte { target, byte: b } if b == byte => Some(target),
            State::Ranges { target, ref ranges } => ranges
                .iter()
                .any(|&(start, end)| start <= byte && byte <= end)
                .then_some(target),
            _ => None,
        }
    }
}

impl core::fmt::Debug for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            State::Byte { target, byte } => {
                write!(f, "{:?} => {:?}", bstr::BStr::new(&[byte]), target)
            }
            State::Ranges { target, ref ranges } => {
                for (i, &(start, end)) in ranges.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{:?}-{:?} => {:?}",
                        bstr::BStr::new(&[start]),
                        bstr::BStr::new(&[end]),
                        target
                    )?;
                }
                Ok(())
            }
            State::Splits { ref targets, reverse } => {
                write!(f, "splits(")?;
                for (i, sid) in
                    State::iter_splits(targets, reverse).enumerate()
                {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", sid)?;
                }
                write!(f, ")")
            }
            State::Goto { target, look: None } => {
                write!(f, "goto({:?})", target)
            }
            State::Goto { target, look: Some(look) } => {
                write!(f, "{:?} => {:?}", look, target)
            }
            State::Capture { target, slot } => {
                write!(f, "capture(slot={:?}) => {:?}", slot, target)
            }
            State::Fail => write!(f, "FAIL"),
            State::Match => write!(f, "MATCH"),
        }
    }
}

#[derive(Debug)]
struct Compiler {
    config: Config,
    nfa: RefCell<NFA>,
}

impl Compiler {
    fn new(config: Config, pattern: String) -> Compiler {
        let nfa = RefCell::new(NFA {
            pattern,
            states: vec![],
            start: 0,
            group_len: 0,
            memory_extra: 0,
        });
        Compiler { config, nfa }
    }

    fn compile(self, hir: &Hir) -> Result<NFA, Error> {
        // Groups that are compiled away, e.g., the first group in '(a){0}(b)',
        // still count. This keeps group indices stable across engines.
        let group_len = hir
            .properties()
            .explicit_captures_len()
            .max(max_capture_index(hir).as_usize())
            .checked_add(1)
            .filter(|&n| n.checked_mul(2).is_some())
            .ok_or_else(|| {
                Error::unsupported("capture group slots exhausted")
            })?;
        self.nfa.borrow_mut().group_len = group_len;
        let compiled = self.c_capture(0, hir)?;
        let mat = self.add(State::Match)?;
        self.patch(compiled.end, mat)?;
        self.nfa.borrow_mut().start = compiled.start;
        Ok(self.nfa.into_inner())
    }

    fn c(&self, hir: &Hir) -> Result<ThompsonRef, Error> {
        match *hir.kind() {
            HirKind::Empty => self.c_empty(),
            HirKind::Literal(hir::Literal(ref bytes)) => self.c_literal(bytes),
            HirKind::Class(ref class) => self.c_class(class),
            HirKind::Look(look) => self.c_look(look),
            HirKind::Repetition(ref rep) => self.c_repetition(rep),
            HirKind::Capture(ref cap) => self.c_capture(cap.index, &cap.sub),
            HirKind::Concat(ref subs) => {
                self.c_concat(subs.iter().map(|s| self.c(s)))
            }
            HirKind::Alternation(ref subs) => {
                self.c_alternation(subs.iter().map(|s| self.c(s)))
            }
        }
    }

    /// Compile a "fail" state that can never be transitioned out of.
    fn c_fail(&self) -> Result<ThompsonRef, Error> {
        let id = self.add(State::Fail)?;
        Ok(ThompsonRef { start: id, end: id })
    }

    /// Compile an "empty" state with one unconditional epsilon transition.
    ///
    /// Both the `start` and `end` locations point to the state created.
    /// Callers will likely want to keep the `start`, but patch the `end` to
    /// point to some other state.
    fn c_empty(&self) -> Result<ThompsonRef, Error> {
        let id = self.add_empty()?;
        Ok(ThompsonRef { start: id, end: id })
    }

    /// Compile the given literal bytes to a chain of byte states.
    fn c_literal(&self, bytes: &[u8]) -> Result<ThompsonRef, Error> {
        self.c_concat(bytes.iter().map(|&byte| {
            let id = self.add(State::Byte { target: 0, byte })?;
            Ok(ThompsonRef { start: id, end: id })
        }))
    }

    /// Compile the given character class into an NFA.
    ///
    /// If the class is empty, then this compiles to a `Fail` state. Unicode
    /// classes are only accepted when every range is ASCII, since this
    /// engine matches bytes and does no UTF-8 decoding.
    fn c_class(&self, class: &hir::Class) -> Result<ThompsonRef, Error> {
        let ranges: Vec<(u8, u8)> = match *class {
            hir::Class::Bytes(ref cls) => {
                cls.ranges().iter().map(|r| (r.start(), r.end())).collect()
            }
            hir::Class::Unicode(ref cls) => {
                let mut ranges = vec![];
                for r in cls.ranges() {
                    let (Ok(start), Ok(end)) =
                        (u8::try_from(r.start()), u8::try_from(r.end()))
                    else {
                        return Err(Error::unsupported(
                            "non-ASCII Unicode classes are not supported",
                        ));
                    };
                    if end > 0x7F {
                        return Err(Error::unsupported(
                            "non-ASCII Unicode classes are not supported",
                        ));
                    }
                    ranges.push((start, end));
                }
                ranges
            }
        };
        let id = if ranges.is_empty() {
            self.add(State::Fail)
        } else {
            self.add(State::Ranges { target: 0, ranges })
        }?;
        Ok(ThompsonRef { start: id, end: id })
    }

    /// Compile the given HIR look-around assertion to an NFA look-around
    /// assertion.
    fn c_look(&self, look: hir::Look) -> Result<ThompsonRef, Error> {
        let look = Look::from_hir(look)?;
        let id = self.add(State::Goto { target: 0, look: Some(look) })?;
        Ok(ThompsonRef { start: id, end: id })
    }

    /// Compile the given repetition expression. This handles all types of
    /// repetitions and greediness.
    fn c_repetition(
        &self,
        rep: &hir::Repetition,
    ) -> Result<ThompsonRef, Error> {
        match (rep.min, rep.max) {
            (0, Some(1)) => self.c_zero_or_one(&rep.sub, rep.greedy),
            (min, None) => self.c_at_least(&rep.sub, rep.greedy, min),
            (min, Some(max)) if min == max => self.c_exactly(&rep.sub, min),
            (min, Some(max)) => self.c_bounded(&rep.sub, rep.greedy, min, max),
        }
    }

    /// Compile the given expression such that it matches at least `min` times,
    /// but no more than `max` times.
    ///
    /// The optional copies all jump to one shared empty state, so that the
    /// epsilon closure of each split stays small.
    fn c_bounded(
        &self,
        hir: &Hir,
        greedy: bool,
        min: u32,
        max: u32,
    ) -> Result<ThompsonRef, Error> {
        let prefix = self.c_exactly(hir, min)?;
        if min == max {
            return Ok(prefix);
        }
        let empty = self.add_empty()?;
        let mut prev_end = prefix.end;
        for _ in min..max {
            let splits =
                self.add(State::Splits { targets: vec![], reverse: !greedy })?;
            let compiled = self.c(hir)?;
            self.patch(prev_end, splits)?;
            self.patch(splits, compiled.start)?;
            self.patch(splits, empty)?;
            prev_end = compiled.end;
        }
        self.patch(prev_end, empty)?;
        Ok(ThompsonRef { start: prefix.start, end: empty })
    }

    /// Compile the given expression such that it may be matched `n` or more
    /// times.
    fn c_at_least(
        &self,
        hir: &Hir,
        greedy: bool,
        n: u32,
    ) -> Result<ThompsonRef, Error> {
        let can_match_empty = hir.properties().minimum_len() == Some(0);
        if n == 0 {
            if !can_match_empty {
                let splits = self.add(State::Splits {
                    targets: vec![],
                    reverse: !greedy,
                })?;
                let compiled = self.c(hir)?;
                self.patch(splits, compiled.start)?;
                self.patch(compiled.end, splits)?;
                return Ok(ThompsonRef { start: splits, end: splits });
            }

            // When 'x' can match the empty string, 'x*' has the wrong
            // preference order under leftmost-first semantics if compiled
            // as a single loop. Compiling it as '(x+)?' fixes that.
            //
            // See: https://github.com/rust-lang/regex/issues/779
            let compiled = self.c(hir)?;
            let plus =
                self.add(State::Splits { targets: vec![], reverse: !greedy })?;
            self.patch(compiled.end, plus)?;
            self.patch(plus, compiled.start)?;

            let question =
                self.add(State::Splits { targets: vec![], reverse: !greedy })?;
            let empty = self.add_empty()?;
            self.patch(question, compiled.start)?;
            self.patch(question, empty)?;
            self.patch(plus, empty)?;
            Ok(ThompsonRef { start: question, end: empty })
        } else if n == 1 {
            let compiled = self.c(hir)?;
            let splits =
                self.add(State::Splits { targets: vec![], reverse: !greedy })?;
            self.patch(compiled.end, splits)?;
            self.patch(splits, compiled.start)?;
            Ok(ThompsonRef { start: compiled.start, end: splits })
        } else {
            let prefix = self.c_exactly(hir, n - 1)?;
            let last = self.c(hir)?;
            let splits =
                self.add(State::Splits { targets: vec![], reverse: !greedy })?;
            self.patch(prefix.end, last.start)?;
            self.patch(last.end, splits)?;
            self.patch(splits, last.start)?;
            Ok(ThompsonRef { start: prefix.start, end: splits })
        }
    }

    /// Compile the given expression such that it may be matched zero or one
    /// times.
    fn c_zero_or_one(
        &self,
        hir: &Hir,
        greedy: bool,
    ) -> Result<ThompsonRef, Error> {
        let splits =
            self.add(State::Splits { targets: vec![], reverse: !greedy })?;
        let compiled = self.c(hir)?;
        let empty = self.add_empty()?;
        self.patch(splits, compiled.start)?;
        self.patch(splits, empty)?;
        self.patch(compiled.end, empty)?;
        Ok(ThompsonRef { start: splits, end: empty })
    }

    /// Compile the given HIR expression exactly `n` times.
    fn c_exactly(&self, hir: &Hir, n: u32) -> Result<ThompsonRef, Error> {
        self.c_concat((0..n).map(|_| self.c(hir)))
    }

    /// Compile the given expression and insert capturing states at the
    /// beginning and end of it. The slot for the capture states is computed
    /// from the index.
    fn c_capture(&self, index: u32, hir: &Hir) -> Result<ThompsonRef, Error> {
        let Some(slot) = index.checked_mul(2) else {
            return Err(Error::unsupported("capture group slots exhausted"));
        };
        let start = self.add(State::Capture { target: 0, slot })?;
        let inner = self.c(hir)?;
        let end = self.add(State::Capture { target: 0, slot: slot + 1 })?;
        self.patch(start, inner.start)?;
        self.patch(inner.end, end)?;
        Ok(ThompsonRef { start, end })
    }

    /// Compile a concatenation of the sub-expressions yielded by the given
    /// iterator. If the iterator yields no elements, then this compiles down
    /// to an "empty" state that always matches.
    fn c_concat<I>(&self, mut it: I) -> Result<ThompsonRef, Error>
    where
        I: Iterator<Item = Result<ThompsonRef, Error>>,
    {
        let ThompsonRef { start, mut end } = match it.next() {
            Some(result) => result?,
            None => return self.c_empty(),
        };
        for result in it {
            let compiled = result?;
            self.patch(end, compiled.start)?;
            end = compiled.end;
        }
        Ok(ThompsonRef { start, end })
    }

    /// Compile an alternation, where each element yielded by the given
    /// iterator represents an item in the alternation. If the iterator yields
    /// no elements, then this compiles down to a "fail" state.
    ///
    /// Branches appearing earlier are preferred over later ones. The
    /// leftmost-longest searchers still respect this order when breaking ties
    /// between matches of equal length.
    fn c_alternation<I>(&self, mut it: I) -> Result<ThompsonRef, Error>
    where
        I: Iterator<Item = Result<ThompsonRef, Error>>,
    {
        let first = match it.next() {
            None => return self.c_fail(),
            Some(result) => result?,
        };
        let second = match it.next() {
            None => return Ok(first),
            Some(result) => result?,
        };

        let splits =
            self.add(State::Splits { targets: vec![], reverse: false })?;
        let end = self.add_empty()?;
        self.patch(splits, first.start)?;
        self.patch(first.end, end)?;
        self.patch(splits, second.start)?;
        self.patch(second.end, end)?;
        for result in it {
            let compiled = result?;
            self.patch(splits, compiled.start)?;
            self.patch(compiled.end, end)?;
        }
        Ok(ThompsonRef { start: splits, end })
    }

    /// A convenience routine for adding an empty state, also known as an
    /// unconditional epsilon transition.
    fn add_empty(&self) -> Result<StateID, Error> {
        self.add(State::Goto { target: 0, look: None })
    }

    /// The common implementation of "add a state." It handles the common
    /// error cases of state ID exhausting (by owning state ID allocation) and
    /// whether the size limit has been exceeded.
    fn add(&self, state: State) -> Result<StateID, Error> {
        let id = u32::try_from(self.nfa.borrow().states.len()).map_err(|_| {
            Error::unsupported("exhausted state IDs, too many states")
        })?;
        self.nfa.borrow_mut().memory_extra += state.memory_usage();
        self.nfa.borrow_mut().states.push(state);
        self.check_size_limit()?;
        Ok(id)
    }

    /// Add a transition from one state to another.
    ///
    /// States are usually added with dummy targets that are "patched" once
    /// the real target exists.
    fn patch(&self, from: StateID, to: StateID) -> Result<(), Error> {
        let mut new_memory_extra = self.nfa.borrow().memory_extra;
        match self.nfa.borrow_mut().states[from.as_usize()] {
            State::Byte { ref mut target, .. } => {
                *target = to;
            }
            State::Ranges { ref mut target, .. } => {
                *target = to;
            }
            State::Splits { ref mut targets, .. } => {
                targets.push(to);
                new_memory_extra += size_of::<StateID>();
            }
            State::Goto { ref mut target, .. } => {
                *target = to;
            }
            State::Capture { ref mut target, .. } => {
                *target = to;
            }
            State::Fail | State::Match => {}
        }
        if new_memory_extra != self.nfa.borrow().memory_extra {
            self.nfa.borrow_mut().memory_extra = new_memory_extra;
            self.check_size_limit()?;
        }
        Ok(())
    }

    /// Checks that the current heap memory usage of the NFA being compiled
    /// doesn't exceed the configured size limit. If it does, an error is
    /// returned.
    fn check_size_limit(&self) -> Result<(), Error> {
        if let Some(limit) = self.config.size_limit {
            if self.nfa.borrow().memory_usage() > limit {
                return Err(Error::unsupported(
                    "compiled regex exceeded size limit",
                ));
            }
        }
        Ok(())
    }
}

/// Returns the largest capture group index appearing in the given HIR, or
/// zero when it has no explicit groups.
fn max_capture_index(hir: &Hir) -> u32 {
    match *hir.kind() {
        HirKind::Empty
        | HirKind::Literal(_)
        | HirKind::Class(_)
        | HirKind::Look(_) => 0,
        HirKind::Repetition(ref rep) => max_capture_index(&rep.sub),
        HirKind::Capture(ref cap) => {
            cap.index.max(max_capture_index(&cap.sub))
        }
        HirKind::Concat(ref subs) | HirKind::Alternation(ref subs) => {
            subs.iter().map(max_capture_index).max().unwrap_or(0)
        }
    }
}

/// A value that represents the result of compiling a sub-expression of a
/// regex's HIR. Specifically, this represents a sub-graph of the NFA that
/// has an initial state at `start` and a final state at `end`.
#[derive(Clone, Copy, Debug)]
struct ThompsonRef {
    start: StateID,
    end: StateID,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfa(pattern: &str) -> NFA {
        let hir = regex_syntax::ParserBuilder::new()
            .unicode(false)
            .utf8(false)
            .build()
            .parse(pattern)
            .unwrap();
        NFA::new(Config::default(), pattern.to_string(), &hir).unwrap()
    }

    #[test]
    fn group_len_counts_elided_groups() {
        assert_eq!(1, nfa("a").group_len());
        assert_eq!(3, nfa("(a){0}(b)").group_len());
        assert_eq!(6, nfa("(a){0}(b)").slot_len());
    }

    #[test]
    fn start_is_group_zero() {
        let nfa = nfa("a|b");
        assert!(matches!(
            *nfa.state(nfa.start()),
            State::Capture { slot: 0, .. }
        ));
    }

    #[test]
    fn size_limit() {
        let hir = regex_syntax::ParserBuilder::new()
            .unicode(false)
            .utf8(false)
            .build()
            .parse("a{1000}")
            .unwrap();
        let config = Config { size_limit: Some(100) };
        let err = NFA::new(config, "a{1000}".to_string(), &hir).unwrap_err();
        assert!(err.is_compile_error());
    }

    #[test]
    fn transitions() {
        let state = State::Ranges { target: 5, ranges: vec![(b'a', b'c')] };
        assert_eq!(Some(5), state.transition(b'b'));
        assert_eq!(None, state.transition(b'd'));
        let state = State::Byte { target: 2, byte: b'x' };
        assert_eq!(Some(2), state.transition(b'x'));
        assert_eq!(None, State::Match.transition(b'x'));
    }
}
