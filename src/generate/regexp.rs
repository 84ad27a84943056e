use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::generate::{count_args, format_template};

/// Generates regexps from a set of atoms and operators.
///
/// A regexp is built as a postfix program: a sequence of atoms and operators
/// evaluated on a stack. An atom pushes itself and an operator pops as many
/// operands as it has placeholders, then pushes its result. Every program
/// using at most `max_atoms` atoms and `max_ops` operators that leaves
/// exactly one regexp on the stack is generated, in depth first order with
/// atoms tried before operators. Every operator application is wrapped in a
/// non-capturing group, so precedence never changes the meaning of a
/// program.
///
/// # Example
///
/// ```
/// use regex_exhaustive::generate::{egrep_ops, explode, RegexpGenerator};
///
/// let gen = RegexpGenerator::new(1, 1, explode("a"), egrep_ops());
/// let got: Vec<String> = gen.collect();
/// assert_eq!(got, vec![
///     "a", "(?:a*)", "(?:a+)", "(?:a?)", "(?:a(?s:.)*)",
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct RegexpGenerator {
    max_atoms: usize,
    max_ops: usize,
    atoms: Vec<String>,
    ops: Vec<String>,
    /// The number of operands taken by each operator.
    arity: Vec<usize>,
    mode: Mode,
    /// The next regexp, when it has already been computed by `has_next`.
    peeked: Option<Option<String>>,
}

#[derive(Clone, Debug)]
enum Mode {
    Exhaustive(Walk),
    Random(RandomWalk),
}

/// The state of a depth first walk over every postfix program.
#[derive(Clone, Debug)]
struct Walk {
    /// The program built so far.
    post: Vec<Token>,
    /// One frame for the empty program and one more for every token in
    /// `post`.
    frames: Vec<Frame>,
}

#[derive(Clone, Debug)]
struct Frame {
    /// The depth of the stack after running the program up to this frame.
    nstk: usize,
    ops: usize,
    atoms: usize,
    /// Whether this program was already considered for output.
    visited: bool,
    /// The next choice to extend this program with. Choices below the number
    /// of atoms are atoms, and the rest are operators.
    next_choice: usize,
}

impl Frame {
    fn new(nstk: usize, ops: usize, atoms: usize) -> Frame {
        Frame { nstk, ops, atoms, visited: false, next_choice: 0 }
    }
}

#[derive(Clone, Copy, Debug)]
enum Token {
    Atom(usize),
    Op(usize),
}

/// The state of a sequence of randomly generated postfix programs.
#[derive(Clone, Debug)]
struct RandomWalk {
    seed: u64,
    count: usize,
    rng: StdRng,
    /// The number of programs left to attempt.
    remaining: usize,
}

impl RegexpGenerator {
    /// Create a generator of every regexp with at most `max_atoms` atoms and
    /// `max_ops` operators.
    ///
    /// # Panics
    ///
    /// When an operator has no `%s` placeholder.
    pub fn new(
        max_atoms: usize,
        max_ops: usize,
        atoms: Vec<String>,
        ops: Vec<String>,
    ) -> RegexpGenerator {
        let arity: Vec<usize> = ops.iter().map(|op| count_args(op)).collect();
        for (op, &nargs) in ops.iter().zip(arity.iter()) {
            assert!(nargs > 0, "operator {:?} has no %s placeholder", op);
        }
        RegexpGenerator {
            max_atoms,
            max_ops,
            atoms,
            ops,
            arity,
            mode: Mode::Exhaustive(Walk::new()),
            peeked: None,
        }
    }

    /// Switch this generator to yield up to `count` randomly generated
    /// regexps, using the given seed.
    ///
    /// A random program is abandoned, without yielding anything, when it
    /// grows too big to ever be reduced to a single regexp. So fewer than
    /// `count` regexps may be yielded.
    pub fn random(&mut self, seed: u64, count: usize) {
        self.mode = Mode::Random(RandomWalk::new(seed, count));
        self.peeked = None;
    }

    /// Restart the sequence from the beginning. A random sequence is
    /// restarted with its original seed, and so yields the same regexps.
    pub fn reset(&mut self) {
        match self.mode {
            Mode::Exhaustive(ref mut walk) => *walk = Walk::new(),
            Mode::Random(ref mut walk) => {
                *walk = RandomWalk::new(walk.seed, walk.count)
            }
        }
        self.peeked = None;
    }

    /// Returns true if and only if there is at least one more regexp in this
    /// sequence.
    pub fn has_next(&mut self) -> bool {
        if self.peeked.is_none() {
            let next = self.advance();
            self.peeked = Some(next);
        }
        matches!(self.peeked, Some(Some(_)))
    }

    fn advance(&mut self) -> Option<String> {
        match self.mode {
            Mode::Exhaustive(_) => self.advance_exhaustive(),
            Mode::Random(_) => self.advance_random(),
        }
    }

    fn advance_exhaustive(&mut self) -> Option<String> {
        let Mode::Exhaustive(ref mut walk) = self.mode else {
            return None;
        };
        let choices = self.atoms.len() + self.ops.len();
        loop {
            let frame = walk.frames.last_mut()?;
            if !frame.visited {
                frame.visited = true;
                // Even if only binary operators were applied from here on,
                // this program could never get back down to one regexp
                // without using too many operators.
                if frame.ops + frame.nstk > self.max_ops + 1 {
                    frame.next_choice = choices;
                }
                if frame.nstk == 1 {
                    let post = walk.post.clone();
                    return Some(self.run_postfix(&post));
                }
                continue;
            }

            let mut child = None;
            while frame.next_choice < choices {
                let choice = frame.next_choice;
                frame.next_choice += 1;
                if choice < self.atoms.len() {
                    if frame.atoms < self.max_atoms {
                        let next = Frame::new(
                            frame.nstk + 1,
                            frame.ops,
                            frame.atoms + 1,
                        );
                        child = Some((Token::Atom(choice), next));
                        break;
                    }
                } else {
                    let op = choice - self.atoms.len();
                    let nargs = self.arity[op];
                    if frame.ops < self.max_ops && nargs <= frame.nstk {
                        let next = Frame::new(
                            frame.nstk - nargs + 1,
                            frame.ops + 1,
                            frame.atoms,
                        );
                        child = Some((Token::Op(op), next));
                        break;
                    }
                }
            }
            match child {
                Some((token, next)) => {
                    walk.post.push(token);
                    walk.frames.push(next);
                }
                None => {
                    walk.frames.pop();
                    walk.post.pop();
                }
            }
        }
    }

    fn advance_random(&mut self) -> Option<String> {
        if self.max_atoms == 0 || self.atoms.is_empty() {
            return None;
        }
        loop {
            let Mode::Random(ref mut walk) = self.mode else {
                return None;
            };
            if walk.remaining == 0 {
                return None;
            }
            walk.remaining -= 1;
            if let Some(post) = walk.program(
                self.max_atoms,
                self.max_ops,
                self.atoms.len(),
                &self.arity,
            ) {
                return Some(self.run_postfix(&post));
            }
        }
    }

    /// Evaluates a postfix program and returns the regexp it builds.
    fn run_postfix(&self, post: &[Token]) -> String {
        let mut stack: Vec<String> = vec![];
        for &token in post.iter() {
            match token {
                Token::Atom(i) => stack.push(self.atoms[i].clone()),
                Token::Op(i) => {
                    let at = stack.len() - self.arity[i];
                    let operands = stack.split_off(at);
                    let args: Vec<&str> =
                        operands.iter().map(|s| s.as_str()).collect();
                    let applied = format_template(&self.ops[i], &args);
                    stack.push(format!("(?:{})", applied));
                }
            }
        }
        debug_assert_eq!(1, stack.len(), "bad postfix program {:?}", post);
        stack.pop().unwrap_or_default()
    }
}

impl Iterator for RegexpGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.peeked.take() {
            Some(next) => next,
            None => self.advance(),
        }
    }
}

impl Walk {
    fn new() -> Walk {
        Walk { post: vec![], frames: vec![Frame::new(0, 0, 0)] }
    }
}

impl RandomWalk {
    fn new(seed: u64, count: usize) -> RandomWalk {
        RandomWalk {
            seed,
            count,
            rng: StdRng::seed_from_u64(seed),
            remaining: count,
        }
    }

    /// Builds one random postfix program. At every step, the program either
    /// stops (only when it holds exactly one regexp), or is extended by a
    /// random operator or a random atom, each with even odds. Stopping gets
    /// more likely as fewer atoms are left.
    ///
    /// Returns `None` when the program was abandoned.
    fn program(
        &mut self,
        max_atoms: usize,
        max_ops: usize,
        atom_len: usize,
        arity: &[usize],
    ) -> Option<Vec<Token>> {
        let (mut nstk, mut ops, mut atoms) = (0, 0, 0);
        let mut post = vec![];
        loop {
            if nstk == 1 && self.rng.gen_range(0..=max_atoms - atoms) == 0 {
                return Some(post);
            }
            if ops + nstk > max_ops + 1 {
                return None;
            }
            let can_apply_op =
                ops < max_ops && arity.iter().any(|&n| n <= nstk);
            if nstk != 1 && atoms == max_atoms && !can_apply_op {
                return None;
            }
            if ops < max_ops && !arity.is_empty() && self.rng.gen_bool(0.5) {
                let op = self.rng.gen_range(0..arity.len());
                if arity[op] <= nstk {
                    post.push(Token::Op(op));
                    nstk = nstk - arity[op] + 1;
                    ops += 1;
                    continue;
                }
            }
            if atoms < max_atoms && self.rng.gen_bool(0.5) {
                post.push(Token::Atom(self.rng.gen_range(0..atom_len)));
                nstk += 1;
                atoms += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::{egrep_ops, explode};

    use super::*;

    fn ab(max_atoms: usize, max_ops: usize) -> RegexpGenerator {
        RegexpGenerator::new(max_atoms, max_ops, explode("ab"), egrep_ops())
    }

    #[test]
    fn counts() {
        assert_eq!(10, ab(1, 1).count());
        assert_eq!(18, ab(2, 1).count());
        assert_eq!(2, ab(1, 0).count());
        assert_eq!(0, ab(0, 3).count());
    }

    #[test]
    fn order() {
        let got: Vec<String> = ab(2, 1).take(9).collect();
        let expected = vec![
            "a",
            "(?:aa)",
            "(?:a|a)",
            "(?:ab)",
            "(?:a|b)",
            "(?:a*)",
            "(?:a+)",
            "(?:a?)",
            "(?:a(?s:.)*)",
        ];
        assert_eq!(expected, got);
    }

    #[test]
    fn reset_restarts() {
        let mut gen = ab(2, 2);
        let first: Vec<String> = gen.by_ref().collect();
        assert!(!gen.has_next());
        gen.reset();
        assert!(gen.has_next());
        let second: Vec<String> = gen.by_ref().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn has_next_does_not_skip() {
        let mut gen = ab(1, 0);
        assert!(gen.has_next());
        assert!(gen.has_next());
        assert_eq!(Some("a".to_string()), gen.next());
        assert_eq!(Some("b".to_string()), gen.next());
        assert!(!gen.has_next());
        assert_eq!(None, gen.next());
    }

    #[test]
    fn nested_operators() {
        let got: Vec<String> = ab(2, 2).collect();
        assert!(got.contains(&"(?:(?:ab)*)".to_string()));
        assert!(got.contains(&"(?:(?:a*)|b)".to_string()));
        assert!(got.contains(&"(?:(?:a+)?)".to_string()));
    }

    #[test]
    fn random_is_deterministic() {
        let mut gen = ab(3, 3);
        gen.random(42, 50);
        let first: Vec<String> = gen.by_ref().collect();
        assert!(!first.is_empty());
        assert!(first.len() <= 50);
        gen.reset();
        let second: Vec<String> = gen.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn random_stays_within_bounds() {
        let mut gen = ab(3, 2);
        gen.random(7, 200);
        let all: Vec<String> = ab(3, 2).collect();
        for re in gen {
            assert!(all.contains(&re), "{:?} is out of bounds", re);
        }
    }

    #[test]
    fn random_without_atoms() {
        let mut gen = ab(0, 2);
        gen.random(1, 10);
        assert_eq!(0, gen.count());
    }
}
