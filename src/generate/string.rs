use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generates haystacks over an alphabet of symbols.
///
/// By default, every string of zero up to `max_len` symbols is generated.
/// Shorter strings come first, and strings of the same length come in
/// odometer order, where the last symbol varies fastest.
///
/// # Example
///
/// ```
/// use regex_exhaustive::generate::{explode, StringGenerator};
///
/// let gen = StringGenerator::new(2, explode("ab"));
/// let got: Vec<String> = gen.collect();
/// assert_eq!(got, vec!["", "a", "b", "aa", "ab", "ba", "bb"]);
/// ```
#[derive(Clone, Debug)]
pub struct StringGenerator {
    max_len: usize,
    alphabet: Vec<String>,
    /// The alphabet index of each symbol in the next string.
    digits: Vec<usize>,
    has_next: bool,
    /// Whether an extra empty string is yielded before anything else.
    force_empty: bool,
    random: Option<RandomStrings>,
}

#[derive(Clone, Debug)]
struct RandomStrings {
    rng: StdRng,
    remaining: usize,
}

impl StringGenerator {
    /// Create a generator of every string of at most `max_len` symbols from
    /// the given alphabet.
    pub fn new(max_len: usize, alphabet: Vec<String>) -> StringGenerator {
        StringGenerator {
            max_len,
            alphabet,
            digits: vec![],
            has_next: true,
            force_empty: false,
            random: None,
        }
    }

    /// Restart the sequence from the beginning.
    ///
    /// This also undoes [`StringGenerator::force_empty`] and
    /// [`StringGenerator::random`].
    pub fn reset(&mut self) {
        self.digits.clear();
        self.has_next = true;
        self.force_empty = false;
        self.random = None;
    }

    /// Yield one extra empty string before anything else.
    pub fn force_empty(&mut self) {
        self.force_empty = true;
    }

    /// Replace the rest of the sequence with `count` random strings, drawn
    /// from a generator seeded with `seed`. Each string has a random length
    /// of zero up to `max_len` symbols.
    pub fn random(&mut self, seed: u64, count: usize) {
        let rng = StdRng::seed_from_u64(seed);
        self.random = Some(RandomStrings { rng, remaining: count });
    }

    /// Returns true if and only if there is at least one more string in this
    /// sequence.
    pub fn has_next(&self) -> bool {
        if self.force_empty {
            return true;
        }
        match self.random {
            Some(ref random) => random.remaining > 0,
            None => self.has_next,
        }
    }

    fn next_random(&mut self) -> Option<String> {
        let random = self.random.as_mut()?;
        if random.remaining == 0 {
            return None;
        }
        random.remaining -= 1;
        let len = if self.alphabet.is_empty() {
            0
        } else {
            random.rng.gen_range(0..=self.max_len)
        };
        let mut s = String::new();
        for _ in 0..len {
            let i = random.rng.gen_range(0..self.alphabet.len());
            s.push_str(&self.alphabet[i]);
        }
        Some(s)
    }

    /// Advances `digits` to the next string in odometer order, returning
    /// false once every string has been generated.
    fn increment_digits(&mut self) -> bool {
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.alphabet.len() {
                return true;
            }
            *digit = 0;
        }
        if self.digits.len() < self.max_len && !self.alphabet.is_empty() {
            self.digits.push(0);
            return true;
        }
        false
    }
}

impl Iterator for StringGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.force_empty {
            self.force_empty = false;
            return Some(String::new());
        }
        if self.random.is_some() {
            return self.next_random();
        }
        if !self.has_next {
            return None;
        }
        let s: String =
            self.digits.iter().map(|&i| self.alphabet[i].as_str()).collect();
        self.has_next = self.increment_digits();
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::explode;

    use super::*;

    #[test]
    fn counts() {
        assert_eq!(15, StringGenerator::new(3, explode("ab")).count());
        assert_eq!(1, StringGenerator::new(0, explode("ab")).count());
        assert_eq!(1, StringGenerator::new(3, vec![]).count());
        assert_eq!(40, StringGenerator::new(3, explode("abc")).count());
    }

    #[test]
    fn multi_byte_symbols() {
        let gen = StringGenerator::new(2, vec!["ab".to_string(), "\n".into()]);
        let got: Vec<String> = gen.collect();
        assert_eq!(
            vec!["", "ab", "\n", "abab", "ab\n", "\nab", "\n\n"],
            got,
        );
    }

    #[test]
    fn force_empty_and_reset() {
        let mut gen = StringGenerator::new(1, explode("ab"));
        gen.force_empty();
        let got: Vec<String> = gen.by_ref().collect();
        assert_eq!(vec!["", "", "a", "b"], got);
        assert!(!gen.has_next());

        gen.reset();
        assert!(gen.has_next());
        let got: Vec<String> = gen.collect();
        assert_eq!(vec!["", "a", "b"], got);
    }

    #[test]
    fn random_strings() {
        let mut gen = StringGenerator::new(4, explode("xyz"));
        gen.force_empty();
        gen.random(1234, 20);
        let first: Vec<String> = gen.by_ref().collect();
        assert_eq!(21, first.len());
        assert_eq!("", first[0]);
        for s in first.iter() {
            assert!(s.len() <= 4);
            assert!(s.chars().all(|ch| "xyz".contains(ch)));
        }

        gen.reset();
        gen.force_empty();
        gen.random(1234, 20);
        let second: Vec<String> = gen.by_ref().collect();
        assert_eq!(first, second);

        gen.reset();
        assert_eq!(1 + 3 + 9 + 27 + 81, gen.count());
    }
}
