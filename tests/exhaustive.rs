use std::{cell::RefCell, collections::HashSet};

use regex_exhaustive::{
    engine::{Anchor, Captures, MatchKind},
    exhaustive::{run, Config, Counters, Params},
    generate::{egrep_ops, explode, RegexpGenerator, StringGenerator},
    Differential, Engine, Error, ExhaustiveTester, Tester,
};

/// An engine that remembers every regexp it was asked to compile and
/// disagrees with itself on every haystack.
#[derive(Debug, Default)]
struct Broken {
    compiled: RefCell<Vec<String>>,
}

struct BrokenTester;

impl Engine for Broken {
    type Tester = BrokenTester;

    fn compile(&self, regexp: &str) -> Result<BrokenTester, Error> {
        self.compiled.borrow_mut().push(regexp.to_string());
        Ok(BrokenTester)
    }
}

impl Tester for BrokenTester {
    fn test_input(&mut self, _: &[u8]) -> bool {
        false
    }

    fn captures(
        &mut self,
        _: &[u8],
        _: Anchor,
        _: MatchKind,
    ) -> Option<Captures> {
        None
    }
}

fn ab(max_atoms: usize, max_ops: usize, max_strlen: usize) -> Params {
    Params::new(
        max_atoms,
        max_ops,
        explode("ab"),
        egrep_ops(),
        max_strlen,
        explode("ab"),
    )
}

fn full_scale() -> Config {
    Config::new().reduced_scale(false)
}

#[test]
fn top_wrapper_is_substituted() {
    crate::init();
    let engine = Broken::default();
    let params = ab(1, 1, 1).top_wrapper("^(?:%s)$");
    let mut t = ExhaustiveTester::new(&engine, params, full_scale()).unwrap();
    t.handle_regexp("a|b").unwrap();
    assert_eq!(vec!["^(?:a|b)$"], *engine.compiled.borrow());
}

#[test]
fn failure_budget_is_per_regexp() {
    crate::init();
    let engine = Broken::default();
    let summary = run(&engine, ab(2, 1, 2), full_scale()).unwrap();
    assert_eq!(18, summary.regexps);
    assert_eq!(18, summary.tests);
    assert_eq!(18, summary.failures);

    let config = full_scale().max_bad_inputs(3);
    let summary = run(&engine, ab(2, 1, 2), config).unwrap();
    assert_eq!(18 * 3, summary.tests);
    assert_eq!(18 * 3, summary.failures);

    // More than the number of haystacks: every one is tested.
    let config = full_scale().max_bad_inputs(100);
    let summary = run(&engine, ab(2, 1, 2), config).unwrap();
    assert_eq!(18 * 8, summary.tests);
    assert_eq!(18 * 8, summary.failures);
}

#[test]
fn compile_errors_are_skipped() {
    crate::init();
    let params = Params::new(
        1,
        0,
        vec!["[".to_string(), "a".to_string()],
        egrep_ops(),
        1,
        explode("a"),
    );
    let mut t =
        ExhaustiveTester::new(Differential::new(), params, full_scale())
            .unwrap();
    t.generate().unwrap();
    // Only "a" is tested, on "", "" and "a".
    let want = Counters { regexps: 2, tests: 3, failures: 0 };
    assert_eq!(want, t.counters());
}

#[test]
fn end_to_end() {
    crate::init();
    let want_regexps =
        RegexpGenerator::new(3, 2, explode("ab"), egrep_ops()).count();
    // The forced empty string comes on top of every string generated.
    let strings = 1 + StringGenerator::new(3, explode("ab")).count();
    assert_eq!(16, strings);

    let summary =
        run(Differential::new(), ab(3, 2, 3), full_scale()).unwrap();
    assert_eq!(0, summary.failures);
    assert_eq!(want_regexps, summary.regexps);
    assert_eq!(want_regexps * strings, summary.tests);
    assert_eq!(3, summary.max_strlen);
    assert_eq!(2, summary.str_alphabet_len);
    summary.assert();
}

#[test]
fn reduced_scale_shrinks_bounds() {
    crate::init();
    let config = Config::new().reduced_scale(true);
    let summary = run(Differential::new(), ab(3, 2, 3), config).unwrap();
    let want = RegexpGenerator::new(2, 1, explode("ab"), egrep_ops()).count();
    assert_eq!(want, summary.regexps);
    assert_eq!(2, summary.max_strlen);
    assert_eq!(0, summary.failures);
}

#[test]
fn random_strings_include_empty() {
    crate::init();
    let config = full_scale().random_strings(99, 10);
    let summary = run(Differential::new(), ab(2, 1, 6), config).unwrap();
    assert_eq!(18, summary.regexps);
    assert_eq!(18 * 11, summary.tests);
    assert_eq!(0, summary.failures);
}

#[test]
fn enumeration_is_deterministic() {
    let mut gen = RegexpGenerator::new(3, 2, explode("ab"), egrep_ops());
    let first: Vec<String> = gen.by_ref().collect();
    gen.reset();
    let second: Vec<String> = gen.collect();
    assert_eq!(first, second);

    let distinct: HashSet<&String> = first.iter().collect();
    assert_eq!(first.len(), distinct.len());
}

#[test]
fn enumeration_is_deterministic_for_any_bounds() {
    fn prop(max_atoms: u8, max_ops: u8) -> bool {
        let (max_atoms, max_ops) =
            (usize::from(max_atoms % 4), usize::from(max_ops % 3));
        let (atoms, ops) = (explode("ab"), egrep_ops());
        let gen = || {
            let (atoms, ops) = (atoms.clone(), ops.clone());
            RegexpGenerator::new(max_atoms, max_ops, atoms, ops)
        };
        gen().eq(gen())
    }
    quickcheck::QuickCheck::new()
        .tests(50)
        .quickcheck(prop as fn(u8, u8) -> bool);
}
