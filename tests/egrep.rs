use regex_exhaustive::{
    exhaustive::{
        egrep_params, egrep_test, random_test, run, Config, Params,
        DEFAULT_REGEXP_SEED, DEFAULT_STRING_COUNT, EGREP_TOPS,
    },
    generate::{egrep_ops, explode, split, RegexpGenerator},
    Differential,
};

#[test]
fn four_anchors() {
    crate::init();
    let summaries = egrep_test(2, 1, "ab", 2, "ab", "");
    assert_eq!(4, summaries.len());
    for summary in summaries.iter() {
        assert_eq!(0, summary.failures);
        assert_eq!(summaries[0].regexps, summary.regexps);
        assert_eq!(summaries[0].tests, summary.tests);
    }
}

#[test]
fn four_anchors_with_wrapper() {
    crate::init();
    let params = egrep_params(2, 2, "ab", 3, "ab", "(%s)");
    assert_eq!(4, params.len());
    for (params, top) in params.into_iter().zip(EGREP_TOPS) {
        assert_eq!("(%s)", params.wrapper);
        assert_eq!(top, params.top_wrapper);
        let config = Config::new().reduced_scale(false);
        let summary = run(Differential::new(), params, config).unwrap();
        assert_eq!(0, summary.failures, "top wrapper {:?}", top);
    }
}

#[test]
fn any_byte_star() {
    crate::init();
    // Haystacks include a byte that never occurs in a regexp atom.
    let params =
        Params::new(3, 2, explode("ab"), egrep_ops(), 3, explode("abx"));
    let config = Config::new().reduced_scale(false);
    let summary = run(Differential::new(), params, config).unwrap();
    assert_eq!(0, summary.failures);
}

#[test]
fn multi_byte_atoms() {
    crate::init();
    let params = Params::new(
        2,
        2,
        split(" ", "a [ab] (?-s:.)"),
        egrep_ops(),
        3,
        split("", "ab\n"),
    );
    let config = Config::new().reduced_scale(false);
    let summary = run(Differential::new(), params, config).unwrap();
    assert_eq!(0, summary.failures);
}

#[test]
fn random() {
    crate::init();
    let params = Params::new(
        5,
        5,
        explode("abc"),
        egrep_ops(),
        8,
        explode("abc"),
    );
    let mut gen = RegexpGenerator::new(
        params.max_atoms,
        params.max_ops,
        params.alphabet.clone(),
        params.ops.clone(),
    );
    gen.random(DEFAULT_REGEXP_SEED, 50);
    let expected = gen.count();
    assert!(expected > 0);

    let config = Config::new().reduced_scale(false);
    let summary = random_test(params, config, DEFAULT_REGEXP_SEED, 50);
    assert_eq!(expected, summary.regexps);
    assert_eq!(0, summary.failures);
    // The empty haystack comes before the random ones.
    assert_eq!(expected * (DEFAULT_STRING_COUNT + 1), summary.tests);
}
