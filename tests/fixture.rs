use regex_exhaustive::{
    engine::{Anchor, MatchKind, Span},
    exhaustive::{log_fixture, Config, Params},
    fixture::Fixture,
    generate::{egrep_ops, explode},
    Differential,
};

fn params(atoms: &[&str], max_ops: usize) -> Params {
    Params::new(
        1,
        max_ops,
        atoms.iter().map(|s| s.to_string()).collect(),
        egrep_ops(),
        1,
        explode("a"),
    )
}

fn write(params: Params) -> String {
    crate::init();
    let config = Config::new().reduced_scale(false);
    let (summary, out) =
        log_fixture(Differential::new(), params, config, vec![]).unwrap();
    assert_eq!(0, summary.tests);
    String::from_utf8(out).unwrap()
}

#[test]
fn single_regexp() {
    let got = write(params(&["a"], 0));
    let want = "\
strings
\"\"
\"a\"
regexps
\"a\"
-;-;-;-
0-1;0-1;0-1;0-1
";
    assert_eq!(want, got);
}

#[test]
fn capture_groups() {
    let got = write(params(&["a"], 0).top_wrapper("(%s)?"));
    let want = "\
strings
\"\"
\"a\"
regexps
\"(a)?\"
0-0 -;0-0 -;0-0 -;0-0 -
0-1 0-1;0-1 0-1;0-1 0-1;0-1 0-1
";
    assert_eq!(want, got);
}

#[test]
fn compile_failures_never_match() {
    let got = write(params(&["[", "\""], 0));
    let want = "\
strings
\"\"
\"a\"
regexps
\"[\"
-;-;-;-
-;-;-;-
\"\\\"\"
-;-;-;-
-;-;-;-
";
    assert_eq!(want, got);
}

#[test]
fn random_strings_are_rejected() {
    crate::init();
    let config = Config::new().random_strings(1, 10);
    let params = params(&["a"], 0);
    let err = log_fixture(Differential::new(), params, config, vec![])
        .unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn verify_round_trip() {
    let params = Params::new(
        2,
        1,
        explode("ab"),
        egrep_ops(),
        2,
        explode("ab"),
    )
    .top_wrapper("(%s)");
    let config = Config::new().reduced_scale(false);
    let (summary, out) =
        log_fixture(Differential::new(), params, config, vec![]).unwrap();

    let fixture = Fixture::parse(&out).unwrap();
    assert_eq!(1, fixture.blocks().len());
    let block = &fixture.blocks()[0];
    assert_eq!(7, block.strings().len());
    assert_eq!(summary.regexps, block.entries().len());
    assert!(fixture.verify(&Differential::new()).unwrap().is_empty());
}

#[test]
fn progress_stays_out_of_the_fixture() {
    crate::init();
    let params = || {
        Params::new(1, 0, explode("ab"), egrep_ops(), 1, explode("ab"))
    };
    let config = Config::new().reduced_scale(false);
    let (_, quiet) =
        log_fixture(Differential::new(), params(), config.clone(), vec![])
            .unwrap();
    let (summary, shown) = log_fixture(
        Differential::new(),
        params(),
        config.show_progress(true),
        vec![],
    )
    .unwrap();
    assert_eq!(2, summary.regexps);
    assert_eq!(quiet, shown);
    assert!(shown.starts_with(b"strings\n"));
    assert!(!shown.contains(&b'\r'));
    let fixture = Fixture::parse(&shown).unwrap();
    assert!(fixture.verify(&Differential::new()).unwrap().is_empty());
}

#[test]
fn verify_reports_differences() {
    crate::init();
    let data = b"\
strings
\"a\"
regexps
\"a\"
0-1;0-1;0-1;-
";
    let fixture = Fixture::parse(data).unwrap();
    let mismatches = fixture.verify(&Differential::new()).unwrap();
    assert_eq!(1, mismatches.len());
    let m = &mismatches[0];
    assert_eq!("a", m.regexp);
    assert_eq!(4, m.line);
    assert_eq!(Anchor::Unanchored, m.anchor);
    assert_eq!(MatchKind::LeftmostLongest, m.kind);
    assert_eq!(None, m.expected);
    let got = m.got.as_ref().map(|caps| caps.span());
    assert_eq!(Some(Span { start: 0, end: 1 }), got);
}

#[test]
fn several_blocks() {
    let mut data = write(params(&["a"], 0));
    data.push_str(&write(params(&["b"], 0)));
    let fixture = Fixture::parse(data.as_bytes()).unwrap();
    assert_eq!(2, fixture.blocks().len());
    assert_eq!("b", fixture.blocks()[1].entries()[0].regexp());
    assert!(fixture.verify(&Differential::new()).unwrap().is_empty());
}

#[test]
fn malformed() {
    let err = Fixture::parse(b"strings\n\"a\"\nregexps\n\"a\"\n-;-\n")
        .unwrap_err();
    assert!(err.to_string().contains("line 5"), "{}", err);
    assert!(Fixture::parse(b"regexps\n").is_err());
    assert!(Fixture::parse(b"strings\n\"a\n").is_err());
}
