use lexopt::Parser;

use regex_exhaustive::{exhaustive, Differential};

use crate::{
    args,
    util::{self, Table},
};

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Tests every regexp built with the egrep operators four times: unanchored,
anchored at the start, anchored at the end and anchored at both ends. Each
run prints its own summary line. Since the anchoring wrappers are fixed,
--top-wrapper is rejected, and so are --ops and --sep.

USAGE:
    regex-exhaustive egrep [options]

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut params = args::params::Config::default();
    let mut run = args::run::Config::default();
    args::configure(p, USAGE, &mut [&mut common, &mut params, &mut run])?;

    let (max_atoms, max_ops, alphabet, max_strlen, str_alphabet) =
        params.egrep()?;
    let all = exhaustive::egrep_params(
        max_atoms,
        max_ops,
        alphabet,
        max_strlen,
        str_alphabet,
        params.wrapper(),
    );
    let config = run.exhaustive();
    let mut table = Table::empty();
    table.add("max atoms", max_atoms);
    table.add("max ops", max_ops);
    table.add("alphabet", alphabet.to_string());
    table.add("max string length", max_strlen);
    table.add("string alphabet", str_alphabet.to_string());
    table.add("wrapper", params.wrapper().to_string());
    table.add("reduced", config.get_reduced_scale());
    let (summaries, time) = util::timeitr(|| {
        all.into_iter()
            .map(|params| {
                log::debug!("egrep run with {:?}", params.top_wrapper);
                exhaustive::run(Differential::new(), params, config.clone())
            })
            .collect::<Result<Vec<_>, _>>()
    })?;
    table.add("run time", time);
    super::report(&common, &config, table, &summaries)
}
