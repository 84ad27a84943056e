use lexopt::Parser;

use regex_exhaustive::{exhaustive, Differential};

use crate::{
    args,
    util::{self, Table},
};

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Tests random regexps against random haystacks. This reaches regexps and
haystacks far bigger than an exhaustive run can.

USAGE:
    regex-exhaustive random [options]

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut params = args::params::Config::default();
    let mut run = args::run::Config::default();
    args::configure(p, USAGE, &mut [&mut common, &mut params, &mut run])?;

    let params = params.params();
    let config = run.exhaustive();
    let mut table = Table::empty();
    args::params::Config::add_to_table(&mut table, &params);
    table.add("regexp seed", run.regexp_seed);
    table.add("regexp count", run.regexp_count);
    table.add("random strings", config.get_random_strings());
    table.add("reduced", config.get_reduced_scale());
    let (summary, time) = util::timeitr(|| {
        exhaustive::run_random(
            Differential::new(),
            params,
            config.clone(),
            run.regexp_seed,
            run.regexp_count,
        )
    })?;
    table.add("run time", time);
    super::report(&common, &config, table, &[summary])
}
