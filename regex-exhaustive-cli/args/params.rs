use lexopt::{Arg, Parser};

use regex_exhaustive::{
    exhaustive::Params,
    generate::{egrep_ops, split},
};

use crate::{
    args::{self, Configurable, Usage},
    util::Table,
};

/// The bounds and vocabulary of a test matrix.
#[derive(Debug)]
pub struct Config {
    max_atoms: usize,
    max_ops: usize,
    alphabet: String,
    ops: Option<Vec<String>>,
    max_strlen: usize,
    str_alphabet: String,
    sep: String,
    wrapper: String,
    top_wrapper: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_atoms: 3,
            max_ops: 2,
            alphabet: "ab".to_string(),
            ops: None,
            max_strlen: 3,
            str_alphabet: "ab".to_string(),
            sep: String::new(),
            wrapper: String::new(),
            top_wrapper: String::new(),
        }
    }
}

impl Config {
    /// Returns the parameters given on the command line. Operators default
    /// to the egrep operators.
    pub fn params(&self) -> Params {
        let ops = self.ops.clone().unwrap_or_else(egrep_ops);
        Params::new(
            self.max_atoms,
            self.max_ops,
            split(&self.sep, &self.alphabet),
            ops,
            self.max_strlen,
            split(&self.sep, &self.str_alphabet),
        )
        .wrapper(&self.wrapper)
        .top_wrapper(&self.top_wrapper)
    }

    /// Returns the raw bounds and alphabets for the egrep fan-out, which
    /// always splits its alphabets into single characters.
    pub fn egrep(&self) -> anyhow::Result<(usize, usize, &str, usize, &str)> {
        anyhow::ensure!(
            self.sep.is_empty(),
            "--sep is not supported by the egrep command",
        );
        anyhow::ensure!(
            self.ops.is_none(),
            "--ops is not supported by the egrep command",
        );
        anyhow::ensure!(
            self.top_wrapper.is_empty(),
            "--top-wrapper is not supported by the egrep command",
        );
        Ok((
            self.max_atoms,
            self.max_ops,
            &self.alphabet,
            self.max_strlen,
            &self.str_alphabet,
        ))
    }

    pub fn wrapper(&self) -> &str {
        &self.wrapper
    }

    /// Adds the effective parameters of a run to the given table.
    pub fn add_to_table(table: &mut Table, params: &Params) {
        table.add("max atoms", params.max_atoms);
        table.add("max ops", params.max_ops);
        table.add("alphabet", params.alphabet.clone());
        table.add("ops", params.ops.clone());
        table.add("max string length", params.max_strlen);
        table.add("string alphabet", params.str_alphabet.clone());
        table.add("wrapper", params.wrapper.clone());
        table.add("top wrapper", params.top_wrapper.clone());
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("max-atoms") => {
                self.max_atoms = args::parse(p, "--max-atoms")?;
            }
            Arg::Long("max-ops") => {
                self.max_ops = args::parse(p, "--max-ops")?;
            }
            Arg::Long("alphabet") => {
                self.alphabet = args::string(p, "--alphabet")?;
            }
            Arg::Long("ops") => {
                let ops = args::string(p, "--ops")?;
                self.ops = Some(if ops == "egrep" {
                    egrep_ops()
                } else {
                    ops.split_whitespace().map(|op| op.to_string()).collect()
                });
            }
            Arg::Long("max-strlen") => {
                self.max_strlen = args::parse(p, "--max-strlen")?;
            }
            Arg::Long("str-alphabet") => {
                self.str_alphabet = args::string(p, "--str-alphabet")?;
            }
            Arg::Long("sep") => {
                self.sep = args::string(p, "--sep")?;
            }
            Arg::Long("wrapper") => {
                self.wrapper = args::string(p, "--wrapper")?;
            }
            Arg::Long("top-wrapper") => {
                self.top_wrapper = args::string(p, "--top-wrapper")?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[
            Usage::new(
                "--max-atoms <n>",
                "The maximum number of atoms in a regexp.",
                r#"
The maximum number of atoms in a generated regexp. An atom may be used more
than once. The default is 3.
"#,
            ),
            Usage::new(
                "--max-ops <n>",
                "The maximum number of operators in a regexp.",
                r#"
The maximum number of operators applied in a generated regexp. The default is
2.
"#,
            ),
            Usage::new(
                "--alphabet <atoms>",
                "The atoms regexps are built from.",
                r#"
The atoms regexps are built from. By default, every character is one atom and
the default is "ab". Use --sep to give atoms longer than one character.
"#,
            ),
            Usage::new(
                "--ops <ops>",
                "The operators regexps are built with.",
                r#"
A whitespace separated list of operator templates. Each template has one or two
%s placeholders that are replaced by its operands, for example, "%s%s" or
"%s+". The special value "egrep" selects concatenation, alternation, the
three repetition operators and "match anything after". That is the default.
"#,
            ),
            Usage::new(
                "--max-strlen <n>",
                "The maximum number of symbols in a haystack.",
                r#"
The maximum number of symbols in a generated haystack. Every haystack from the
empty one up to this length is tested. The default is 3.
"#,
            ),
            Usage::new(
                "--str-alphabet <symbols>",
                "The symbols haystacks are built from.",
                r#"
The symbols haystacks are built from. By default, every character is one
symbol and the default is "ab".
"#,
            ),
            Usage::new(
                "--sep <separator>",
                "Split alphabets on a separator.",
                r#"
Split --alphabet and --str-alphabet on the given separator instead of into
single characters. For example, "--sep , --alphabet 'a,\b,[ab]'" gives three
atoms.
"#,
            ),
            Usage::new(
                "--wrapper <template>",
                "A template applied to every generated regexp.",
                r#"
A template with exactly one %s that every generated regexp is substituted into,
for example, "(%s)" to add a capture group. It is applied before
--top-wrapper.
"#,
            ),
            Usage::new(
                "--top-wrapper <template>",
                "A template applied after --wrapper.",
                r#"
A template with exactly one %s that every regexp is substituted into after
--wrapper, for example, "^(?:%s)$" to anchor it at both ends.
"#,
            ),
        ];
        USAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egrep_rejects_fixed_flags() {
        assert!(Config::default().egrep().is_ok());

        let top_wrapper = "^(?:%s)$".to_string();
        let config = Config { top_wrapper, ..Config::default() };
        let err = config.egrep().unwrap_err();
        assert!(err.to_string().contains("--top-wrapper"), "{}", err);

        let config = Config { sep: ",".to_string(), ..Config::default() };
        assert!(config.egrep().is_err());

        let config = Config { ops: Some(egrep_ops()), ..Config::default() };
        assert!(config.egrep().is_err());
    }
}
