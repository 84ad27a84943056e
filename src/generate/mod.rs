/*!
Candidate generators for exhaustive testing.

[`RegexpGenerator`] enumerates every regexp that can be built from a set of
atoms and operators within a size bound, and [`StringGenerator`] enumerates
every haystack up to some length over an alphabet. Both are restartable lazy
iterators: calling `reset` starts the same sequence over again.
*/

pub use self::{regexp::RegexpGenerator, string::StringGenerator};

mod regexp;
mod string;

/// The placeholder substituted by [`format_template`].
const PLACEHOLDER: &str = "%s";

/// Returns the basic egrep operators: concatenation, alternation, the three
/// repetition operators and a "match anything after" operator.
///
/// Each operator is a template whose `%s` placeholders are replaced by its
/// operands.
pub fn egrep_ops() -> Vec<String> {
    ["%s%s", "%s|%s", "%s*", "%s+", "%s?", "%s(?s:.)*"]
        .iter()
        .map(|op| op.to_string())
        .collect()
}

/// Splits the given string into a sequence of single character strings.
pub fn explode(s: &str) -> Vec<String> {
    s.chars().map(|ch| ch.to_string()).collect()
}

/// Splits the given string on every occurrence of `sep`. If `sep` is empty,
/// then this is equivalent to [`explode`].
pub fn split(sep: &str, s: &str) -> Vec<String> {
    if sep.is_empty() {
        return explode(s);
    }
    s.split(sep).map(|piece| piece.to_string()).collect()
}

/// Returns the number of `%s` placeholders in the given template. A `%%`
/// denotes a literal `%` and is not a placeholder.
pub fn count_args(template: &str) -> usize {
    let mut count = 0;
    let mut bytes = template.bytes();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            continue;
        }
        match bytes.next() {
            Some(b's') => count += 1,
            Some(_) | None => {}
        }
    }
    count
}

/// Substitutes each `%s` placeholder in `template` with the corresponding
/// argument, in order. A `%%` is replaced by a single `%`.
///
/// # Panics
///
/// When the number of placeholders is not equal to the number of arguments.
/// Templates come from the harness configuration, so this is a bug in the
/// caller and not a test failure.
pub fn format_template(template: &str, args: &[&str]) -> String {
    assert_eq!(
        count_args(template),
        args.len(),
        "template {:?} must have exactly {} {:?} placeholder(s)",
        template,
        args.len(),
        PLACEHOLDER,
    );
    let mut out = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut rest = template;
    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        rest = &rest[i + 1..];
        if let Some(after) = rest.strip_prefix('s') {
            // OK because the number of placeholders was checked above.
            out.push_str(args.next().copied().unwrap_or_default());
            rest = after;
        } else if let Some(after) = rest.strip_prefix('%') {
            out.push('%');
            rest = after;
        } else {
            out.push('%');
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explode_and_split() {
        assert_eq!(vec!["a", "b", "c"], explode("abc"));
        assert_eq!(Vec::<String>::new(), explode(""));
        assert_eq!(vec!["a", "b"], split("", "ab"));
        assert_eq!(vec!["ab", "c", ""], split(",", "ab,c,"));
    }

    #[test]
    fn templates() {
        assert_eq!(2, count_args("%s|%s"));
        assert_eq!(1, count_args("%s%%"));
        assert_eq!(0, count_args("100%"));
        assert_eq!("(?:a|b)", format_template("(?:%s|%s)", &["a", "b"]));
        assert_eq!("^(?:ab)$", format_template("^(?:%s)$", &["ab"]));
        assert_eq!("a%", format_template("%s%%", &["a"]));
    }

    #[test]
    #[should_panic]
    fn template_without_placeholder() {
        format_template("^$", &["a"]);
    }

    #[test]
    fn egrep_operator_arity() {
        let arity: Vec<usize> =
            egrep_ops().iter().map(|op| count_args(op)).collect();
        assert_eq!(vec![2, 2, 1, 1, 1, 1], arity);
    }
}
