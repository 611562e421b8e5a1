//! POSIX shell quoting.
//!
//! Every argument is wrapped in single quotes. Inside single quotes a POSIX
//! shell treats every byte literally except the closing quote itself, so an
//! embedded `'` is emitted as `'\''`: close the quoted run, add an escaped
//! quote, reopen. The result is always exactly one shell word.

/// Quote a single argument for a POSIX shell.
///
/// ```
/// use rcov_task::quote::quote_arg;
///
/// assert_eq!(quote_arg("O'Brian's Diff Tool"), r"'O'\''Brian'\''s Diff Tool'");
/// ```
pub fn quote_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str(r"'\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Quote each argument and join them with single spaces.
///
/// `None` stays `None`: callers rely on telling "no argument list" apart from
/// an empty one, which renders as `Some("")`.
pub fn quote_args<S: AsRef<str>>(args: Option<&[S]>) -> Option<String> {
    let args = args?;
    Some(
        args.iter()
            .map(|arg| quote_arg(arg.as_ref()))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn quote_arg__plain_word__then_wraps_in_single_quotes() {
        assert_eq!(quote_arg("coverage"), "'coverage'");
    }

    #[test]
    fn quote_arg__empty_string__then_yields_empty_quoted_word() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn quote_arg__embedded_single_quotes__then_closes_escapes_and_reopens() {
        assert_eq!(
            quote_arg("O'Brian's Diff Tool"),
            r"'O'\''Brian'\''s Diff Tool'"
        );
    }

    #[test]
    fn quote_arg__regex_metacharacters__then_left_untouched() {
        assert_eq!(
            quote_arg(r"(\A|/)(test_.*|.*_spec)\.rb\Z"),
            r"'(\A|/)(test_.*|.*_spec)\.rb\Z'"
        );
    }

    #[test]
    fn quote_arg__only_a_quote__then_escapes_inside_empty_runs() {
        assert_eq!(quote_arg("'"), r"''\'''");
    }

    #[test]
    fn quote_args__absent_list__then_none() {
        assert_eq!(quote_args::<&str>(None), None);
    }

    #[test]
    fn quote_args__empty_list__then_empty_string() {
        let empty: [&str; 0] = [];
        assert_eq!(quote_args(Some(&empty[..])), Some(String::new()));
    }

    #[test]
    fn quote_args__several_args__then_space_joined() {
        let args = ["-o", "my coverage"];
        assert_eq!(
            quote_args(Some(&args[..])).as_deref(),
            Some("'-o' 'my coverage'")
        );
    }

    proptest! {
        #[test]
        fn quote_arg__any_string__then_shell_splits_back_to_itself(s in "[^\\x00]*") {
            let words = shlex::split(&quote_arg(&s)).expect("tokenizable");
            prop_assert_eq!(words, vec![s]);
        }

        #[test]
        fn quote_args__any_three_strings__then_three_tokens(
            a in "[^\\x00]*",
            b in "[^\\x00]*",
            c in "[^\\x00]*",
        ) {
            let args = vec![a, b, c];
            let line = quote_args(Some(&args[..])).expect("present list");
            let words = shlex::split(&line).expect("tokenizable");
            prop_assert_eq!(words, args);
        }
    }
}
