/*!
The sub-millisecond extension tokens.

A pattern may contain `NNNNNNNNN`, the nanosecond of the second as 9
digits, and `CCCCCC`, the microsecond of the second as 6 digits. Neither is
known to the pattern engine, which works in milliseconds. So before a
pattern is compiled, every token outside of quotes is turned into quoted
literal text, and after a value is formatted, the literal text is replaced
with digits.

Tokens that were already quoted stay literal text.
*/

use crate::fmt::util::DecimalFormatter;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Token {
    Nanos,
    Micros,
}

impl Token {
    pub(crate) fn text(self) -> &'static str {
        match self {
            Token::Nanos => "NNNNNNNNN",
            Token::Micros => "CCCCCC",
        }
    }

    fn starting(bytes: &[u8]) -> Option<Token> {
        [Token::Nanos, Token::Micros]
            .into_iter()
            .find(|token| bytes.starts_with(token.text().as_bytes()))
    }
}

/// One token found in a pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Occurrence {
    pub(crate) token: Token,
    pub(crate) quoted: bool,
}

/// A pattern ready for the pattern engine, along with every token found
/// in it, in order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Preprocessed {
    pub(crate) pattern: String,
    pub(crate) occurrences: Vec<Occurrence>,
}

/// Quotes every unquoted token in `pattern`.
///
/// A token that touches quoted text is merged into it, so that two quoted
/// spans never meet and read as an escaped quote. A pattern with an
/// unclosed quote is returned unchanged, so that compiling it reports the
/// error.
pub(crate) fn preprocess(pattern: &str) -> Preprocessed {
    let bytes = pattern.as_bytes();
    let mut segments = Segments::default();
    let mut occurrences = vec![];
    let mut quoted = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                segments.push(quoted, "''");
                i += 2;
            } else {
                quoted = !quoted;
                i += 1;
            }
            continue;
        }
        if let Some(token) = Token::starting(&bytes[i..]) {
            occurrences.push(Occurrence { token, quoted });
            segments.push(true, token.text());
            i += token.text().len();
            continue;
        }
        let len = pattern[i..].chars().next().map_or(1, char::len_utf8);
        segments.push(quoted, &pattern[i..i + len]);
        i += len;
    }
    if quoted {
        return Preprocessed { pattern: pattern.to_string(), occurrences };
    }
    Preprocessed { pattern: segments.into_pattern(), occurrences }
}

/// Replaces every unquoted token in `output` with the digits of
/// `subsec_nanosecond`.
///
/// `output` must have been formatted from a pattern returned by
/// [`preprocess`] along with `occurrences`.
pub(crate) fn substitute(
    output: &mut String,
    occurrences: &[Occurrence],
    subsec_nanosecond: i64,
) {
    let mut cursor = 0;
    for occurrence in occurrences {
        let text = occurrence.token.text();
        let Some(found) = output.get(cursor..).and_then(|s| s.find(text))
        else {
            trace!("token {text} is missing from formatted {output:?}");
            return;
        };
        let at = cursor + found;
        if !occurrence.quoted {
            let digits = match occurrence.token {
                Token::Nanos => {
                    DecimalFormatter::new().padding(9).format(subsec_nanosecond)
                }
                Token::Micros => DecimalFormatter::new()
                    .padding(6)
                    .format(subsec_nanosecond / 1_000),
            };
            output.replace_range(at..at + text.len(), digits.as_str());
        }
        cursor = at + text.len();
    }
}

/// Runs of quoted and unquoted pattern text. Adjacent runs of the same kind
/// are merged.
#[derive(Debug, Default)]
struct Segments {
    runs: Vec<(bool, String)>,
}

impl Segments {
    fn push(&mut self, quoted: bool, text: &str) {
        match self.runs.last_mut() {
            Some((last_quoted, run)) if *last_quoted == quoted => {
                run.push_str(text)
            }
            _ => self.runs.push((quoted, text.to_string())),
        }
    }

    fn into_pattern(self) -> String {
        let mut pattern = String::new();
        for (quoted, run) in self.runs {
            if quoted {
                pattern.push('\'');
                pattern.push_str(&run);
                pattern.push('\'');
            } else {
                pattern.push_str(&run);
            }
        }
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(pattern: &str) -> String {
        preprocess(pattern).pattern
    }

    #[test]
    fn quotes_unquoted_tokens() {
        assert_eq!(rewrite("HH:mm:ss.SSS"), "HH:mm:ss.SSS");
        assert_eq!(rewrite("HH:mm:ss.NNNNNNNNN"), "HH:mm:ss.'NNNNNNNNN'");
        assert_eq!(rewrite("ss.CCCCCC"), "ss.'CCCCCC'");
        assert_eq!(rewrite("CCCCCCCCCCCC"), "'CCCCCCCCCCCC'");
    }

    #[test]
    fn merges_with_neighbouring_quotes() {
        assert_eq!(rewrite("ss'.'NNNNNNNNN"), "ss'.NNNNNNNNN'");
        assert_eq!(rewrite("NNNNNNNNN'Z'"), "'NNNNNNNNNZ'");
        assert_eq!(
            rewrite("HH:mm:ss.NNNNNNNNN.'NNNNNNNNN'.NNNNNNNNN"),
            "HH:mm:ss.'NNNNNNNNN'.'NNNNNNNNN'.'NNNNNNNNN'",
        );
        assert_eq!(rewrite("'it''s 'NNNNNNNNN"), "'it''s NNNNNNNNN'");
        assert_eq!(rewrite("''NNNNNNNNN''"), "'''NNNNNNNNN'''");
    }

    #[test]
    fn records_occurrences_in_order() {
        let found = preprocess("CCCCCC.'CCCCCC'.NNNNNNNNN.'NNNNNNNNN'");
        assert_eq!(
            found.occurrences,
            vec![
                Occurrence { token: Token::Micros, quoted: false },
                Occurrence { token: Token::Micros, quoted: true },
                Occurrence { token: Token::Nanos, quoted: false },
                Occurrence { token: Token::Nanos, quoted: true },
            ],
        );
    }

    #[test]
    fn unclosed_quotes_are_left_alone() {
        let found = preprocess("HH 'NNNNNNNNN");
        assert_eq!(found.pattern, "HH 'NNNNNNNNN");
    }

    #[test]
    fn substitutes_unquoted_tokens() {
        let found = preprocess("ss.CCCCCC.'CCCCCC'.NNNNNNNNN.'NNNNNNNNN'");
        let mut output = "07.CCCCCC.CCCCCC.NNNNNNNNN.NNNNNNNNN".to_string();
        substitute(&mut output, &found.occurrences, 345_920_678);
        assert_eq!(output, "07.345920.CCCCCC.345920678.NNNNNNNNN");

        let mut output = "NNNNNNNNN".to_string();
        let found = preprocess("NNNNNNNNN");
        substitute(&mut output, &found.occurrences, 5);
        assert_eq!(output, "000000005");
    }
}
