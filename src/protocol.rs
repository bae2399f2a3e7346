//! Tokenizer for the line-oriented client protocol.
//!
//! [`parse_line`] never fails in the `Result` sense — a line that doesn't
//! match the grammar simply parses to [`Command::Invalid`], which the
//! connection handler turns into the help text.

/// One fully-parsed client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Look,
    Help,
    Bye,
    Dig(i64, i64),
    Flag(i64, i64),
    Deflag(i64, i64),
    Invalid,
}

/// Parses a single line, already stripped of its terminator.
///
/// ```text
/// LINE ::= "look" | "help" | "bye"
///        | "dig"    SP INT SP INT
///        | "flag"   SP INT SP INT
///        | "deflag" SP INT SP INT
/// SP   ::= " "
/// INT  ::= "-"? [0-9]+
/// ```
pub fn parse_line(line: &str) -> Command {
    let mut tokens = line.split(' ');

    match tokens.next() {
        Some("look") if tokens.next().is_none() => Command::Look,
        Some("help") if tokens.next().is_none() => Command::Help,
        Some("bye") if tokens.next().is_none() => Command::Bye,
        Some(keyword @ ("dig" | "flag" | "deflag")) => {
            let (Some(x), Some(y), None) = (tokens.next(), tokens.next(), tokens.next()) else {
                return Command::Invalid;
            };

            let (Some(x), Some(y)) = (parse_int(x), parse_int(y)) else {
                return Command::Invalid;
            };

            match keyword {
                "dig" => Command::Dig(x, y),
                "flag" => Command::Flag(x, y),
                "deflag" => Command::Deflag(x, y),
                _ => unreachable!(),
            }
        }
        _ => Command::Invalid,
    }
}

fn parse_int(token: &str) -> Option<i64> {
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_bare_keywords() {
        assert_eq!(parse_line("look"), Command::Look);
        assert_eq!(parse_line("help"), Command::Help);
        assert_eq!(parse_line("bye"), Command::Bye);
    }

    #[test]
    fn parses_coordinate_commands() {
        assert_eq!(parse_line("dig 3 4"), Command::Dig(3, 4));
        assert_eq!(parse_line("flag 0 0"), Command::Flag(0, 0));
        assert_eq!(parse_line("deflag 1 2"), Command::Deflag(1, 2));
    }

    #[test]
    fn accepts_negative_and_out_of_range_looking_integers() {
        assert_eq!(parse_line("dig -1 -999999999999"), Command::Dig(-1, -999_999_999_999));
        assert_eq!(parse_line("dig 99999999999 5"), Command::Dig(99_999_999_999, 5));
    }

    #[rstest]
    #[case("")]
    #[case("dig 1")]
    #[case("dig 1 2 3")]
    #[case("look now")]
    #[case("dig a b")]
    #[case("dig 1.5 2")]
    #[case("explode 1 2")]
    #[case("dig  1 2")] // a doubled separator yields an empty token
    fn rejects_malformed_lines(#[case] line: &str) {
        assert_eq!(parse_line(line), Command::Invalid);
    }
}
