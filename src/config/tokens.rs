//! Token grammar for configuration lines.
//!
//! Tokens are separated by whitespace and `=`. A quoted string runs from `"` to the next `"`, or
//! to the end of the line if the closing quote is missing.

use nom::{
    bytes::complete::{take_till, take_while, take_while1},
    character::complete::char,
    combinator::opt,
    sequence::{delimited, preceded},
    IResult,
};

pub(crate) const COMMENT: char = ';';

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t' || c == '=' || c == '\r' || c == '\n'
}

pub(crate) fn separators(input: &str) -> IResult<&str, &str> {
    take_while(is_separator)(input)
}

pub(crate) fn token(input: &str) -> IResult<&str, &str> {
    preceded(separators, take_while1(|c| !is_separator(c)))(input)
}

pub(crate) fn quoted(input: &str) -> IResult<&str, &str> {
    preceded(
        separators,
        delimited(char('"'), take_till(|c| c == '"'), opt(char('"'))),
    )(input)
}

/// Strips a trailing comment from a line.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT) {
        Some(index) => &line[..index],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_skips_separators() {
        assert_eq!(token("  Armor = 150"), Ok((" = 150", "Armor")));
        assert_eq!(token(" = 150"), Ok(("", "150")));
        assert!(token(" \t= ").is_err());
    }

    #[test]
    fn test_quoted() {
        assert_eq!(quoted(r#" = "Heavy Tank" rest"#), Ok((" rest", "Heavy Tank")));
        assert_eq!(quoted(r#""unterminated"#), Ok(("", "unterminated")));
        assert!(quoted("bare").is_err());
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("Armor = 150 ; heavy"), "Armor = 150 ");
        assert_eq!(strip_comment("; only a comment"), "");
        assert_eq!(strip_comment("End"), "End");
    }
}
