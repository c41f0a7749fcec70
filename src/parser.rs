/// Token that marks the next word as the output file.
pub const REDIRECT: &str = ">";

/// A command line split into its argument vector and redirect target.
///
/// `output_file` is empty when no redirection was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub arguments: Vec<String>,
    pub output_file: String,
}

/// Split a raw input line on runs of whitespace.
///
/// Words seen before the first `>` form the argument vector. Every word after a
/// `>` overwrites the output file, so `a > b c` redirects to `c`. A trailing `>`
/// with nothing after it leaves the output file empty.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut parsed = ParsedLine::default();
    let mut redirecting = false;

    for token in line.split_whitespace() {
        if token == REDIRECT {
            redirecting = true;
        } else if redirecting {
            parsed.output_file = token.to_string();
        } else {
            parsed.arguments.push(token.to_string());
        }
    }

    parsed
}
