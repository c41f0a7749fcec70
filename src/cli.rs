use argh::FromArgs;

#[derive(FromArgs, Debug)]
/// Minimal interactive shell: runs one external command per line and remembers
/// the last one. Type `last-command` to inspect it and `exit` to quit.
pub struct Options {
    #[argh(option, default = "crate::shell::DEFAULT_PROMPT.to_string()")]
    /// prompt printed before every line.
    pub prompt: String,

    #[argh(switch)]
    /// read plain lines from stdin instead of using the line editor.
    /// Implied when stdin is not a terminal.
    pub plain: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::from_args(&["last_shell"], &[]).unwrap();
        assert_eq!(options.prompt, "> ");
        assert!(!options.plain);
    }

    #[test]
    fn test_prompt_and_plain() {
        let options = Options::from_args(&["last_shell"], &["--prompt", "$ ", "--plain"]).unwrap();
        assert_eq!(options.prompt, "$ ");
        assert!(options.plain);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Options::from_args(&["last_shell"], &["--verbose"]).is_err());
    }
}
