use anyhow::Result;
use last_shell::cli::Options;
use last_shell::{Editor, PlainLines, Shell};
use std::io::{self, IsTerminal};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options: Options = argh::from_env();
    log::debug!("{options:?}");

    if options.plain || !io::stdin().is_terminal() {
        let input = PlainLines::new(io::stdin().lock());
        Shell::new(input, io::stdout(), io::stderr())
            .with_prompt(options.prompt)
            .run()
    } else {
        Shell::new(Editor::new()?, io::stdout(), io::stderr())
            .with_prompt(options.prompt)
            .run()
    }
}
