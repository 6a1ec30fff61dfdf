use clap::CommandFactory;
use clap_complete::Shell;

use crate::context::CliResult;
use crate::Cli;

pub fn run(shell: Shell) -> CliResult {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "questtimer", &mut std::io::stdout());
    Ok(())
}
