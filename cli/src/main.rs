mod commands;
mod terminal;

use commands::{CommandLine, sweep};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.log_file.as_deref())?;

    sweep::sweep(commands).await
}
