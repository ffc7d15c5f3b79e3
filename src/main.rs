use anyhow::Result;
use clap::Parser;
use grammar_check::cli::Cli;
use grammar_check::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    logging::init(cli.verbose);

    cli.run().await
}
