use clap::Parser;
use codepup_exec::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    codepup_exec::run_main(cli).await
}
