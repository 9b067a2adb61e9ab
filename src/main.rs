use anyhow::Result;
use clap::Parser;
use mhan_util::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mhan_util=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
