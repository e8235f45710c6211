use clap::Parser;
use range_lens::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Warn, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, global_level)
        .filter(Some("range_lens"), my_code_level)
        .init();

    let args = Cli::parse();
    run(args).await
}
