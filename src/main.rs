use bloqueos::{
    Config,
    cli::{Cli, Commands},
    run,
};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) if path.exists() => Config::load_from_path(path)?,
        Some(_) if matches!(cli.command, Some(Commands::InitConfig)) => Config::default(),
        Some(path) => anyhow::bail!("Config file not found: {}", path.display()),
        None => Config::load()?,
    };
    config.validate()?;

    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
