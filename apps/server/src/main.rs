use anyhow::Context;
use clap::Parser;
use imt_domain::config::{LogRotation, WebConfig};
use imt_domain::constants::APP_ID;
use imt_kernel::config::load_config;
use imt_kernel::security::ensure_unprivileged;
use imt_logger::{ConsoleFormat, Logger, Rotation};
use imt_server::Server;
use imt_server::cli::{Cli, Command};
use tracing::info;

#[cfg(feature = "profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

const fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

fn init_logger(cli: &Cli, cfg: &WebConfig) -> anyhow::Result<Logger> {
    let logging = &cfg.logging;
    let mut builder = Logger::builder(APP_ID)
        .level(cli.log_level.into())
        .directives(logging.filter.as_deref())
        .console(if cli.container { ConsoleFormat::Json } else { ConsoleFormat::Compact });

    if cli.log_to_file() {
        builder = builder.file(&logging.directory, rotation(logging.rotation), logging.max_files);
    }
    builder.init().context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "profiling")]
    let _profiler = dhat::Profiler::new_heap();

    let cli = Cli::parse();
    let cfg: WebConfig =
        load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;

    let log = init_logger(&cli, &cfg)?;
    info!(config = ?cli.config, log_dir = ?log.directory(), "Configuration loaded");

    ensure_unprivileged().context("Refusing to start")?;

    match cli.command {
        Command::Serve => Server::builder().config(cfg).build()?.run().await,
    }
}
