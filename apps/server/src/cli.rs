use clap::{Parser, Subcommand, ValueEnum};
use imt_domain::constants::{APP_DESCRIPTION, APP_ID};
use imt_logger::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = APP_ID, about = APP_DESCRIPTION, version)]
pub struct Cli {
    /// Set logging level.
    #[arg(long, value_enum, env = "IMMANENT_TECH_WEB_LOGLEVEL", default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Don't write to a log file.
    #[arg(long, env = "IMMANENT_TECH_WEB_NOLOGFILE", global = true)]
    pub no_log_file: bool,

    /// Log JSON to the console and keep no log file.
    #[arg(long, env = "IMMANENT_TECH_WEB_CONTAINER", global = true)]
    pub container: bool,

    /// Configuration file, without extension. Defaults to `server`.
    #[arg(long, short, env = "IMMANENT_TECH_WEB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run server.
    Serve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Info,
    Debug,
    Trace,
}

impl Cli {
    /// Whether rolling log files are written.
    pub const fn log_to_file(&self) -> bool {
        !(self.no_log_file || self.container)
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
