//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for Em.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for Em.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Execute CODE instead of reading a file or the prompt.
    #[arg(short = 'c', value_name = "CODE", allow_hyphen_values = true, conflicts_with_all = ["interactive", "files"])]
    pub code: Option<String>,

    /// Enter the interactive prompt, after executing any files.
    #[arg(short, long)]
    pub interactive: bool,

    /// Disassemble compiled chunks instead of executing them.
    #[arg(short, long)]
    pub disasm: bool,

    /// Source files to execute, in order.
    pub files: Vec<std::path::PathBuf>,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of Em.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the interpreter,
    /// e.g., which files are executed, etc.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the interpreter.
    #[value(alias("3"))]
    Debug,

    /// Log extra information. This can include more precise debug output or
    /// even non-important errors.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
