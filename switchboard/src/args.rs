use std::path::PathBuf;

use clap::Parser;

/// Switchboard completion client
#[derive(Debug, Parser)]
#[command(name = "switchboard", about = "Send a prompt to any configured LLM vendor")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "switchboard.toml", env = "SWITCHBOARD_CONFIG")]
    pub config: PathBuf,

    /// Provider entry to use (defaults to the first configured one)
    #[arg(short, long, env = "SWITCHBOARD_PROVIDER")]
    pub provider: Option<String>,

    /// Model identifier, overriding the provider default
    #[arg(short, long)]
    pub model: Option<String>,

    /// System prompt, used when the provider sets none
    #[arg(short, long)]
    pub system: Option<String>,

    /// Wait for the complete reply instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Prompt text
    #[arg(required = true, trailing_var_arg = true)]
    pub prompt: Vec<String>,
}
