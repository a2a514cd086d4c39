use std::path::PathBuf;

use clap::Parser;

/// Voxgate speech gateway
#[derive(Debug, Parser)]
#[command(name = "voxgate", about = "Voice-output gateway for assistant replies")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "voxgate.toml", env = "VOXGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "VOXGATE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
