use clap::Parser;
use std::path::PathBuf;

/// Real-time session relay for shared live-coding rooms.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct Config {
    /// Address to bind to
    #[arg(long, env = "KILOBEAT_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[arg(short, long, env = "KILOBEAT_PORT", default_value_t = 8765)]
    pub port: u16,
    /// Directory holding the client bundle
    #[arg(long, env = "KILOBEAT_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,
}
