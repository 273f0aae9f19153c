//! Server configuration.
//!
//! Every option can come from the command line or a `CATALOG_*`
//! environment variable; the command line wins.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "catalog", version, about = "Serve the shop catalog over HTTP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "CATALOG_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory holding uploaded item images (created if missing).
    #[arg(long, env = "CATALOG_IMAGE_DIR", default_value = "public/images")]
    pub image_dir: PathBuf,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "CATALOG_LOG", default_value = "shop_catalog=info,catalog=info")]
    pub log: String,

    /// Populate the catalog with sample data on startup.
    #[arg(long, env = "CATALOG_SEED")]
    pub seed: bool,

    /// Largest accepted request body, in bytes.
    #[arg(long, env = "CATALOG_MAX_UPLOAD", default_value_t = 10 * 1024 * 1024)]
    pub max_upload: usize,
}

impl Config {
    /// Parse from an explicit argument list (the first item is the program name).
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
