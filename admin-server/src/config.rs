//! Command line and environment configuration for the admin server

use axum_mysql_admin::config::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use axum_mysql_admin::AdminConfig;
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

/// Database engine the server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// MySQL or MariaDB server
    #[default]
    Mysql,
    /// SQLite database file (`database` is the file path)
    Sqlite,
}

#[derive(Debug, Parser)]
#[command(name = "admin-server", version, about = "Single-session database administration backend")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "ADMIN_LISTEN", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub listen: IpAddr,

    /// Port to listen on
    #[arg(long, env = "ADMIN_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// URL prefix for the API and static files
    #[arg(long, env = "ADMIN_BASE_PATH", default_value = "")]
    pub base_path: String,

    /// Directory of static frontend files, served when it exists
    #[arg(long, env = "ADMIN_STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Database engine
    #[arg(long, env = "ADMIN_BACKEND", value_enum, default_value_t = Backend::Mysql)]
    pub backend: Backend,

    /// Rows per page when a request gives no usable limit
    #[arg(long, env = "ADMIN_DEFAULT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub default_page_size: u64,

    /// Largest page a request may ask for
    #[arg(long, env = "ADMIN_MAX_PAGE_SIZE", default_value_t = DEFAULT_MAX_PAGE_SIZE)]
    pub max_page_size: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "ADMIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "ADMIN_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.listen, self.port)
    }

    pub fn admin_config(&self) -> AdminConfig {
        AdminConfig::new(self.default_page_size, self.max_page_size)
    }
}
