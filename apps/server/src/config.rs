//! Server configuration: serialized defaults, then an optional TOML file,
//! then `GEOCAT_*` environment variables (`__` separates nested keys), then
//! command-line flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use geocat_catalog::PermissionDefaults;
use geocat_core::Principal;
use geocat_runtime::RuntimeConfig;
use serde::{Deserialize, Serialize};

/// Command-line flags. Flags override every other source.
#[derive(Debug, Default, Parser)]
#[command(name = "geocat-server", version, about = "geocat resource service")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "GEOCAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Number of dispatcher workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log filter directive, e.g. `info` or `geocat_runtime=debug,info`.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// The `server` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Listen address.
    pub bind: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

/// Everything the server reads at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener.
    pub server: HttpConfig,
    /// Workers, queue and watchdog.
    pub runtime: RuntimeConfig,
    /// Default ACL for new resources.
    pub permissions: PermissionDefaults,
    /// Logging.
    pub log: geocat_log::Config,
    /// Users known to the in-memory directory.
    pub users: Vec<Principal>,
}

impl ServerConfig {
    /// Defaults, file and environment, without the flags.
    pub fn figment(config_file: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        // GEOCAT_LOG and GEOCAT_LOG_FORMAT belong to the logger presets.
        figment.merge(
            Env::prefixed("GEOCAT_")
                .split("__")
                .ignore(&["log", "log_format", "config"]),
        )
    }

    /// Layer the flags on top of `figment` and extract.
    pub fn from_figment(figment: Figment, cli: &Cli) -> Result<Self, figment::Error> {
        let mut figment = figment;
        if let Some(bind) = cli.bind {
            figment = figment.merge(("server.bind", bind));
        }
        if let Some(workers) = cli.workers {
            figment = figment.merge(("runtime.workers", workers));
        }
        if let Some(level) = &cli.log_level {
            figment = figment.merge(("log.level", level));
        }
        figment.extract()
    }

    /// Load the full configuration for `cli`.
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        Self::from_figment(Self::figment(cli.config.as_ref()), cli)
    }
}
