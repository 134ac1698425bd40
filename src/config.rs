use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "varanda", about = "Admin dashboard for a real-estate listing service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the listing backend
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub agency: AgencyConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub db_path: Option<PathBuf>,
}

/// Display details for the public pages.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AgencyConfig {
    pub name: String,
    pub whatsapp: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://imobiliaria.fly.dev".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "varanda_session".to_string(),
            db_path: None,
        }
    }
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            name: "Nipia Real Estate".to_string(),
            whatsapp: "5597178810".to_string(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref backend_url) = cli.backend_url {
            config.backend.base_url = backend_url.clone();
        }

        Url::parse(&config.backend.base_url)
            .map_err(|e| anyhow::anyhow!("invalid backend.base_url: {e}"))?;

        if config.session.db_path.is_none() {
            config.session.db_path = Some(data_dir.join("varanda.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .expect("Could not determine home directory")
                .join(".varanda")
        })
    }

    pub fn session_db_path(&self) -> &PathBuf {
        self.session.db_path.as_ref().unwrap()
    }
}
