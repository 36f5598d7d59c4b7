//! Command-line interface definitions for News Digest.
//!
//! Every option can also come from the environment (a `.env` file is loaded
//! first). Anything not given here falls back to the YAML settings file
//! passed with `--config`, then to built-in defaults.

use clap::Parser;

/// Command-line arguments for the News Digest server.
///
/// # Examples
///
/// ```sh
/// # Keys from the environment, defaults for everything else
/// NEWS_API_KEY=... HUGGINGFACE_API_KEY=... news_digest
///
/// # Explicit port and CORS allow-list
/// news_digest --port 8080 --allowed-origins https://app.example.com,http://localhost:3000
///
/// # Tunables from a settings file
/// news_digest --config ./settings.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// News provider API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Inference provider API key
    #[arg(long, env = "HUGGINGFACE_API_KEY", hide_env_values = true)]
    pub inference_api_key: Option<String>,

    /// Origins allowed to call the API (comma separated)
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    /// Identify rate-limited clients by X-Forwarded-For / X-Real-IP
    #[arg(long, env = "TRUST_PROXY_HEADERS")]
    pub trust_proxy_headers: Option<bool>,
}
