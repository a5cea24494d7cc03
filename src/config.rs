use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::query::PageSizes;
use crate::theme::Theme;
use crate::types::Resource;

/// ffx - terminal explorer for a ledger middleware node
///
/// Browse messages and datatypes of a namespace with paging and filters.
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "ffx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal explorer for ledger middleware messages and datatypes", long_about = None)]
pub struct CliArgs {
    /// TOML config file
    #[arg(short, long, env = "FFX_CONFIG")]
    pub config: Option<PathBuf>,

    /// REST API root, e.g. http://127.0.0.1:5000/api/v1
    #[arg(long, env = "FF_API_ROOT")]
    pub api_root: Option<String>,

    /// Namespace to browse
    #[arg(short, long, env = "FF_NAMESPACE")]
    pub namespace: Option<String>,

    /// Initial view: messages or datatypes
    #[arg(short, long, env = "FFX_RESOURCE", value_parser = clap::value_parser!(Resource))]
    pub resource: Option<Resource>,

    /// Allowed rows-per-page values (comma-separated, first is default)
    #[arg(long, env = "FFX_PAGE_SIZES")]
    pub page_sizes: Option<String>,

    /// Filter applied on startup (e.g. "created:24h topic:orders")
    #[arg(short, long, env = "FFX_FILTER")]
    pub filter: Option<String>,

    /// Request timeout in milliseconds (1000-60000)
    #[arg(long, env = "FFX_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Retries for 429 and transport errors (0-10)
    #[arg(long, env = "FFX_RETRIES")]
    pub retries: Option<u32>,

    /// Auto-refresh interval in milliseconds (0 disables, else 1000-600000)
    #[arg(long, env = "FFX_REFRESH_MS")]
    pub refresh_ms: Option<u64>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "FFX_RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Color theme: nord, dos-blue, amber-crt
    #[arg(long, env = "FFX_THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Bearer token sent with every request
    #[arg(long, env = "FF_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, env = "FFX_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// `--config` file layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub api_root: Option<String>,
    pub namespace: Option<String>,
    pub resource: Option<String>,
    pub page_sizes: Option<Vec<u32>>,
    pub filter: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub refresh_ms: Option<u64>,
    pub render_fps: Option<u32>,
    pub theme: Option<String>,
    pub auth_token: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_root: String,
    pub namespace: String,
    pub resource: Resource,
    pub page_sizes: PageSizes,
    pub filter: String,
    pub timeout_ms: u64,
    pub retries: u32,
    /// 0 = no auto-refresh
    pub refresh_ms: u64,
    pub render_fps: u32,
    pub theme: Theme,
    pub auth_token: Option<String>,
    pub log_file: PathBuf,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Load configuration from CLI args, environment and the optional config file
pub fn load() -> Result<Config> {
    let args = CliArgs::parse();
    let file = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            load_file(path)?
        }
        None => ConfigFile::default(),
    };
    resolve(args, file)
}

/// Merge parsed args (which already include env) over file values and defaults
pub fn resolve(args: CliArgs, file: ConfigFile) -> Result<Config> {
    let api_root = args
        .api_root
        .or(file.api_root)
        .unwrap_or_else(|| "http://127.0.0.1:5000/api/v1".to_string());
    validate_url(&api_root, "FF_API_ROOT")?;

    let namespace = args
        .namespace
        .or(file.namespace)
        .unwrap_or_else(|| "default".to_string());
    if namespace.trim().is_empty() {
        return Err(anyhow!("FF_NAMESPACE cannot be empty"));
    }

    let resource = match args.resource {
        Some(r) => r,
        None => match file.resource {
            Some(s) => s.parse().context("resource in config file")?,
            None => Resource::Messages,
        },
    };

    let page_sizes = match (args.page_sizes, file.page_sizes) {
        (Some(s), _) => PageSizes::parse(&s).context("FFX_PAGE_SIZES")?,
        (None, Some(v)) => PageSizes::new(v).context("page_sizes in config file")?,
        (None, None) => PageSizes::default(),
    };
    for &size in page_sizes.as_slice() {
        validate_in_range(size, 1, 1000, "FFX_PAGE_SIZES entry")?;
    }

    let timeout_ms = args.timeout_ms.or(file.timeout_ms).unwrap_or(8000);
    let timeout_ms = validate_in_range(timeout_ms, 1000, 60000, "FFX_TIMEOUT_MS")?;

    let retries = args.retries.or(file.retries).unwrap_or(2);
    let retries = validate_in_range(retries, 0, 10, "FFX_RETRIES")?;

    let refresh_ms = args.refresh_ms.or(file.refresh_ms).unwrap_or(0);
    if refresh_ms != 0 {
        validate_in_range(refresh_ms, 1000, 600_000, "FFX_REFRESH_MS")?;
    }

    let render_fps = args.render_fps.or(file.render_fps).unwrap_or(30);
    let render_fps = validate_in_range(render_fps, 1, 120, "FFX_RENDER_FPS")?;

    let theme = match args.theme {
        Some(t) => t,
        None => match file.theme {
            Some(s) => s.parse().context("theme in config file")?,
            None => Theme::default(),
        },
    };

    Ok(Config {
        api_root,
        namespace,
        resource,
        page_sizes,
        filter: args.filter.or(file.filter).unwrap_or_default(),
        timeout_ms,
        retries,
        refresh_ms,
        render_fps,
        theme,
        auth_token: args.auth_token.or(file.auth_token),
        log_file: args
            .log_file
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from("ffx.log")),
    })
}

impl Config {
    pub fn log_summary(&self) {
        log::info!("ffx configuration:");
        log::info!("  API root: {}", self.api_root);
        log::info!("  Namespace: {}", self.namespace);
        log::info!("  View: {}", self.resource);
        log::info!("  Page sizes: {:?}", self.page_sizes.as_slice());
        log::info!("  Timeout: {}ms, retries: {}", self.timeout_ms, self.retries);
        if self.refresh_ms > 0 {
            log::info!("  Auto-refresh: {}ms", self.refresh_ms);
        }
        if self.auth_token.is_some() {
            log::info!("  Auth: configured");
        }
    }
}
