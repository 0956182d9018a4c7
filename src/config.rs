// Run configuration and credential sources.
// Resolves CLI arguments and the environment into explicit settings.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::paths::default_cache_dir;
use crate::cli::Cli;
use crate::export::ExportFormat;
use crate::github::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub's maximum page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 100;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable consulted for a token when none is passed explicitly.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Cached lists older than this are refetched.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub per_page: u32,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("followback/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Local cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub ttl: Duration,
    /// When false, reads always miss and writes are skipped.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir().unwrap_or_else(|| PathBuf::from(".cache")),
            ttl: DEFAULT_CACHE_TTL,
            enabled: true,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub format: ExportFormat,
    /// Also write mutual, all-followers, and all-following lists.
    pub all: bool,
    pub enabled: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            format: ExportFormat::default(),
            all: false,
            enabled: true,
        }
    }
}

/// Fully resolved settings for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub client: ClientConfig,
    pub cache: CacheConfig,
    pub export: ExportConfig,
    pub retry: RetryPolicy,
    pub max_display: usize,
}

impl Config {
    /// Build the run configuration from parsed arguments.
    ///
    /// The token comes from `credentials`, which callers typically build with
    /// [`CredentialChain::for_cli`].
    pub fn from_cli(cli: &Cli, credentials: &dyn CredentialSource) -> Self {
        let client = ClientConfig {
            base_url: cli.api_url.clone(),
            token: credentials.token(),
            ..ClientConfig::default()
        };

        let mut cache = CacheConfig {
            ttl: Duration::from_secs(cli.cache_ttl),
            enabled: !cli.no_cache,
            ..CacheConfig::default()
        };
        if let Some(dir) = &cli.cache_dir {
            cache.dir = dir.clone();
        }

        let export = ExportConfig {
            dir: cli.export_dir.clone(),
            format: cli.export_format,
            all: cli.export_all,
            enabled: !cli.no_export,
        };

        let retry = if cli.retries == 0 {
            RetryPolicy::none()
        } else {
            RetryPolicy::exponential(
                cli.retries.saturating_add(1),
                Duration::from_millis(500),
                Duration::from_secs(8),
            )
        };

        Self {
            client,
            cache,
            export,
            retry,
            max_display: cli.max_display,
        }
    }
}

/// Supplies an optional API token.
pub trait CredentialSource {
    fn token(&self) -> Option<String>;
}

/// A token known up front, e.g. from `--token`.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl CredentialSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvToken {
    pub var: String,
}

impl Default for EnvToken {
    fn default() -> Self {
        Self {
            var: TOKEN_ENV_VAR.to_string(),
        }
    }
}

impl CredentialSource for EnvToken {
    fn token(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// Asks on the terminal. Yields nothing when stdin is not interactive.
#[derive(Debug, Clone, Default)]
pub struct PromptToken;

impl CredentialSource for PromptToken {
    fn token(&self) -> Option<String> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return None;
        }

        let mut stderr = io::stderr();
        let _ = writeln!(
            stderr,
            "No GitHub API token found. A token raises the rate limit from 60 to 5000 requests/hour."
        );
        let _ = write!(stderr, "Enter a token (leave empty to continue without): ");
        let _ = stderr.flush();

        let mut line = String::new();
        stdin.lock().read_line(&mut line).ok()?;
        Some(line.trim().to_string())
    }
}

/// Tries each source in order and returns the first non-empty token.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// `--token`, then `GITHUB_TOKEN`, then an interactive prompt unless disabled.
    pub fn for_cli(cli: &Cli) -> Self {
        let chain = Self::new()
            .with(StaticToken(cli.token.clone()))
            .with(EnvToken::default());
        if cli.no_prompt {
            chain
        } else {
            chain.with(PromptToken)
        }
    }
}

impl CredentialSource for CredentialChain {
    fn token(&self) -> Option<String> {
        self.sources
            .iter()
            .filter_map(|source| source.token())
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty())
    }
}
