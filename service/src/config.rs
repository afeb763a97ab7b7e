use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default Anthropic API base URL used when `ANTHROPIC_BASE_URL` is not set.
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
/// Model the oracle persona was tuned against.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The base URL of the Anthropic API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_ANTHROPIC_BASE_URL)]
    anthropic_base_url: String,

    /// The model the relay asks for.
    #[arg(long, env, default_value = DEFAULT_ANTHROPIC_MODEL)]
    anthropic_model: String,

    /// Upper bound on tokens generated per reply.
    #[arg(long, env, default_value_t = 1024)]
    pub anthropic_max_tokens: u32,

    /// Value of the `anthropic-version` header.
    #[arg(long, env, default_value = DEFAULT_ANTHROPIC_VERSION)]
    anthropic_version: String,

    /// Number of most recent history entries forwarded with each message.
    #[arg(long, env, default_value_t = 10)]
    pub relay_history_limit: usize,

    /// Optional file whose contents replace the built-in system prompt.
    #[arg(long, env)]
    system_prompt_path: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the Anthropic API base URL without a trailing slash.
    pub fn anthropic_base_url(&self) -> &str {
        self.anthropic_base_url.trim_end_matches('/')
    }

    pub fn set_anthropic_base_url(mut self, base_url: String) -> Self {
        self.anthropic_base_url = base_url;
        self
    }

    pub fn anthropic_model(&self) -> &str {
        &self.anthropic_model
    }

    pub fn anthropic_version(&self) -> &str {
        &self.anthropic_version
    }

    /// Returns the system prompt override path, if configured.
    pub fn system_prompt_path(&self) -> Option<String> {
        self.system_prompt_path.clone()
    }

    pub fn set_system_prompt_path(mut self, path: Option<String>) -> Self {
        self.system_prompt_path = path;
        self
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}
