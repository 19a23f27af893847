// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DiscordConfig, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    RoutesConfig, ServerConfig,
};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "AVATAR_CONFIG";

/// Default config file name (extension optional, `config.toml` is found)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the file named by `AVATAR_CONFIG`, or
    /// `config.toml` in the working directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the config file,
    /// `AVATAR__SECTION__KEY` variables, then the plain `PORT` and
    /// `DISCORD_BOT_TOKEN` variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, std::env::vars().collect())
    }

    /// [`Config::load_from`] against an explicit environment instead of the
    /// process one. Blank values count as unset.
    pub fn load_with_env(
        config_path: &str,
        env: config::Map<String, String>,
    ) -> Result<Self, config::ConfigError> {
        let non_blank = |key: &str| {
            env.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };
        let port = match non_blank("PORT") {
            Some(raw) => Some(raw.parse::<i64>().map_err(|e| {
                config::ConfigError::Message(format!("Invalid PORT '{raw}': {e}"))
            })?),
            None => None,
        };
        let token = non_blank("DISCORD_BOT_TOKEN");

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 10)?
            .set_default("http.server_name", "AvatarFetcher/1.0")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("routes.static_dir", "public")?
            .set_default("routes.index_files", vec!["index.html", "index.htm"])?
            .set_default("routes.api_prefix", "/api/avatar/")?
            .set_default("discord.api_base", "https://discord.com/api/v10")?
            .set_default("discord.cdn_base", crate::identity::DEFAULT_CDN_BASE)?
            .set_default("discord.user_agent", "AvatarFetcher/1.0")?
            .set_default("discord.default_size", crate::identity::DEFAULT_AVATAR_SIZE)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("AVATAR")
                    .prefix_separator("__")
                    .separator("__")
                    .source(Some(env)),
            )
            .set_override_option("server.port", port)?
            .set_override_option("discord.bot_token", token)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bot_token().is_none() {
            return Err(config::ConfigError::Message(
                "Set DISCORD_BOT_TOKEN (or discord.bot_token) before starting".to_string(),
            ));
        }
        if self.discord.default_size == 0 {
            return Err(config::ConfigError::Message(
                "discord.default_size must be a positive integer".to_string(),
            ));
        }
        if !self.routes.api_prefix.starts_with('/') {
            return Err(config::ConfigError::Message(format!(
                "routes.api_prefix must start with '/': {}",
                self.routes.api_prefix
            )));
        }
        Ok(())
    }

    /// Configured bot token, ignoring blank values
    pub fn bot_token(&self) -> Option<&str> {
        self.discord
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
