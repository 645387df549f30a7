//! Configuration loading and validation
//!
//! Settings come from the process environment, overlaid by a `.env` file in
//! the working directory when one exists, or from a single file named with
//! `--config` (TOML, or dotenv when the file is a `.env`). Every source feeds
//! the same validation, so a configuration is either complete or rejected as
//! a unit before any network call is made.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Dotenv file read from the working directory
pub const DOTENV_FILE: &str = ".env";

/// Default advisory run interval in seconds
pub const DEFAULT_RUN_INTERVAL: &str = "3600";

/// Keys required regardless of export mode
pub const REQUIRED_KEYS: [&str; 4] = [
    "unimus_server_address",
    "unimus_api_key",
    "backup_type",
    "export_type",
];

/// Keys required when the export mode is `git`
pub const GIT_REQUIRED_KEYS: [&str; 7] = [
    "git_username",
    "git_email",
    "git_server_protocol",
    "git_server_address",
    "git_port",
    "git_repo_name",
    "git_branch",
];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required key missing or empty
    #[error("{0} is not set")]
    MissingKey(String),

    /// HTTP(S) git remote without a password
    #[error("a git password is required for the {0} protocol")]
    MissingGitPassword(String),

    /// Key present but not acceptable
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Offending key
        key: String,
        /// Value as found
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Config file could not be read
    #[error("failed to read config file {path}: {reason}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        reason: String,
    },

    /// Config file could not be parsed
    #[error("failed to parse config file {path}: {reason}")]
    Parse {
        /// File path
        path: String,
        /// Underlying error
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which backups to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    /// Every historical backup of every device
    All,
    /// Only the most recent backup per device
    Latest,
}

impl FromStr for BackupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(BackupMode::All),
            "latest" => Ok(BackupMode::Latest),
            _ => Err(format!("invalid backup type: {s}. Valid options: latest, all")),
        }
    }
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMode::All => f.write_str("all"),
            BackupMode::Latest => f.write_str("latest"),
        }
    }
}

/// What happens after backups are written locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMode {
    /// Commit and push the backup tree
    Git,
    /// Stop after writing files; holds the configured value
    Local(String),
}

impl ExportMode {
    fn parse(value: &str) -> Self {
        if value.trim() == "git" {
            ExportMode::Git
        } else {
            ExportMode::Local(value.trim().to_string())
        }
    }

    /// Whether the git publisher runs
    pub fn is_git(&self) -> bool {
        matches!(self, ExportMode::Git)
    }
}

/// Git remote settings, present only in `git` export mode
#[derive(Clone, PartialEq, Eq)]
pub struct GitSettings {
    /// Remote user name, also used as commit author name
    pub username: String,
    /// Commit author email
    pub email: String,
    /// `ssh`, `http` or `https`; other values are rejected when publishing
    pub protocol: String,
    /// Git server host
    pub server_address: String,
    /// Git server port
    pub port: u16,
    /// Repository path on the server
    pub repo_name: String,
    /// Branch to push
    pub branch: String,
    /// Optional for ssh, required for http(s)
    pub password: Option<String>,
}

impl fmt::Debug for GitSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitSettings")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("protocol", &self.protocol)
            .field("server_address", &self.server_address)
            .field("port", &self.port)
            .field("repo_name", &self.repo_name)
            .field("branch", &self.branch)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Validated configuration for one run
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the management server
    pub server_address: String,
    /// Bearer token for the API
    pub api_key: String,
    /// Backup selection mode
    pub backup_mode: BackupMode,
    /// Export mode
    pub export_mode: ExportMode,
    /// Git settings when `export_mode` is git
    pub git: Option<GitSettings>,
    /// Advisory re-run interval, only logged
    pub run_interval: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_address", &self.server_address)
            .field("api_key", &"***")
            .field("backup_mode", &self.backup_mode)
            .field("export_mode", &self.export_mode)
            .field("git", &self.git)
            .field("run_interval", &self.run_interval)
            .finish()
    }
}

impl Config {
    /// Load from the process environment and `./.env`
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_in(Path::new("."))
    }

    /// Load from the process environment and `<dir>/.env`
    ///
    /// Values in the dotenv file take precedence over the environment. Each
    /// key is looked up as written (lowercase) and then uppercased.
    pub fn from_env_in(dir: &Path) -> ConfigResult<Self> {
        let dotenv_path = dir.join(DOTENV_FILE);
        let dotenv = if dotenv_path.is_file() {
            read_dotenv(&dotenv_path)?
        } else {
            HashMap::new()
        };

        Self::from_lookup(|key| {
            let upper = key.to_uppercase();
            dotenv
                .get(key)
                .or_else(|| dotenv.get(&upper))
                .cloned()
                .or_else(|| std::env::var(key).ok())
                .or_else(|| std::env::var(&upper).ok())
        })
    }

    /// Load from a single file named on the command line
    ///
    /// A file called `.env` or with the `env` extension is read as dotenv,
    /// anything else as TOML.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if is_dotenv(path) {
            let values = read_dotenv(path)?;
            return Self::from_lookup(|key| {
                values
                    .get(key)
                    .or_else(|| values.get(&key.to_uppercase()))
                    .cloned()
            });
        }
        Self::from_toml_file(path)
    }

    /// Load from a TOML file with top-level keys
    ///
    /// Strings are taken as-is; integers and booleans are converted to their
    /// textual form so `git_port = 443` works as well as `git_port = "443"`.
    pub fn from_toml_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let table: toml::Table = content.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let values: HashMap<String, String> = table
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    _ => return None,
                };
                Some((key.to_lowercase(), text))
            })
            .collect();

        Self::from_lookup(|key| values.get(key).cloned())
    }

    /// Validate settings provided by an arbitrary lookup
    ///
    /// Empty values count as missing. Keys are checked in a fixed order so the
    /// first missing key reported is stable.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingKey(key.to_string()));

        for key in REQUIRED_KEYS {
            require(key)?;
        }

        let server_address = require("unimus_server_address")?;
        let api_key = require("unimus_api_key")?;
        let backup_raw = require("backup_type")?;
        let backup_mode = backup_raw
            .parse::<BackupMode>()
            .map_err(|reason| ConfigError::InvalidValue {
                key: "backup_type".to_string(),
                value: backup_raw.clone(),
                reason,
            })?;
        let export_mode = ExportMode::parse(&require("export_type")?);

        let git = if export_mode.is_git() {
            for key in GIT_REQUIRED_KEYS {
                require(key)?;
            }

            let protocol = require("git_server_protocol")?;
            let password = get("git_password");
            let normalized = protocol.to_lowercase();
            if (normalized == "http" || normalized == "https") && password.is_none() {
                return Err(ConfigError::MissingGitPassword(normalized));
            }

            let port_raw = require("git_port")?;
            let port = port_raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "git_port".to_string(),
                value: port_raw.clone(),
                reason: e.to_string(),
            })?;

            Some(GitSettings {
                username: require("git_username")?,
                email: require("git_email")?,
                protocol,
                server_address: require("git_server_address")?,
                port,
                repo_name: require("git_repo_name")?,
                branch: require("git_branch")?,
                password,
            })
        } else {
            None
        };

        let run_interval = get("run_interval").unwrap_or_else(|| DEFAULT_RUN_INTERVAL.to_string());

        Ok(Config {
            server_address,
            api_key,
            backup_mode,
            export_mode,
            git,
            run_interval,
        })
    }

    /// Multi-line summary with secrets masked
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Server address: {}", self.server_address),
            "API key: ***".to_string(),
            format!("Backup type: {}", self.backup_mode),
            format!(
                "Export type: {}",
                match &self.export_mode {
                    ExportMode::Git => "git",
                    ExportMode::Local(v) => v.as_str(),
                }
            ),
            format!("Run interval: {}s", self.run_interval),
        ];

        if let Some(git) = &self.git {
            lines.push(format!(
                "Git remote: {}://{}@{}:{}/{} (branch {})",
                git.protocol.to_lowercase(),
                git.username,
                git.server_address,
                git.port,
                git.repo_name,
                git.branch
            ));
            lines.push(format!("Git author: {} <{}>", git.username, git.email));
            lines.push(format!(
                "Git password: {}",
                if git.password.is_some() { "set" } else { "not set" }
            ));
        }

        lines.join("\n")
    }
}

fn is_dotenv(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == DOTENV_FILE)
        || path.extension().is_some_and(|e| e == "env")
}

/// Read a dotenv file into a key → value map
fn read_dotenv(path: &Path) -> ConfigResult<HashMap<String, String>> {
    let parse_error = |e: dotenvy::Error| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let entries = dotenvy::from_path_iter(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    entries
        .map(|entry| entry.map_err(parse_error))
        .collect()
}
