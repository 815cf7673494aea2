use clap::{Parser, Subcommand, ValueEnum};
use pinhole_redirector::ExpiryPolicy;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_STORAGE_BACKEND";
pub const STORE_PATH_ENV: &str = "PINHOLE_STORE_PATH";
pub const BASE_URL_ENV: &str = "PINHOLE_BASE_URL";
pub const EXPIRY_POLICY_ENV: &str = "PINHOLE_EXPIRY_POLICY";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";

pub const DEFAULT_STORE_PATH: &str = "pinhole.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "file")]
    File,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExpiryPolicyArg {
    /// Expired links keep resolving until purged
    Ignore,
    /// Expired links resolve as not found
    Enforce,
}

impl Display for ExpiryPolicyArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryPolicyArg::Ignore => write!(f, "ignore"),
            ExpiryPolicyArg::Enforce => write!(f, "enforce"),
        }
    }
}

impl From<ExpiryPolicyArg> for ExpiryPolicy {
    fn from(arg: ExpiryPolicyArg) -> Self {
        match arg {
            ExpiryPolicyArg::Ignore => ExpiryPolicy::Ignore,
            ExpiryPolicyArg::Enforce => ExpiryPolicy::Enforce,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pinhole", version, about = "Create, resolve and track short links")]
pub struct CLI {
    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::File,
        global = true
    )]
    pub storage: StorageBackendArg,

    /// JSON document holding the link registry
    #[arg(long, env = STORE_PATH_ENV, default_value = DEFAULT_STORE_PATH, global = true)]
    pub store_path: PathBuf,

    /// Prefix of generated short URLs
    #[arg(
        long,
        env = BASE_URL_ENV,
        default_value = pinhole_registry::DEFAULT_BASE_URL,
        global = true
    )]
    pub base_url: String,

    #[arg(
        long,
        env = EXPIRY_POLICY_ENV,
        value_enum,
        default_value_t = ExpiryPolicyArg::Ignore,
        global = true
    )]
    pub expiry_policy: ExpiryPolicyArg,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text,
        global = true
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Shorten a URL
    Create {
        url: String,
        /// Lifetime in minutes
        #[arg(long, allow_negative_numbers = true)]
        validity: Option<i64>,
        /// Use this short code instead of a generated one
        #[arg(long)]
        code: Option<String>,
    },
    /// List every link in creation order
    List,
    /// Print a link with its click history as JSON
    Show { code: String },
    /// Print the URL a code redirects to
    Resolve { code: String },
    /// Record a visit to a link
    Click {
        code: String,
        #[arg(long, default_value = pinhole_registry::tracker::DEFAULT_SOURCE)]
        source: String,
        #[arg(long, default_value = pinhole_registry::tracker::DEFAULT_LOCATION)]
        location: String,
    },
    /// Follow a `/{shortcode}` path: resolve, record a click, print the target
    Open { path: String },
    /// Delete a link, freeing its code
    Delete { code: String },
    /// Delete every expired link
    Purge,
}
