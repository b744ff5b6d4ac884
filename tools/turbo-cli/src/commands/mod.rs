//! CLI command implementations.

pub mod call;
pub mod capabilities;

use clap::Args;

/// Arguments for the call command.
#[derive(Args)]
pub struct CallArgs {
    /// Capability group (e.g., "product").
    pub group: String,

    /// Operation within the group (e.g., "byId").
    pub operation: String,

    /// Operation input as JSON.
    #[arg(short, long, default_value = "{}")]
    pub input: String,

    /// Request locale.
    #[arg(long, default_value = "en-US")]
    pub locale: String,

    /// Request currency code.
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Store key.
    #[arg(long)]
    pub store: Option<String>,

    /// Caller user agent.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Invoke the operation N times with the same context.
    #[arg(short, long, default_value = "1")]
    pub repeat: usize,

    /// Enable the in-memory cache regardless of config.
    #[arg(long)]
    pub cache: bool,
}

/// Arguments for the capabilities command.
#[derive(Args)]
pub struct CapabilitiesArgs {
    /// Only list this group.
    #[arg(short, long)]
    pub group: Option<String>,
}
