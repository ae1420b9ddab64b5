//! Runtime configuration from CLI arguments and environment variables.

use clap::Parser;

/// CLI client for the AI Room Collaborator platform
#[derive(Debug, Clone, Parser)]
#[command(name = "airoom-client", version, about)]
pub struct Config {
    /// Base URL of the platform API
    #[arg(long, env = "AIROOM_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Bearer token for the platform API
    #[arg(long, env = "AIROOM_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Display name shown on chat messages
    #[arg(long, env = "AIROOM_NAME", default_value = "Anonymous")]
    pub name: String,

    /// Account email, used as the membership key
    #[arg(long, env = "AIROOM_EMAIL", default_value = "anonymous@example.com")]
    pub email: String,
}
