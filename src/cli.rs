use clap::{Parser, Subcommand};

/// Terminal shell for the monitoring portal client.
///
/// The credential is kept in the storage file (`PORTAL_STORAGE_PATH`), so every
/// invocation sees the session left by the previous one.
#[derive(Parser, Debug)]
#[command(name = "portal-client", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the issued token
    Login {
        #[arg(long, short)]
        username: String,

        #[arg(long, short, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the current session
    Status,

    /// Navigate to a page, e.g. `/admin` (the guard runs first)
    Open { path: String },

    /// GET an API path relative to API_BASE_URL and print the JSON body
    Get { path: String },

    /// List the page table
    Routes,
}
