//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Operator tool for the OnionGate resolver
///
/// Manages the domain registry and entry proxy pool and writes the zone files
/// served by the authoritative name server.
#[derive(Parser, Debug)]
#[command(name = "oniongate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(
        short,
        long,
        env = "ONIONGATE_CONFIG",
        default_value = "oniongate.toml",
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and write the default base template if missing
    Init,

    /// Register a domain and print its ownership token
    Register(RegisterArgs),

    /// Show a domain and its records
    Show {
        /// Subdomain label or full domain name
        domain: String,
    },

    /// List public domains
    Domains,

    /// Register an entry proxy
    AddProxy {
        /// Public IPv4 or IPv6 address
        ip: String,
    },

    /// List entry proxies (online first)
    Proxies,

    /// Record a proxy health-check result
    CheckProxy(CheckArgs),

    /// Record an onion-service liveness result for a domain
    CheckService(CheckArgs),

    /// List every zone that would be published
    Zones,

    /// Print the generated zone file for one zone
    Generate {
        /// Zone name, e.g. oniongate.com
        zone: String,
    },

    /// Write zone files to the configured zone directory
    Publish {
        /// Publish only this zone
        zone: Option<String>,
    },

    /// Print resolver statistics
    Stats {
        /// Number of recent public domains to include
        #[arg(long, default_value_t = 10)]
        recent: usize,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Subdomain label (e.g. `hello`) or full domain name
    pub domain: String,

    /// Onion address to map
    #[arg(long)]
    pub onion: Option<String>,

    /// Keep the domain out of the public listing
    #[arg(long)]
    pub private: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Proxy address or domain name
    pub target: String,

    /// Mark as unreachable instead of reachable
    #[arg(long)]
    pub offline: bool,
}
