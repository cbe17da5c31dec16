//! Clap derive structures for the `flowatch` CLI.

use clap::{Args, Parser, Subcommand};

/// flowatch -- terminal SNMP interface monitor
#[derive(Debug, Parser)]
#[command(
    name = "flowatch",
    version,
    about = "Monitor per-interface traffic on SNMP devices",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a dashboard and stream per-interface rates to the terminal
    Watch {
        /// Dashboard name (from the dashboards directory) or a path to a
        /// dashboard TOML file
        dashboard: String,
    },

    /// Discover interfaces on a device
    Discover {
        /// Host name or IP address of the device
        host: String,

        /// Identity to authenticate with
        #[arg(long, short = 'i')]
        identity: String,

        /// SNMP port
        #[arg(long, default_value = "161")]
        port: u16,
    },

    /// Manage SNMP identities in the encrypted vault
    Identity(IdentityArgs),

    /// List available dashboards
    Dashboards,

    /// Manage application configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub command: IdentityCommand,
}

#[derive(Debug, Subcommand)]
pub enum IdentityCommand {
    /// List stored identities (secrets are never shown)
    #[command(alias = "ls")]
    List,

    /// Add a new identity (interactive)
    Add,

    /// Remove an identity
    Remove {
        /// Identity name
        name: String,
    },

    /// Test SNMP connectivity using an identity
    Test {
        /// Identity name
        name: String,

        /// Host to probe
        host: String,

        /// SNMP port
        #[arg(long, default_value = "161")]
        port: u16,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the config directory path
    Path,

    /// Set the default identity
    Identity {
        /// Identity name
        name: String,
    },

    /// Set the default poll interval in seconds
    Interval {
        /// Seconds between polls (minimum 1)
        secs: u64,
    },
}
