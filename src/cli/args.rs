//! Command-line argument definitions.

use clap::{Parser, Subcommand};

use crate::config::SecurityPreference;

#[derive(Parser)]
#[command(name = "evepal")]
#[command(about = "Personal EVE Online companion", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    Config,

    /// Verify the static data cache, building it if needed
    Sync {
        /// Discard the persisted cache and rebuild from the dataset
        #[arg(short, long)]
        force: bool,
    },

    /// Look up a universe entity by name or numeric id
    Lookup {
        /// Entity name (e.g. "Jita") or id (e.g. 30000142)
        query: String,
    },

    /// Plot a route between two solar systems
    Route {
        /// Origin system name or id
        from: String,

        /// Destination system name or id
        to: String,

        /// Security preference (overrides config)
        #[arg(short, long, value_enum)]
        flag: Option<SecurityPreference>,
    },
}
