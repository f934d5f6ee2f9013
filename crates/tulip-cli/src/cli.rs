//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use tulip_core::{OrderSide, OrdersBackend};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check that the API is configured and reachable
    Status,

    /// Manage the persona roster and the active persona
    #[command(subcommand)]
    Personas(PersonaCommand),

    /// List or submit orders on the selected backend
    #[command(subcommand)]
    Orders(OrderCommand),

    /// Show or change the orders backend
    #[command(subcommand)]
    Backend(BackendCommand),

    /// Show market pulse statistics
    Pulse {
        /// Keep polling and print this many updates
        #[arg(long, value_name = "N")]
        watch: Option<usize>,
    },

    /// Print collected metrics in Prometheus text format
    Metrics,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PersonaCommand {
    /// List personas, marking the active one
    List,
    /// Create a persona and make it active
    Create(PersonaFields),
    /// Update a persona
    Update {
        /// User id to update
        id: String,
        #[command(flatten)]
        fields: PersonaUpdate,
    },
    /// Delete a persona
    Delete {
        id: String,
    },
    /// Act as the given persona from now on
    Use {
        id: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PersonaFields {
    /// Display name
    pub name: String,
    /// Explicit user id; the server assigns one if omitted
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub avatar_url: Option<String>,
    /// PNG or JPEG file of at most 200 KB, stored as a data URL
    #[arg(long, value_name = "FILE", conflicts_with = "avatar_url")]
    pub avatar: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PersonaUpdate {
    /// New display name; the current one is kept if omitted
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub avatar_url: Option<String>,
    #[arg(long, value_name = "FILE", conflicts_with = "avatar_url")]
    pub avatar: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum OrderCommand {
    /// Show the most recent orders
    List,
    /// Submit an order as the active persona
    Submit {
        /// BUY or SELL
        #[arg(long, default_value = "BUY")]
        side: OrderSide,
        /// Limit price
        #[arg(long)]
        price: String,
        /// Whole number of units
        #[arg(long)]
        quantity: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackendCommand {
    Get,
    /// dynamodb or yugabyte
    Set { backend: OrdersBackend },
}
