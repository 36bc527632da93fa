//! CLI argument definitions using clap
//!
//! Commands:
//! - paystore init
//! - paystore create < upsert.json
//! - paystore get --id <uuid> [--fields version,type,attributes.amount]
//! - paystore update --id <uuid> --version <n> < upsert.json
//! - paystore delete --id <uuid>
//! - paystore find [--organisation <uuid>] [--type <t>] [--sort <field>] [--desc]
//!   [--offset <n>] [--limit <n>]

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::payment::{Deadline, SortField};

/// paystore - payment persistence on embedded SQLite
#[derive(Parser, Debug)]
#[command(name = "paystore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./paystore.json")]
    pub config: PathBuf,

    /// Abort the operation if it can't complete within this many milliseconds
    #[arg(long, global = true)]
    pub deadline_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the store, or verify an existing one
    Init,

    /// Create a payment from a JSON object on stdin
    Create,

    /// Read one payment
    Get {
        #[arg(long)]
        id: Uuid,

        /// Comma separated fields to read; all fields when omitted
        #[arg(long)]
        fields: Option<String>,
    },

    /// Replace a payment's attributes from a JSON object on stdin
    Update {
        #[arg(long)]
        id: Uuid,

        /// Version the payment is expected to be at
        #[arg(long)]
        version: u32,
    },

    /// Delete a payment
    Delete {
        #[arg(long)]
        id: Uuid,
    },

    /// List payments
    Find {
        #[arg(long)]
        organisation: Option<Uuid>,

        #[arg(long = "type")]
        payment_type: Option<String>,

        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Comma separated fields to read; all fields when omitted
        #[arg(long)]
        fields: Option<String>,

        #[arg(long, default_value_t = 0)]
        offset: u64,

        #[arg(long, default_value_t = 100)]
        limit: u64,
    },
}

/// Sortable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Id,
    Version,
    #[value(name = "organisation_id")]
    OrganisationId,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => SortField::Id,
            SortArg::Version => SortField::Version,
            SortArg::OrganisationId => SortField::OrganisationId,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Deadline of the command's store operation
    pub fn deadline(&self) -> Deadline {
        match self.deadline_ms {
            Some(ms) => Deadline::within(Duration::from_millis(ms)),
            None => Deadline::none(),
        }
    }
}
