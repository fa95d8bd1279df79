//! Schema command - create or drop all tables

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use quill_store::Store;

#[derive(Parser, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Create any missing tables
    Init,
    /// Drop every table and all data
    Teardown {
        /// Confirm the destructive operation
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run_schema(store: &Store, args: SchemaArgs) -> Result<()> {
    match args.command {
        // Opening the store already created the tables
        SchemaCommand::Init => {
            println!("Schema ready ({})", store.dialect().driver());
        }
        SchemaCommand::Teardown { yes } => {
            if !yes {
                bail!("Refusing to drop all tables without --yes");
            }
            store.teardown().await.context("Failed to drop schema")?;
            println!("All tables dropped");
        }
    }
    Ok(())
}
