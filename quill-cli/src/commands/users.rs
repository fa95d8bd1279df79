use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_store::Store;

use super::print_json;

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run_users(store: &Store, args: UsersArgs) -> Result<()> {
    match args.command {
        UsersCommand::List { json } => {
            let users = store.find_all_users().await.context("Failed to list users")?;
            if json {
                return print_json(&users);
            }
            if users.is_empty() {
                println!("No users");
            }
            for user in &users {
                println!("{:>6}  {:<24} {}", user.id(), user.username(), user.email());
            }
        }
    }
    Ok(())
}
