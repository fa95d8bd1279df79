//! Status command - backend and row counts

use anyhow::{Context, Result};
use clap::Parser;
use quill_store::{Store, StoreStats};
use serde::Serialize;

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    driver: String,
    target: String,
    #[serde(flatten)]
    stats: StoreStats,
}

pub async fn run_status(store: &Store, args: StatusArgs) -> Result<()> {
    let stats = store.stats().await.context("Failed to count rows")?;
    let report = StatusReport {
        driver: store.dialect().driver().to_string(),
        // Debug output redacts credentials
        target: format!("{:?}", store.dialect()),
        stats,
    };

    if args.json {
        return super::print_json(&report);
    }

    println!("Driver:   {}", report.driver);
    println!("Target:   {}", report.target);
    println!("Users:    {}", stats.users);
    println!("Authors:  {}", stats.authors);
    println!("Posts:    {}", stats.posts);
    println!("Labels:   {}", stats.labels);
    println!("Comments: {}", stats.comments);
    Ok(())
}
