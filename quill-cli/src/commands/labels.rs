//! Labels command - list labels and attach/detach them on posts

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use quill_store::{Post, Store};

use super::print_json;

#[derive(Parser, Debug)]
pub struct LabelsArgs {
    #[command(subcommand)]
    pub command: LabelsCommand,
}

#[derive(Subcommand, Debug)]
pub enum LabelsCommand {
    /// List labels, all or those on one post
    List {
        /// Only labels attached to this post
        #[arg(long)]
        post: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a label to a post, creating the label if needed
    Add {
        /// Post id
        #[arg(long)]
        post: i64,
        /// Label name
        name: String,
    },
    /// Detach a label from a post (the label is kept)
    Remove {
        /// Post id
        #[arg(long)]
        post: i64,
        /// Label name
        name: String,
    },
}

pub async fn run_labels(store: &Store, args: LabelsArgs) -> Result<()> {
    match args.command {
        LabelsCommand::List { post, json } => {
            let labels = match post {
                Some(id) => find_post(store, id)
                    .await?
                    .labels()
                    .await
                    .context("Failed to list labels")?,
                None => store.find_all_labels().await.context("Failed to list labels")?,
            };
            if json {
                return print_json(&labels);
            }
            if labels.is_empty() {
                println!("No labels");
            }
            for label in &labels {
                println!("{:>6}  {}", label.id(), label.name());
            }
        }
        LabelsCommand::Add { post, name } => {
            let post = find_post(store, post).await?;
            let label = post
                .add_label(&name)
                .await
                .with_context(|| format!("Failed to attach '{name}'"))?;
            println!("Attached '{}' (label {}) to post {}", label.name(), label.id(), post.id());
        }
        LabelsCommand::Remove { post, name } => {
            let post = find_post(store, post).await?;
            let label = explain(
                store.find_label_by_name(&name).await,
                || format!("Label '{name}' not found"),
                || format!("Failed to load label '{name}'"),
            )?;
            explain(
                post.remove_label(&label).await,
                || format!("Post {} does not carry '{name}'", post.id()),
                || format!("Failed to detach '{name}'"),
            )?;
            println!("Detached '{}' from post {}", label.name(), post.id());
        }
    }
    Ok(())
}

async fn find_post(store: &Store, id: i64) -> Result<Post> {
    explain(
        store.find_post_by_id(id).await,
        || format!("Post {id} not found"),
        || format!("Failed to load post {id}"),
    )
}

/// Only a missing row is reported as "not found"; anything else keeps its cause
fn explain<T>(
    result: quill_store::Result<T>,
    missing: impl FnOnce() -> String,
    failed: impl FnOnce() -> String,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_not_found() => Err(anyhow!(err).context(missing())),
        Err(err) => Err(anyhow!(err).context(failed())),
    }
}
