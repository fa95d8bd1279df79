use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_store::Store;

use super::print_json;

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub command: PostsCommand,
}

#[derive(Subcommand, Debug)]
pub enum PostsCommand {
    /// List all posts, oldest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run_posts(store: &Store, args: PostsArgs) -> Result<()> {
    match args.command {
        PostsCommand::List { json } => {
            let posts = store.find_all_posts().await.context("Failed to list posts")?;
            if json {
                return print_json(&posts);
            }
            if posts.is_empty() {
                println!("No posts");
            }
            for post in &posts {
                println!(
                    "{:>6}  {}  {:<16} {}",
                    post.id(),
                    post.date().format("%Y-%m-%d"),
                    post.author().user().username(),
                    post.title()
                );
            }
        }
    }
    Ok(())
}
