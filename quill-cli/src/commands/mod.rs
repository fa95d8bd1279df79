//! Command implementations for the quill CLI

pub mod labels;
pub mod posts;
pub mod schema;
pub mod status;
pub mod users;

pub use labels::run_labels;
pub use posts::run_posts;
pub use schema::run_schema;
pub use status::run_status;
pub use users::run_users;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
