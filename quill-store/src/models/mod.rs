//! Blog entities
//!
//! Each entity keeps a [`Store`](crate::Store) handle so it can save and
//! destroy itself. Relationships to children are not cached: accessors such as
//! [`Post::comments`] query on every call.

mod author;
mod comment;
mod label;
mod post;
mod user;

pub use author::Author;
pub use comment::Comment;
pub use label::Label;
pub use post::Post;
pub use user::{OAuthIdentity, User};

pub(crate) use label::LabelRow;
