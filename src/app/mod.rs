pub mod context;
pub mod error;

pub use context::{Collaborators, Session};
pub use error::{FeedloopError, Result};
