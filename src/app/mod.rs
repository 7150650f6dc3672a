pub mod context;
pub mod error;
pub mod events;

pub use context::AppContext;
pub use error::{ReadOneError, Result};
pub use events::FeedEvent;
