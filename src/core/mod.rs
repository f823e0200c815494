// Public modules
pub mod defaults;
pub mod error;
pub mod inputs;
pub mod installer;
pub mod paths;
pub mod pipeline;
pub mod script;
pub mod toolcache;
pub mod workflow;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
