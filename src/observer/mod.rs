// Observer system that turns persisted writes into notification side effects

pub mod error;
pub mod event;
pub mod implementations;
pub mod pipeline;
pub mod traits;

// Re-export core types
pub use error::*;
pub use event::*;
pub use pipeline::*;
pub use traits::*;
