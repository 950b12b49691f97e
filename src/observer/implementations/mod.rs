// Observer implementations organized by rings

// Ring 8: Integration - outbound delivery stand-ins
#[path = "8/email_placeholder.rs"]
pub mod email_placeholder;

// Ring 9: Notification - in-app notification rows
#[path = "9/notify_freelancers.rs"]
pub mod notify_freelancers;
#[path = "9/notify_message_receiver.rs"]
pub mod notify_message_receiver;
#[path = "9/notify_project_owner.rs"]
pub mod notify_project_owner;
#[path = "9/notify_reviewee.rs"]
pub mod notify_reviewee;

// Helper for registering observers (not ring-specific)
pub mod registry;
pub use registry::*;

// Ring 8 re-exports
pub use email_placeholder::*;

// Ring 9 re-exports
pub use notify_freelancers::*;
pub use notify_message_receiver::*;
pub use notify_project_owner::*;
pub use notify_reviewee::*;
