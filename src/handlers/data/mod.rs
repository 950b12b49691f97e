// handlers/data/mod.rs - Marketplace entity handlers
//
// One module per entity, each exposing list / create / get / update / delete
// (where the entity supports them). Reads return views with display names.
pub mod contracts;
pub mod messages;
pub mod notifications;
pub mod profiles;
pub mod projects;
pub mod proposals;
pub mod reviews;
pub mod skills;

mod views;

pub use views::{ContractView, NotificationView, ProfileView, ProposalView, ReviewView};
