pub mod account;
pub mod contract;
pub mod message;
pub mod notification;
pub mod profile;
pub mod project;
pub mod proposal;
pub mod review;
pub mod skill;

pub use account::{Account, NewAccount};
pub use contract::{Contract, ContractPatch, ContractStatus};
pub use message::{Message, MessagePatch, NewMessage};
pub use notification::{NewNotification, Notification, NotificationPatch};
pub use profile::{NewProfile, Profile, ProfilePatch, Role};
pub use project::{NewProject, Project, ProjectPatch};
pub use proposal::{NewProposal, Proposal, ProposalPatch, ProposalStatus};
pub use review::{NewReview, Review, ReviewPatch};
pub use skill::{NewSkill, Skill, SkillPatch};
