// handlers/mod.rs - Handler tiers
//
// public    → no authentication (account endpoints)
// protected → JWT required (/api/auth/*)
// data      → marketplace entity CRUD (/api/<entity>)
pub mod data;
pub mod protected;
pub mod public;
