// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and one-time role selection. Every input is untrusted,
// so the account service validates all of it.
pub mod auth;
