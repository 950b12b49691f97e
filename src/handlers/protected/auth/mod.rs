pub mod whoami; // GET /api/auth/whoami

pub use whoami::whoami;
