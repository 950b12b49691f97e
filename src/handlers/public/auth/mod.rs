// handlers/public/auth/mod.rs - Account endpoints
pub mod login;    // POST /api/login
pub mod refresh;  // POST /api/token/refresh
pub mod register; // POST /api/register
pub mod role;     // POST /api/set-role

pub use login::login;
pub use refresh::refresh;
pub use register::register;
pub use role::set_role;
