// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Routes here sit behind `jwt_auth_middleware`, which places the caller's
// `AuthUser` in the request extensions.
pub mod auth;
