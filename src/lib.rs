//! # Marketplace
//!
//! A small web front end over a file-backed wiki and an in-memory `people`
//! REST resource, guarded by cookie-based sessions.
//!
//! ## Sessions
//!
//! Every client gets an opaque `session` cookie on its first request. The
//! token is drawn from the OS CSPRNG and keys an in-memory session store owned
//! by the running server. Sessions start unauthenticated and are promoted by
//! a successful login; they never expire.
//!
//! ## Authentication
//!
//! Protected routes are wrapped by a single middleware that resolves (or
//! issues) the session and renders the login page for unauthenticated
//! clients. Passwords are checked against a configured secret with a
//! constant-time comparison.

pub mod cli;
pub mod marketplace;

pub const GIT_COMMIT_HASH: &str = env!("MARKETPLACE_GIT_SHA");
