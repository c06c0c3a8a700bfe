//! Request extractors shared by handlers.
//!
//! - [`acting_user::ActingUser`] -- the caller identified by the gateway's `x-user-id` header.

pub mod acting_user;
