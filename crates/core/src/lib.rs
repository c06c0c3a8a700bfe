//! Domain core for the dropdeck bookmark service.
//!
//! - [`hierarchy`] - the storage-agnostic tree engine shared by decks and comments
//! - [`deck`] / [`comment`] - payload validation for each node kind
//! - [`types`] / [`error`] - shared id, timestamp and error types

pub mod comment;
pub mod deck;
pub mod error;
pub mod hierarchy;
pub mod types;
