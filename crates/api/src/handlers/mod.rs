pub mod comments;
pub mod decks;
