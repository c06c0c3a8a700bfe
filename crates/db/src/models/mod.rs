pub mod comment;
pub mod deck;
