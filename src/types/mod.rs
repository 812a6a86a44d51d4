pub mod config;
pub mod deck;
pub mod question;
pub mod rating;
