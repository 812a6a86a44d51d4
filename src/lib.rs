pub mod error;
pub mod filter;
pub mod logging;
pub mod navigator;
pub mod observer;
pub mod question_source;
pub mod session;
pub mod stats;
pub mod store;
pub mod timeline;
pub mod types;

pub use crate::{error::DeckError, navigator::{Phase, Response, SwipeNavigator, Transition}, session::Session, types::{config::DeckConfig, deck::{DeckEvent, DeckState}, question::{Question, QuestionId}, rating::Rating}};
