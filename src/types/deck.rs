use std::collections::HashMap;

use crate::{observer::ObserverList, types::{question::{Question, QuestionId}, rating::Rating}};

mod methods;

/// Something that happened to a deck, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEvent {
	IndexChanged { from: usize, to: usize },
	RatingChanged { question: QuestionId, rating: Rating },
	// The whole rating map was replaced and the index returned to the start
	Reseeded { ratings: usize },
}

/// Index and rating bookkeeping for one viewing session. No I/O, no rendering.
#[derive(Debug)]
pub struct DeckState {
	questions: Vec<Question>,
	// Meaningless while `questions` is empty
	index:     usize,
	ratings:   HashMap<QuestionId, Rating>,
	observers: ObserverList<DeckEvent>,
}
