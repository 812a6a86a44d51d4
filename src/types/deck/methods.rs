use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::{error::DeckError, observer::{ObserverList, SubscriptionId}, types::{deck::DeckEvent, question::{Question, QuestionId}, rating::Rating}};

impl super::DeckState {
	#[instrument(skip_all, fields(questions = questions.len(), ratings = ratings.len()))]
	pub fn new(questions: Vec<Question>, ratings: HashMap<QuestionId, Rating>) -> Self {
		info!("Creating deck");
		if questions.is_empty() {
			warn!("Deck has no questions");
		}

		Self { questions, index: 0, ratings, observers: ObserverList::default() }
	}

	pub fn questions(&self) -> &[Question] { &self.questions }

	pub fn len(&self) -> usize { self.questions.len() }

	pub fn is_empty(&self) -> bool { self.questions.is_empty() }

	/// `None` when the deck has no questions
	pub fn index(&self) -> Option<usize> { (!self.is_empty()).then_some(self.index) }

	pub fn ratings(&self) -> &HashMap<QuestionId, Rating> { &self.ratings }

	pub fn current_question(&self) -> Option<&Question> { self.questions.get(self.index) }

	pub fn next_question(&self) -> Option<&Question> { self.questions.get(self.index + 1) }

	pub fn previous_question(&self) -> Option<&Question> {
		self.index.checked_sub(1).and_then(|i| self.questions.get(i))
	}

	/// The stored rating, `None` when the question was never rated
	pub fn rating_for(&self, question: QuestionId) -> Option<Rating> {
		self.ratings.get(&question).copied()
	}

	/// What a card shows: the stored rating, or the display default
	pub fn display_rating(&self, question: QuestionId) -> Rating {
		self.rating_for(question).unwrap_or(Rating::DISPLAY_DEFAULT)
	}

	pub fn position_of(&self, question: QuestionId) -> Option<usize> {
		self.questions.iter().position(|q| q.id == question)
	}

	/// Rejects out-of-range values and questions outside this deck without
	/// touching the map. Observers hear about every accepted write, even one
	/// that repeats the stored value.
	#[instrument(skip(self))]
	pub fn set_rating(&mut self, question: QuestionId, value: u8) -> Result<Rating, DeckError> {
		let rating = Rating::new(value).inspect_err(|_| warn!("Rejecting rating {}", value))?;

		if self.position_of(question).is_none() {
			warn!("Rejecting rating for unknown question {}", question);
			return Err(DeckError::UnknownQuestion(question));
		}

		self.ratings.insert(question, rating);
		debug!("Question {} rated {}", question, rating);
		self.notify(&DeckEvent::RatingChanged { question, rating });
		Ok(rating)
	}

	pub fn advance(&mut self) -> bool {
		if self.index + 1 >= self.questions.len() {
			return false;
		}
		self.move_to(self.index + 1);
		true
	}

	pub fn retreat(&mut self) -> bool {
		if self.index == 0 || self.is_empty() {
			return false;
		}
		self.move_to(self.index - 1);
		true
	}

	pub fn jump_to(&mut self, index: usize) -> bool {
		if index >= self.questions.len() {
			debug!("Ignoring jump to {} in a deck of {}", index, self.questions.len());
			return false;
		}
		self.move_to(index);
		true
	}

	pub fn jump_to_question(&mut self, question: QuestionId) -> bool {
		match self.position_of(question) {
			Some(index) => self.jump_to(index),
			None => false,
		}
	}

	pub fn random_jump(&mut self) -> bool { self.random_jump_with(&mut rand::thread_rng()) }

	/// Picks uniformly among every index except the current one
	pub fn random_jump_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
		let len = self.questions.len();
		if len <= 1 {
			return false;
		}

		// Draw from the n - 1 other slots and shift past the current index
		let mut target = rng.gen_range(0..len - 1);
		if target >= self.index {
			target += 1;
		}
		self.move_to(target);
		true
	}

	/// Replaces all ratings and returns to the first question. Used when the
	/// tracked entity changes.
	#[instrument(skip_all, fields(ratings = ratings.len()))]
	pub fn reseed(&mut self, ratings: HashMap<QuestionId, Rating>) {
		info!("Reseeding deck");
		self.ratings = ratings;
		self.index = 0;
		self.notify(&DeckEvent::Reseeded { ratings: self.ratings.len() });
	}

	pub fn subscribe(&mut self, observer: impl FnMut(&DeckEvent) + 'static) -> SubscriptionId {
		self.observers.subscribe(observer)
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool { self.observers.unsubscribe(id) }

	fn move_to(&mut self, to: usize) {
		let from = self.index;
		self.index = to;
		debug!("Index {} -> {}", from, to);
		self.notify(&DeckEvent::IndexChanged { from, to });
	}

	fn notify(&mut self, event: &DeckEvent) { self.observers.notify(event); }
}

#[cfg(test)]
mod tests {
	use std::{cell::RefCell, rc::Rc};

	use rand::{SeedableRng, rngs::StdRng};

	use super::*;
	use crate::types::deck::DeckState;

	fn deck(n: u32) -> DeckState {
		DeckState::new((1..=n).map(|i| Question::new(i, format!("Question {i}"))).collect(), HashMap::new())
	}

	#[test]
	fn empty_deck_degrades_to_none() {
		let mut deck = deck(0);
		assert_eq!(deck.index(), None);
		assert!(deck.current_question().is_none());
		assert!(deck.next_question().is_none());
		assert!(deck.previous_question().is_none());
		assert!(!deck.advance());
		assert!(!deck.retreat());
		assert!(!deck.jump_to(0));
		assert!(!deck.random_jump());
	}

	#[test]
	fn neighbours_follow_the_index() {
		let mut deck = deck(3);
		assert!(deck.previous_question().is_none());
		assert_eq!(deck.next_question().map(|q| q.id), Some(QuestionId(2)));

		deck.jump_to(2);
		assert_eq!(deck.previous_question().map(|q| q.id), Some(QuestionId(2)));
		assert!(deck.next_question().is_none());
	}

	#[test]
	fn unset_is_distinct_from_explicit_default() {
		let mut deck = deck(2);
		assert_eq!(deck.rating_for(QuestionId(1)), None);
		assert_eq!(deck.display_rating(QuestionId(1)), Rating::DISPLAY_DEFAULT);

		deck.set_rating(QuestionId(1), 3).unwrap();
		assert_eq!(deck.rating_for(QuestionId(1)), Some(Rating::DISPLAY_DEFAULT));
		assert_eq!(deck.rating_for(QuestionId(2)), None);
	}

	#[test]
	fn rejected_ratings_leave_no_trace() {
		let mut deck = deck(2);
		let heard = Rc::new(RefCell::new(0));
		let counter = heard.clone();
		deck.subscribe(move |_| *counter.borrow_mut() += 1);

		assert!(matches!(deck.set_rating(QuestionId(1), 0), Err(DeckError::InvalidRating(0))));
		assert!(matches!(deck.set_rating(QuestionId(1), 6), Err(DeckError::InvalidRating(6))));
		assert!(matches!(deck.set_rating(QuestionId(9), 4), Err(DeckError::UnknownQuestion(QuestionId(9)))));
		assert!(deck.ratings().is_empty());
		assert_eq!(*heard.borrow(), 0);
	}

	#[test]
	fn random_jump_never_lands_on_current() {
		let mut deck = deck(5);
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..1000 {
			let before = deck.index();
			assert!(deck.random_jump_with(&mut rng));
			assert_ne!(deck.index(), before);
		}
	}

	#[test]
	fn random_jump_reaches_every_other_index() {
		let mut rng = StdRng::seed_from_u64(11);
		let mut seen = [false; 4];
		for _ in 0..400 {
			let mut deck = deck(4);
			deck.jump_to(1);
			deck.random_jump_with(&mut rng);
			seen[deck.index().unwrap()] = true;
		}
		assert_eq!(seen, [true, false, true, true]);
	}

	#[test]
	fn single_question_random_jump_is_a_noop() {
		let mut deck = deck(1);
		assert!(!deck.random_jump());
		assert_eq!(deck.index(), Some(0));
	}

	#[test]
	fn reseed_replaces_ratings_and_rewinds() {
		let mut deck = deck(3);
		deck.set_rating(QuestionId(1), 5).unwrap();
		deck.jump_to(2);

		deck.reseed(HashMap::from([(QuestionId(2), Rating::new(1).unwrap())]));
		assert_eq!(deck.index(), Some(0));
		assert_eq!(deck.rating_for(QuestionId(1)), None);
		assert_eq!(deck.rating_for(QuestionId(2)), Some(Rating::new(1).unwrap()));
	}

	#[test]
	fn unsubscribed_observers_stop_hearing() {
		let mut deck = deck(3);
		let heard = Rc::new(RefCell::new(Vec::new()));
		let log = heard.clone();
		let id = deck.subscribe(move |event| log.borrow_mut().push(event.clone()));

		deck.advance();
		assert!(deck.unsubscribe(id));
		assert!(!deck.unsubscribe(id));
		deck.advance();

		assert_eq!(*heard.borrow(), vec![DeckEvent::IndexChanged { from: 0, to: 1 }]);
	}

	#[test]
	fn jump_to_question_uses_identifier_not_position() {
		let mut deck = DeckState::new(
			vec![Question::new(10, "a"), Question::new(20, "b"), Question::new(30, "c")],
			HashMap::new(),
		);
		assert!(deck.jump_to_question(QuestionId(30)));
		assert_eq!(deck.index(), Some(2));
		assert!(!deck.jump_to_question(QuestionId(3)));
		assert_eq!(deck.index(), Some(2));
	}
}
