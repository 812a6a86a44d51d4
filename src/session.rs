use std::{cell::{Cell, Ref, RefCell}, rc::Rc, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{error::DeckError, navigator::{Response, SwipeNavigator, Transition}, observer::SubscriptionId, question_source::QuestionSource, stats::{self, RatingSummary, TagAverage}, store::{RatingStore, SelectionReset}, types::{config::DeckConfig, deck::{DeckEvent, DeckState}, question::{Question, QuestionId}, rating::Rating}};

#[derive(Debug, Clone, Copy)]
struct Subscriptions {
	write_through: SubscriptionId,
	selection:     SubscriptionId,
}

/// One viewing session over a deck for whichever entity the store has
/// selected. Accepted ratings are written through to the store as they
/// happen; the deck itself is never persisted. Whenever the store announces a
/// new selection the deck is re-seeded at the first card.
#[derive(Debug)]
pub struct Session<S: RatingStore + 'static> {
	navigator:     Rc<RefCell<SwipeNavigator>>,
	store:         Rc<RefCell<S>>,
	entity:        Rc<Cell<Option<Uuid>>>,
	subscriptions: Option<Subscriptions>,
}

impl<S: RatingStore + 'static> Session<S> {
	pub fn new(source: &impl QuestionSource, store: Rc<RefCell<S>>, config: DeckConfig) -> Self {
		Self::with_rng(source.load(), store, config, StdRng::from_entropy())
	}

	#[instrument(skip_all, fields(questions = questions.len()))]
	pub fn with_rng(questions: Vec<Question>, store: Rc<RefCell<S>>, config: DeckConfig, rng: StdRng) -> Self {
		let (entity, ratings) = {
			let store = store.borrow();
			(store.selected_entity(), store.ratings_for_selected())
		};
		info!("Starting session for {:?} with {} stored ratings", entity, ratings.len());

		let deck = DeckState::new(questions, ratings);
		let navigator = Rc::new(RefCell::new(SwipeNavigator::with_rng(deck, config, rng)));
		let entity = Rc::new(Cell::new(entity));

		let sink = Rc::clone(&store);
		let write_through = navigator.borrow_mut().subscribe_deck(move |event| {
			if let DeckEvent::RatingChanged { question, rating } = event {
				if let Err(e) = sink.borrow_mut().set_rating(*question, *rating) {
					warn!("Could not persist rating for question {}: {}", question, e);
				}
			}
		});

		// The store keeps this closure alive, so it only holds the navigator weakly
		let target = Rc::downgrade(&navigator);
		let current = Rc::clone(&entity);
		let selection = store.borrow_mut().subscribe_selection(Box::new(move |event: &SelectionReset| {
			let Some(navigator) = target.upgrade() else { return };
			info!(
				"Tracked entity changed from {:?} to {:?}, reseeding with {} ratings",
				current.get(),
				event.entity,
				event.ratings.len()
			);
			current.set(event.entity);
			navigator.borrow_mut().reseed(event.ratings.clone());
		}));

		Self { navigator, store, entity, subscriptions: Some(Subscriptions { write_through, selection }) }
	}

	/// Read access for rendering. Drop the guard before touching the store.
	pub fn navigator(&self) -> Ref<'_, SwipeNavigator> { self.navigator.borrow() }

	pub fn store(&self) -> &Rc<RefCell<S>> { &self.store }

	pub fn entity(&self) -> Option<Uuid> { self.entity.get() }

	pub fn drag_changed(&self, translation: f64) -> Response { self.navigator.borrow_mut().drag_changed(translation) }

	pub fn drag_ended(&self) -> Response { self.navigator.borrow_mut().drag_ended() }

	pub fn next(&self) -> Response { self.navigator.borrow_mut().next() }

	pub fn previous(&self) -> Response { self.navigator.borrow_mut().previous() }

	pub fn random(&self) -> Response { self.navigator.borrow_mut().random() }

	pub fn tick(&self, elapsed: Duration) -> Option<Transition> { self.navigator.borrow_mut().tick(elapsed) }

	pub fn settle(&self) -> Option<Transition> { self.navigator.borrow_mut().settle() }

	pub fn jump_to_question(&self, question: QuestionId) -> bool {
		self.navigator.borrow_mut().jump_to_question(question)
	}

	pub fn set_rating(&self, question: QuestionId, value: u8) -> Result<Rating, DeckError> {
		self.navigator.borrow_mut().set_rating(question, value)
	}

	pub fn rate_current(&self, value: u8) -> Result<Option<Rating>, DeckError> {
		self.navigator.borrow_mut().rate_current(value)
	}

	pub fn summary(&self) -> RatingSummary {
		let navigator = self.navigator.borrow();
		stats::summarize(navigator.deck().questions(), navigator.deck().ratings())
	}

	pub fn tag_averages(&self) -> Vec<TagAverage> {
		let navigator = self.navigator.borrow();
		stats::tag_averages(navigator.deck().questions(), navigator.deck().ratings())
	}

	pub fn ratings_series(&self) -> Vec<(QuestionId, Rating)> {
		stats::ratings_series(self.navigator.borrow().deck().ratings())
	}

	pub fn analysis(&self) -> String {
		let name = self.store.borrow().selected_name();
		let navigator = self.navigator.borrow();
		stats::analysis_summary(name.as_deref(), navigator.deck().questions(), navigator.deck().ratings())
	}

	/// Ends the session. A pending slide is cancelled so it can never touch the
	/// discarded deck, and writes stop flowing to the store.
	pub fn close(mut self) { self.teardown(); }

	fn teardown(&mut self) {
		let Some(subscriptions) = self.subscriptions.take() else { return };
		let mut navigator = self.navigator.borrow_mut();
		if let Some(transition) = navigator.cancel_in_flight() {
			info!("Session closed during {:?}", transition);
		}
		navigator.unsubscribe_deck(subscriptions.write_through);

		match self.store.try_borrow_mut() {
			Ok(mut store) => {
				store.unsubscribe_selection(subscriptions.selection);
			}
			Err(_) => warn!("Store busy at close, selection listener left dormant"),
		}
		info!("Session closed");
	}
}

impl<S: RatingStore + 'static> Drop for Session<S> {
	fn drop(&mut self) { self.teardown(); }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryRatingStore;

	fn session() -> Session<MemoryRatingStore> {
		let questions = (1..=3).map(|i| Question::new(i, format!("Q{i}"))).collect();
		Session::with_rng(
			questions,
			Rc::new(RefCell::new(MemoryRatingStore::default())),
			DeckConfig::default(),
			StdRng::seed_from_u64(5),
		)
	}

	#[test]
	fn ratings_write_through() {
		let session = session();
		session.set_rating(QuestionId(2), 4).unwrap();
		assert_eq!(
			session.store().borrow().ratings_for_selected().get(&QuestionId(2)),
			Some(&Rating::new(4).unwrap())
		);
	}

	#[test]
	fn rejected_ratings_never_reach_the_store() {
		let session = session();
		assert!(session.set_rating(QuestionId(2), 9).is_err());
		assert!(session.store().borrow().ratings_for_selected().is_empty());
	}

	#[test]
	fn reselecting_the_same_entity_keeps_the_position() {
		let session = session();
		let entity = session.entity().unwrap();
		session.next();
		session.settle();

		session.store().borrow_mut().select_entity(entity).unwrap();
		assert_eq!(session.navigator().deck().index(), Some(1));
	}

	#[test]
	fn clearing_ratings_reseeds_the_deck() {
		let session = session();
		session.set_rating(QuestionId(1), 5).unwrap();
		session.next();
		session.settle();

		session.store().borrow_mut().clear_ratings_for_selected().unwrap();
		assert_eq!(session.navigator().deck().index(), Some(0));
		assert!(session.navigator().deck().ratings().is_empty());
		assert!(session.ratings_series().is_empty());
	}

	#[test]
	fn dropped_session_stops_listening() {
		let store = {
			let session = session();
			Rc::clone(session.store())
		};
		// Nothing left to reseed; the announcement must go nowhere
		store.borrow_mut().add_entity("Later");
		assert_eq!(Rc::strong_count(&store), 1);
	}
}
