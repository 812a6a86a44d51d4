//! The interactive front of a deck: drag offsets, swipe commit policy and
//! the slide-off animation window during which every other intent is refused.

use std::{collections::HashMap, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, instrument};

use crate::{error::DeckError, observer::{ObserverList, SubscriptionId}, timeline::{Timeline, TimerToken}, types::{config::DeckConfig, deck::{DeckEvent, DeckState}, question::{Question, QuestionId}, rating::Rating}};

pub mod view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Dragging,
	Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	Advance,
	Retreat,
	Random,
}

/// What became of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
	Rejected,
	Dragged,
	SprungBack,
	Committed(Transition),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorEvent {
	OffsetChanged(f64),
	TransitionStarted(Transition),
	TransitionFinished { transition: Transition, moved: bool },
	TransitionCancelled(Transition),
}

#[derive(Debug)]
struct InFlight {
	token:      TimerToken,
	transition: Transition,
}

#[derive(Debug)]
pub struct SwipeNavigator {
	deck:      DeckState,
	config:    DeckConfig,
	offset:    f64,
	in_flight: Option<InFlight>,
	timeline:  Timeline<Transition>,
	rng:       StdRng,
	observers: ObserverList<NavigatorEvent>,
}

impl SwipeNavigator {
	pub fn new(deck: DeckState, config: DeckConfig) -> Self { Self::with_rng(deck, config, StdRng::from_entropy()) }

	pub fn with_rng(deck: DeckState, config: DeckConfig, rng: StdRng) -> Self {
		Self {
			deck,
			config,
			offset: 0.0,
			in_flight: None,
			timeline: Timeline::new(),
			rng,
			observers: ObserverList::default(),
		}
	}

	pub fn deck(&self) -> &DeckState { &self.deck }

	pub fn config(&self) -> &DeckConfig { &self.config }

	pub fn offset(&self) -> f64 { self.offset }

	pub fn is_animating(&self) -> bool { self.in_flight.is_some() }

	pub fn phase(&self) -> Phase {
		if self.is_animating() {
			Phase::Animating
		} else if self.offset != 0.0 {
			Phase::Dragging
		} else {
			Phase::Idle
		}
	}

	pub fn previous_disabled(&self) -> bool { self.is_animating() || self.deck.previous_question().is_none() }

	pub fn next_disabled(&self) -> bool { self.is_animating() || self.deck.next_question().is_none() }

	pub fn random_disabled(&self) -> bool { self.is_animating() }

	/// The card that belongs beneath the current one for the present offset:
	/// next when pulled right, previous when pulled left, nothing at rest.
	pub fn neighbor(&self) -> Option<&Question> {
		if self.offset > 0.0 {
			self.deck.next_question()
		} else if self.offset < 0.0 {
			self.deck.previous_question()
		} else {
			None
		}
	}

	pub fn drag_changed(&mut self, translation: f64) -> Response {
		if self.is_animating() {
			debug!("Drag ignored while animating");
			return Response::Rejected;
		}
		if self.deck.is_empty() {
			return Response::Rejected;
		}
		if !translation.is_finite() {
			debug!("Ignoring non-finite drag {}", translation);
			return Response::Rejected;
		}

		self.set_offset(translation);
		Response::Dragged
	}

	#[instrument(skip(self), fields(offset = self.offset))]
	pub fn drag_ended(&mut self) -> Response {
		if self.is_animating() {
			debug!("Release ignored while animating");
			return Response::Rejected;
		}

		if self.offset.abs() <= self.config.swipe_threshold {
			return self.spring_back();
		}

		if self.offset > 0.0 {
			if self.deck.next_question().is_none() {
				debug!("No card after the last one");
				return self.spring_back();
			}
			self.commit(Transition::Advance)
		} else {
			if self.deck.previous_question().is_none() {
				debug!("No card before the first one");
				return self.spring_back();
			}
			self.commit(Transition::Retreat)
		}
	}

	pub fn next(&mut self) -> Response {
		if self.next_disabled() {
			return Response::Rejected;
		}
		self.commit(Transition::Advance)
	}

	pub fn previous(&mut self) -> Response {
		if self.previous_disabled() {
			return Response::Rejected;
		}
		self.commit(Transition::Retreat)
	}

	pub fn random(&mut self) -> Response {
		if self.random_disabled() {
			return Response::Rejected;
		}
		self.commit(Transition::Random)
	}

	/// Picker selection. Refused mid-animation like every other navigation.
	pub fn jump_to_question(&mut self, question: QuestionId) -> bool {
		if self.is_animating() {
			return false;
		}
		self.deck.jump_to_question(question)
	}

	pub fn set_rating(&mut self, question: QuestionId, value: u8) -> Result<Rating, DeckError> {
		self.deck.set_rating(question, value)
	}

	/// Rates whatever card is on top
	pub fn rate_current(&mut self, value: u8) -> Result<Option<Rating>, DeckError> {
		let Some(question) = self.deck.current_question().map(|q| q.id) else {
			return Ok(None);
		};
		self.set_rating(question, value).map(Some)
	}

	/// Drops any in-flight transition, then swaps in a new rating map at the
	/// first card
	pub fn reseed(&mut self, ratings: HashMap<QuestionId, Rating>) {
		self.cancel_in_flight();
		self.deck.reseed(ratings);
	}

	/// Moves time forward, completing the in-flight transition if it came due
	pub fn tick(&mut self, elapsed: Duration) -> Option<Transition> {
		let mut finished = None;
		for (token, transition) in self.timeline.advance(elapsed) {
			if self.in_flight.as_ref().map(|f| f.token) == Some(token) {
				self.finish(transition);
				finished = Some(transition);
			} else {
				debug!("Dropping stale timer {:?}", token);
			}
		}
		finished
	}

	/// Runs the clock straight to the pending completion
	pub fn settle(&mut self) -> Option<Transition> {
		let remaining = self.timeline.until_next()?;
		self.tick(remaining)
	}

	/// Abandons the slide without touching the deck. Returns what was cancelled.
	pub fn cancel_in_flight(&mut self) -> Option<Transition> {
		let in_flight = self.in_flight.take()?;
		self.timeline.cancel(in_flight.token);
		info!("Cancelled {:?} mid-animation", in_flight.transition);
		self.set_offset(0.0);
		self.observers.notify(&NavigatorEvent::TransitionCancelled(in_flight.transition));
		Some(in_flight.transition)
	}

	pub fn subscribe(&mut self, observer: impl FnMut(&NavigatorEvent) + 'static) -> SubscriptionId {
		self.observers.subscribe(observer)
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool { self.observers.unsubscribe(id) }

	pub fn subscribe_deck(&mut self, observer: impl FnMut(&DeckEvent) + 'static) -> SubscriptionId {
		self.deck.subscribe(observer)
	}

	pub fn unsubscribe_deck(&mut self, id: SubscriptionId) -> bool { self.deck.unsubscribe(id) }

	fn spring_back(&mut self) -> Response {
		self.set_offset(0.0);
		Response::SprungBack
	}

	fn commit(&mut self, transition: Transition) -> Response {
		let slide = self.config.slide_distance;
		match transition {
			Transition::Advance => self.set_offset(slide),
			Transition::Retreat => self.set_offset(-slide),
			Transition::Random => self.set_offset(0.0),
		}

		let token = self.timeline.schedule(self.config.commit_duration(), transition);
		self.in_flight = Some(InFlight { token, transition });
		debug!("Committed {:?}", transition);
		self.observers.notify(&NavigatorEvent::TransitionStarted(transition));
		Response::Committed(transition)
	}

	// Deck first, then the offset, then the guard comes down
	fn finish(&mut self, transition: Transition) {
		let moved = match transition {
			Transition::Advance => self.deck.advance(),
			Transition::Retreat => self.deck.retreat(),
			Transition::Random => self.deck.random_jump_with(&mut self.rng),
		};
		self.set_offset(0.0);
		self.in_flight = None;
		self.observers.notify(&NavigatorEvent::TransitionFinished { transition, moved });
	}

	fn set_offset(&mut self, offset: f64) {
		if self.offset == offset {
			return;
		}
		self.offset = offset;
		self.observers.notify(&NavigatorEvent::OffsetChanged(offset));
	}
}
