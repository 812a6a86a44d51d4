use crate::{navigator::{Phase, SwipeNavigator}, types::{question::Question, rating::Rating}};

/// One card as the renderer should draw it
#[derive(Debug, Clone, PartialEq)]
pub struct CardView<'a> {
	pub question:    &'a Question,
	pub rating:      Rating,
	// False when `rating` is only the display default
	pub rated:       bool,
	pub interactive: bool,
}

/// Everything a rendering layer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorView<'a> {
	pub current:           Option<CardView<'a>>,
	pub neighbor:          Option<CardView<'a>>,
	pub offset:            f64,
	pub rotation_degrees:  f64,
	pub phase:             Phase,
	pub previous_disabled: bool,
	pub next_disabled:     bool,
	pub random_disabled:   bool,
	pub position:          Option<usize>,
	pub total:             usize,
}

impl<'a> NavigatorView<'a> {
	pub fn is_empty(&self) -> bool { self.current.is_none() }

	/// How many cards are stacked this frame, never more than two
	pub fn card_count(&self) -> usize { self.current.iter().chain(self.neighbor.iter()).count() }

	pub fn position_label(&self) -> String {
		match self.position {
			Some(index) => format!("Question {} of {}", index + 1, self.total),
			None => "No questions".to_string(),
		}
	}
}

impl SwipeNavigator {
	pub fn view<'a>(&'a self) -> NavigatorView<'a> {
		let deck = self.deck();
		let card = |question: &'a Question, interactive: bool| -> CardView<'a> {
			let stored = deck.rating_for(question.id);
			CardView {
				question,
				rating: stored.unwrap_or(Rating::DISPLAY_DEFAULT),
				rated: stored.is_some(),
				interactive,
			}
		};

		let divisor = self.config().rotation_divisor;
		let rotation_degrees = if divisor == 0.0 { 0.0 } else { self.offset() / divisor };

		NavigatorView {
			current: deck.current_question().map(|q| card(q, true)),
			neighbor: self.neighbor().map(|q| card(q, false)),
			offset: self.offset(),
			rotation_degrees,
			phase: self.phase(),
			previous_disabled: self.previous_disabled(),
			next_disabled: self.next_disabled(),
			random_disabled: self.random_disabled(),
			position: deck.index(),
			total: deck.len(),
		}
	}
}
