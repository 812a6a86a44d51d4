use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DeckError;

/// A heart rating, always within `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
	pub const MIN: u8 = 1;
	pub const MAX: u8 = 5;

	/// Shown for questions nobody has rated yet. Never stored.
	pub const DISPLAY_DEFAULT: Rating = Rating(3);

	pub fn new(value: u8) -> Result<Self, DeckError> {
		if (Self::MIN..=Self::MAX).contains(&value) {
			Ok(Self(value))
		} else {
			Err(DeckError::InvalidRating(value))
		}
	}

	pub fn value(self) -> u8 { self.0 }
}

impl TryFrom<u8> for Rating {
	type Error = DeckError;

	fn try_from(value: u8) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for u8 {
	fn from(rating: Rating) -> Self { rating.0 }
}

impl fmt::Display for Rating {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
