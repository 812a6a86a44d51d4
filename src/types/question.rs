use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Stable identifier of a question, unique within a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<u32> for QuestionId {
	fn from(id: u32) -> Self { Self(id) }
}

/// A single compatibility question. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Question {
	pub id:   QuestionId,
	pub text: String,

	// Older question files carry no tags at all
	#[serde(default)]
	pub tags: BTreeSet<String>,
}

impl Question {
	pub fn new(id: u32, text: impl Into<String>) -> Self {
		Self { id: QuestionId(id), text: text.into(), tags: BTreeSet::new() }
	}

	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags.extend(tags.into_iter().map(Into::into));
		self
	}

	pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool { !self.tags.is_disjoint(tags) }
}
