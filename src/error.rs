use thiserror::Error;
use uuid::Uuid;

use crate::types::question::QuestionId;

#[derive(Debug, Error)]
pub enum DeckError {
	#[error("Rating {0} is outside 1..=5")]
	InvalidRating(u8),

	#[error("Question {0} is not part of this deck")]
	UnknownQuestion(QuestionId),

	#[error("No tracked entity is selected")]
	NoEntitySelected,

	#[error("Tracked entity '{0}' not found")]
	UnknownEntity(Uuid),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	ConfigParse(#[from] toml::de::Error),
}
