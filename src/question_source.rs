use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{error::DeckError, types::question::Question};

/// One-shot supplier of the deck's questions
pub trait QuestionSource {
	fn load(&self) -> Vec<Question>;
}

impl QuestionSource for Vec<Question> {
	fn load(&self) -> Vec<Question> { self.clone() }
}

/// Reads a JSON array of questions, keeping the app usable with the bundled
/// set when the file is missing or malformed
#[derive(Debug, Clone)]
pub struct JsonQuestionSource {
	path: PathBuf,
}

impl JsonQuestionSource {
	pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

	pub fn path(&self) -> &Path { &self.path }

	#[instrument(skip(self), fields(path = ?self.path))]
	pub fn try_load(&self) -> Result<Vec<Question>, DeckError> {
		let content = fs_err::read_to_string(&self.path)?;
		let questions: Vec<Question> = serde_json::from_str(&content)?;
		debug!("Decoded {} questions", questions.len());
		Ok(questions)
	}
}

impl QuestionSource for JsonQuestionSource {
	fn load(&self) -> Vec<Question> {
		match self.try_load() {
			Ok(questions) => {
				info!("Loaded {} questions from {:?}", questions.len(), self.path);
				questions
			}
			Err(e) => {
				warn!("Falling back to bundled questions: {}", e);
				bundled_questions()
			}
		}
	}
}

pub fn bundled_questions() -> Vec<Question> {
	[
		"What is your concept of marriage?",
		"Have you ever been married before?",
		"Are you married now?",
		"What are your expectations of marriage?",
		"What are your goals in life? Long term and short term plans.",
		"Identify three things that you want to accomplish in the near future.",
		"Identify three things that you want to accomplish, long-term.",
		"Why have you chosen me as your potential spouse?",
		"What is the role of religion in your life – now?",
		"Are you a spiritual person?",
	]
	.into_iter()
	.zip(1..)
	.map(|(text, id)| Question::new(id, text))
	.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::question::QuestionId;

	#[test]
	fn reads_questions_with_tags() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("questions-en.json");
		std::fs::write(
			&path,
			r#"[{"id": 1, "text": "Faith?", "tags": ["faith"]}, {"id": 2, "text": "Kids?"}]"#,
		)
		.unwrap();

		let questions = JsonQuestionSource::new(&path).load();
		assert_eq!(questions.len(), 2);
		assert!(questions[0].tags.contains("faith"));
		assert_eq!(questions[1].id, QuestionId(2));
	}

	#[test]
	fn missing_file_falls_back() {
		let dir = tempfile::tempdir().unwrap();
		let source = JsonQuestionSource::new(dir.path().join("absent.json"));
		assert!(source.try_load().is_err());
		assert_eq!(source.load(), bundled_questions());
	}

	#[test]
	fn bundled_ids_are_sequential() {
		let ids: Vec<u32> = bundled_questions().iter().map(|q| q.id.0).collect();
		assert_eq!(ids, (1..=10).collect::<Vec<_>>());
	}
}
