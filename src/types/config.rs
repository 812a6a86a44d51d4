use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::DeckError;

/// Tunables for the swipe navigator. Every key may be omitted from the TOML.
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct DeckConfig {
	// Horizontal distance a drag must exceed before release commits
	pub swipe_threshold:    f64,
	// Where a committed card slides to before the deck moves on
	pub slide_distance:     f64,
	pub commit_duration_ms: u64,
	// Card tilt is offset / rotation_divisor degrees
	pub rotation_divisor:   f64,
}

impl Default for DeckConfig {
	fn default() -> Self {
		Self {
			swipe_threshold:    100.0,
			slide_distance:     1000.0,
			commit_duration_ms: 200,
			rotation_divisor:   30.0,
		}
	}
}

impl DeckConfig {
	pub fn from_toml_str(content: &str) -> Result<Self, DeckError> { Ok(toml::from_str(content)?) }

	/// Falls back to defaults when the file does not exist
	#[instrument]
	pub fn load(path: &Path) -> Result<Self, DeckError> {
		if !path.exists() {
			warn!("No config at {:?}, using defaults", path);
			return Ok(Self::default());
		}

		let content = fs_err::read_to_string(path)?;
		let config = Self::from_toml_str(&content)?;
		info!("Loaded deck config from {:?}", path);
		Ok(config)
	}

	pub fn commit_duration(&self) -> Duration { Duration::from_millis(self.commit_duration_ms) }
}
