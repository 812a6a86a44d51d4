use std::{collections::HashMap, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{error::DeckError, observer::{ObserverList, SubscriptionId}, types::{question::QuestionId, rating::Rating}};

/// A person or partner whose answers are being recorded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedEntity {
	pub id:   Uuid,
	pub name: String,
}

impl TrackedEntity {
	pub fn new(name: impl Into<String>) -> Self { Self { id: Uuid::new_v4(), name: name.into() } }
}

pub type RatingMap = HashMap<QuestionId, Rating>;

/// Published whenever a different entity becomes selected, or the selected
/// entity's ratings are wiped. Carries the ratings so listeners never need to
/// read back from a store that is mid-update.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReset {
	pub entity:  Option<Uuid>,
	pub ratings: RatingMap,
}

pub type SelectionObserver = Box<dyn FnMut(&SelectionReset)>;

/// Where ratings live between sessions. Writes are last-write-wins per
/// question and always land on the currently selected entity.
pub trait RatingStore {
	fn selected_entity(&self) -> Option<Uuid>;

	fn selected_name(&self) -> Option<String>;

	fn ratings_for_selected(&self) -> RatingMap;

	fn set_rating(&mut self, question: QuestionId, rating: Rating) -> Result<(), DeckError>;

	fn subscribe_selection(&mut self, observer: SelectionObserver) -> SubscriptionId;

	fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool;
}

/// Entities, the selection and every entity's ratings, held in memory
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryRatingStore {
	#[serde(default)]
	entities:  Vec<TrackedEntity>,
	#[serde(default)]
	selected:  Option<Uuid>,
	#[serde(default)]
	ratings:   HashMap<Uuid, RatingMap>,
	#[serde(skip)]
	observers: ObserverList<SelectionReset>,
}

impl Default for MemoryRatingStore {
	fn default() -> Self {
		let mut store = Self {
			entities:  Vec::new(),
			selected:  None,
			ratings:   HashMap::new(),
			observers: ObserverList::default(),
		};
		store.ensure_entity();
		store
	}
}

impl MemoryRatingStore {
	pub const DEFAULT_ENTITY_NAME: &'static str = "Person 1";

	pub fn entities(&self) -> &[TrackedEntity] { &self.entities }

	pub fn entity(&self, id: Uuid) -> Option<&TrackedEntity> { self.entities.iter().find(|e| e.id == id) }

	pub fn selected(&self) -> Option<&TrackedEntity> { self.selected.and_then(|id| self.entity(id)) }

	pub fn ratings_for(&self, id: Uuid) -> RatingMap { self.ratings.get(&id).cloned().unwrap_or_default() }

	/// Appends a new entity and selects it
	#[instrument(skip(self, name))]
	pub fn add_entity(&mut self, name: impl Into<String>) -> Uuid {
		let entity = TrackedEntity::new(name);
		let id = entity.id;
		info!("Tracking '{}' as {}", entity.name, id);
		self.entities.push(entity);
		self.selected = Some(id);
		self.announce_selection();
		id
	}

	pub fn select_entity(&mut self, id: Uuid) -> Result<(), DeckError> {
		if self.entity(id).is_none() {
			return Err(DeckError::UnknownEntity(id));
		}
		if self.selected != Some(id) {
			debug!("Selecting {}", id);
			self.selected = Some(id);
			self.announce_selection();
		}
		Ok(())
	}

	/// Drops the entity and its ratings. If it was selected, the first
	/// remaining entity takes over.
	#[instrument(skip(self))]
	pub fn remove_entity(&mut self, id: Uuid) -> Result<TrackedEntity, DeckError> {
		let position =
			self.entities.iter().position(|e| e.id == id).ok_or(DeckError::UnknownEntity(id))?;
		let removed = self.entities.remove(position);
		self.ratings.remove(&id);

		if self.selected == Some(id) {
			self.selected = self.entities.first().map(|e| e.id);
			info!("Selection fell back to {:?}", self.selected);
			self.announce_selection();
		}
		Ok(removed)
	}

	pub fn clear_ratings_for_selected(&mut self) -> Result<(), DeckError> {
		let id = self.selected.ok_or(DeckError::NoEntitySelected)?;
		self.ratings.insert(id, RatingMap::new());
		self.announce_selection();
		Ok(())
	}

	fn announce_selection(&mut self) {
		let event = SelectionReset { entity: self.selected, ratings: self.ratings_for_selected() };
		self.observers.notify(&event);
	}

	// Nobody tracked yet means a default person, selected
	fn ensure_entity(&mut self) {
		if self.entities.is_empty() {
			self.add_entity(Self::DEFAULT_ENTITY_NAME);
		} else if self.selected().is_none() {
			self.selected = self.entities.first().map(|e| e.id);
		}
	}
}

impl RatingStore for MemoryRatingStore {
	fn selected_entity(&self) -> Option<Uuid> { self.selected }

	fn selected_name(&self) -> Option<String> { self.selected().map(|e| e.name.clone()) }

	fn ratings_for_selected(&self) -> RatingMap {
		self.selected.map(|id| self.ratings_for(id)).unwrap_or_default()
	}

	fn set_rating(&mut self, question: QuestionId, rating: Rating) -> Result<(), DeckError> {
		let id = self.selected.ok_or(DeckError::NoEntitySelected)?;
		self.ratings.entry(id).or_default().insert(question, rating);
		Ok(())
	}

	fn subscribe_selection(&mut self, observer: SelectionObserver) -> SubscriptionId {
		self.observers.subscribe(observer)
	}

	fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool { self.observers.unsubscribe(id) }
}

/// A [`MemoryRatingStore`] rewritten to a JSON file after every change
#[derive(Debug)]
pub struct JsonRatingStore {
	path:  PathBuf,
	inner: MemoryRatingStore,
}

impl JsonRatingStore {
	/// Starts empty (with the default entity) when the file does not exist yet
	#[instrument]
	pub fn open(path: &Path) -> Result<Self, DeckError> {
		let inner = if path.exists() {
			let content = fs_err::read_to_string(path)?;
			let mut inner: MemoryRatingStore = serde_json::from_str(&content)?;
			inner.ensure_entity();
			info!("Loaded {} tracked entities", inner.entities.len());
			inner
		} else {
			warn!("No ratings file at {:?}, starting fresh", path);
			MemoryRatingStore::default()
		};

		Ok(Self { path: path.to_path_buf(), inner })
	}

	pub fn path(&self) -> &Path { &self.path }

	pub fn inner(&self) -> &MemoryRatingStore { &self.inner }

	pub fn add_entity(&mut self, name: impl Into<String>) -> Result<Uuid, DeckError> {
		let id = self.inner.add_entity(name);
		self.save()?;
		Ok(id)
	}

	pub fn select_entity(&mut self, id: Uuid) -> Result<(), DeckError> {
		self.inner.select_entity(id)?;
		self.save()
	}

	pub fn remove_entity(&mut self, id: Uuid) -> Result<TrackedEntity, DeckError> {
		let removed = self.inner.remove_entity(id)?;
		self.save()?;
		Ok(removed)
	}

	pub fn clear_ratings_for_selected(&mut self) -> Result<(), DeckError> {
		self.inner.clear_ratings_for_selected()?;
		self.save()
	}

	#[instrument(skip(self), fields(path = ?self.path))]
	pub fn save(&self) -> Result<(), DeckError> {
		let content = serde_json::to_string_pretty(&self.inner)?;
		fs_err::write(&self.path, content)?;
		debug!("Ratings written");
		Ok(())
	}
}

impl RatingStore for JsonRatingStore {
	fn selected_entity(&self) -> Option<Uuid> { self.inner.selected_entity() }

	fn selected_name(&self) -> Option<String> { self.inner.selected_name() }

	fn ratings_for_selected(&self) -> RatingMap { self.inner.ratings_for_selected() }

	fn set_rating(&mut self, question: QuestionId, rating: Rating) -> Result<(), DeckError> {
		self.inner.set_rating(question, rating)?;
		self.save()
	}

	fn subscribe_selection(&mut self, observer: SelectionObserver) -> SubscriptionId {
		self.inner.subscribe_selection(observer)
	}

	fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool { self.inner.unsubscribe_selection(id) }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rating(value: u8) -> Rating { Rating::new(value).unwrap() }

	#[test]
	fn fresh_store_tracks_a_default_person() {
		let store = MemoryRatingStore::default();
		assert_eq!(store.entities().len(), 1);
		assert_eq!(store.selected().map(|e| e.name.as_str()), Some("Person 1"));
		assert!(store.ratings_for_selected().is_empty());
	}

	#[test]
	fn ratings_are_kept_per_entity() {
		let mut store = MemoryRatingStore::default();
		let first = store.selected_entity().unwrap();
		store.set_rating(QuestionId(1), rating(5)).unwrap();

		let second = store.add_entity("Partner");
		assert_eq!(store.selected_entity(), Some(second));
		assert!(store.ratings_for_selected().is_empty());
		store.set_rating(QuestionId(1), rating(2)).unwrap();

		store.select_entity(first).unwrap();
		assert_eq!(store.ratings_for_selected()[&QuestionId(1)], rating(5));
	}

	#[test]
	fn removing_the_selection_falls_back_to_first() {
		let mut store = MemoryRatingStore::default();
		let first = store.selected_entity().unwrap();
		let second = store.add_entity("Second");
		store.set_rating(QuestionId(3), rating(4)).unwrap();

		store.remove_entity(second).unwrap();
		assert_eq!(store.selected_entity(), Some(first));
		assert!(store.ratings_for(second).is_empty());
		assert!(matches!(store.remove_entity(second), Err(DeckError::UnknownEntity(_))));
	}

	#[test]
	fn removing_everyone_leaves_nothing_selected() {
		let mut store = MemoryRatingStore::default();
		let only = store.selected_entity().unwrap();
		store.remove_entity(only).unwrap();
		assert_eq!(store.selected_entity(), None);
		assert!(matches!(store.set_rating(QuestionId(1), rating(1)), Err(DeckError::NoEntitySelected)));
	}

	#[test]
	fn selection_changes_are_announced_with_their_ratings() {
		use std::{cell::RefCell, rc::Rc};

		let mut store = MemoryRatingStore::default();
		let first = store.selected_entity().unwrap();
		store.set_rating(QuestionId(1), rating(5)).unwrap();

		let heard = Rc::new(RefCell::new(Vec::new()));
		let log = Rc::clone(&heard);
		let id = store.subscribe_selection(Box::new(move |event| log.borrow_mut().push(event.clone())));

		let second = store.add_entity("Partner");
		store.select_entity(second).unwrap();
		store.select_entity(first).unwrap();
		store.clear_ratings_for_selected().unwrap();
		store.set_rating(QuestionId(2), rating(1)).unwrap();

		assert_eq!(*heard.borrow(), vec![
			SelectionReset { entity: Some(second), ratings: RatingMap::new() },
			SelectionReset { entity: Some(first), ratings: HashMap::from([(QuestionId(1), rating(5))]) },
			SelectionReset { entity: Some(first), ratings: RatingMap::new() },
		]);

		assert!(store.unsubscribe_selection(id));
		store.remove_entity(first).unwrap();
		assert_eq!(heard.borrow().len(), 3);
		assert_eq!(store.selected_name().as_deref(), Some("Partner"));
	}

	#[test]
	fn json_store_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ratings.json");

		let mut store = JsonRatingStore::open(&path).unwrap();
		let partner = store.add_entity("Partner").unwrap();
		store.set_rating(QuestionId(7), rating(1)).unwrap();
		store.set_rating(QuestionId(7), rating(4)).unwrap();

		let reopened = JsonRatingStore::open(&path).unwrap();
		assert_eq!(reopened.selected_entity(), Some(partner));
		assert_eq!(reopened.ratings_for_selected(), HashMap::from([(QuestionId(7), rating(4))]));
		assert_eq!(reopened.inner().entities().len(), 2);
	}

	#[test]
	fn json_store_clears_selected_ratings() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ratings.json");

		let mut store = JsonRatingStore::open(&path).unwrap();
		store.set_rating(QuestionId(1), rating(3)).unwrap();
		store.clear_ratings_for_selected().unwrap();

		assert!(JsonRatingStore::open(&path).unwrap().ratings_for_selected().is_empty());
	}

	#[test]
	fn corrupt_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ratings.json");
		std::fs::write(&path, "{ not json").unwrap();
		assert!(matches!(JsonRatingStore::open(&path), Err(DeckError::Json(_))));
	}
}
