use std::collections::BTreeSet;

use crate::types::question::Question;

/// Questions whose text contains `search` (ignoring case) and which share at
/// least one tag with `tags`. Empty `search` or `tags` matches everything.
pub fn filter_questions<'a>(questions: &'a [Question], search: &str, tags: &BTreeSet<String>) -> Vec<&'a Question> {
	let needle = search.trim().to_lowercase();

	questions
		.iter()
		.filter(|q| needle.is_empty() || q.text.to_lowercase().contains(&needle))
		.filter(|q| tags.is_empty() || q.has_any_tag(tags))
		.collect()
}

/// Sorted union of every tag in the deck
pub fn unique_tags(questions: &[Question]) -> Vec<String> {
	questions.iter().flat_map(|q| q.tags.iter().cloned()).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Adds the tag if absent, removes it if present
pub fn toggle_tag(tags: &mut BTreeSet<String>, tag: &str) {
	if !tags.remove(tag) {
		tags.insert(tag.to_string());
	}
}
