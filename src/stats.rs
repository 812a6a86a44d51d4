use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use crate::types::{question::{Question, QuestionId}, rating::Rating};

/// Only stored ratings count. The display default never does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
	pub answered: usize,
	pub total:    usize,
	pub average:  Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagAverage {
	pub tag:     String,
	pub average: f64,
	pub count:   usize,
}

pub fn summarize(questions: &[Question], ratings: &HashMap<QuestionId, Rating>) -> RatingSummary {
	let values: Vec<u8> =
		questions.iter().filter_map(|q| ratings.get(&q.id)).map(|r| r.value()).collect();

	RatingSummary { answered: values.len(), total: questions.len(), average: mean(&values) }
}

/// Average rating per tag over rated questions, best first, ties by tag name
pub fn tag_averages(questions: &[Question], ratings: &HashMap<QuestionId, Rating>) -> Vec<TagAverage> {
	let mut by_tag: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
	for question in questions {
		let Some(rating) = ratings.get(&question.id) else { continue };
		for tag in &question.tags {
			by_tag.entry(tag.as_str()).or_default().push(rating.value());
		}
	}

	let mut averages: Vec<TagAverage> = by_tag
		.into_iter()
		.filter_map(|(tag, values)| {
			Some(TagAverage { tag: tag.to_string(), average: mean(&values)?, count: values.len() })
		})
		.collect();

	// BTreeMap already ordered the names; a stable sort keeps that for ties
	averages.sort_by_key(|t| std::cmp::Reverse(OrderedFloat(t.average)));
	averages
}

/// Every stored rating as `(question, rating)`, lowest question id first.
/// Ratings for questions outside the deck are charted too.
pub fn ratings_series(ratings: &HashMap<QuestionId, Rating>) -> Vec<(QuestionId, Rating)> {
	let mut series: Vec<_> = ratings.iter().map(|(&id, &rating)| (id, rating)).collect();
	series.sort_unstable_by_key(|&(id, _)| id);
	series
}

/// Short markdown write-up of how the selected entity's answers look overall
pub fn analysis_summary(
	entity_name: Option<&str>,
	questions: &[Question],
	ratings: &HashMap<QuestionId, Rating>,
) -> String {
	let Some(name) = entity_name else {
		return "Please select a partner first.".to_string();
	};

	let summary = summarize(questions, ratings);
	let Some(average) = summary.average else {
		return format!("No analysis available. Please answer some questions for {name}.");
	};

	let mut text = format!("### Analysis for {name}\n\n");
	text.push_str(&format!("You've answered {} out of {} questions.\n\n", summary.answered, summary.total));
	text.push_str(&format!("Your average rating is {average:.1} out of 5.\n\n"));

	let outlook = if average > 4.0 {
		format!("Overall, you seem to have a very positive outlook on your relationship with {name}!\n")
	} else if average > 3.0 {
		format!("You have a generally positive view of your relationship with {name}, with some areas to explore.\n")
	} else {
		format!("It looks like there are some key areas you might want to discuss with {name}.\n")
	};
	text.push_str(&outlook);
	text
}

fn mean(values: &[u8]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	Some(values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64)
}
