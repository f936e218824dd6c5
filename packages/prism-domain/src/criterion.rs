use std::{collections::HashSet, hash::BuildHasher};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modifier {
	Equals,
	NotEquals,
	GreaterThan,
	LessThan,
	Between,
	Includes,
	IncludesAll,
	Excludes,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NumberCriterion {
	pub modifier: Modifier,
	pub value: Option<f64>,
	pub value2: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DateCriterion {
	pub modifier: Modifier,
	pub value: Option<Date>,
	pub value2: Option<Date>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TextCriterion {
	pub modifier: Modifier,
	pub value: String,
}

/// Lenient numeric parsing for caller-supplied filter values. Unparseable
/// input degrades to `None`, which drops the criterion instead of failing
/// the whole request.
pub fn parse_number(raw: &str) -> Option<f64> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}

	trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Absent numeric entity fields are treated as 0 by callers before this is
/// reached; the criterion itself never panics on missing bounds.
pub fn match_number(entity_value: f64, criterion: &NumberCriterion) -> bool {
	match criterion.modifier {
		Modifier::Equals => criterion.value.map(|value| entity_value == value).unwrap_or(false),
		Modifier::NotEquals => criterion.value.map(|value| entity_value != value).unwrap_or(false),
		Modifier::GreaterThan =>
			criterion.value.map(|value| entity_value > value).unwrap_or(false),
		Modifier::LessThan => criterion.value.map(|value| entity_value < value).unwrap_or(false),
		Modifier::Between => between(entity_value, criterion.value, criterion.value2),
		Modifier::Includes | Modifier::IncludesAll | Modifier::Excludes => false,
	}
}

/// Absent dates fail every comparison rather than matching or panicking.
pub fn match_date(entity_value: Option<Date>, criterion: &DateCriterion) -> bool {
	let Some(entity_value) = entity_value else {
		return false;
	};

	match criterion.modifier {
		Modifier::Equals => criterion.value.map(|value| entity_value == value).unwrap_or(false),
		Modifier::NotEquals => criterion.value.map(|value| entity_value != value).unwrap_or(false),
		Modifier::GreaterThan =>
			criterion.value.map(|value| entity_value > value).unwrap_or(false),
		Modifier::LessThan => criterion.value.map(|value| entity_value < value).unwrap_or(false),
		Modifier::Between => between(entity_value, criterion.value, criterion.value2),
		Modifier::Includes | Modifier::IncludesAll | Modifier::Excludes => false,
	}
}

pub fn match_text(entity_value: &str, criterion: &TextCriterion) -> bool {
	let entity_lower = entity_value.to_lowercase();
	let filter_lower = criterion.value.to_lowercase();

	match criterion.modifier {
		Modifier::Equals => entity_lower == filter_lower,
		Modifier::NotEquals => entity_lower != filter_lower,
		Modifier::Includes => entity_lower.contains(&filter_lower),
		Modifier::Excludes => !entity_lower.contains(&filter_lower),
		Modifier::GreaterThan | Modifier::LessThan | Modifier::Between | Modifier::IncludesAll =>
			false,
	}
}

/// Set comparison against pre-expanded filter sets. For `IncludesAll` over a
/// hierarchy field the caller passes one expansion per original filter ID
/// (`expansions`); the entity must intersect every one of them. This is not
/// the same as intersecting the union of all expansions, which would be too
/// permissive.
pub fn match_id_set<S>(
	entity_ids: &[String],
	modifier: Modifier,
	expansions: &[AHashSet<String, S>],
) -> bool
where
	S: BuildHasher,
{
	match modifier {
		Modifier::Includes =>
			expansions.iter().any(|expansion| intersects(entity_ids, expansion)),
		Modifier::IncludesAll =>
			!expansions.is_empty()
				&& expansions.iter().all(|expansion| intersects(entity_ids, expansion)),
		Modifier::Excludes =>
			!expansions.iter().any(|expansion| intersects(entity_ids, expansion)),
		Modifier::Equals
		| Modifier::NotEquals
		| Modifier::GreaterThan
		| Modifier::LessThan
		| Modifier::Between => false,
	}
}

fn intersects<S>(entity_ids: &[String], expansion: &HashSet<String, S>) -> bool
where
	S: BuildHasher,
{
	entity_ids.iter().any(|id| expansion.contains(id))
}

fn between<T>(entity_value: T, low: Option<T>, high: Option<T>) -> bool
where
	T: PartialOrd,
{
	// A missing bound leaves that side of the range open; callers commonly
	// supply partial ranges.
	if let Some(ref low) = low
		&& entity_value < *low
	{
		return false;
	}
	if let Some(ref high) = high
		&& entity_value > *high
	{
		return false;
	}

	low.is_some() || high.is_some()
}
