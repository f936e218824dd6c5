use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;

use crate::{
	Error, Result,
	query::fields::{Field, FieldKind, HierarchyKind, Queryable},
	query::overlay::OverlayJoin,
	snapshot::SnapshotBundle,
};
use prism_domain::criterion::{
	DateCriterion, Modifier, NumberCriterion, TextCriterion, match_date, match_id_set,
	match_number, match_text, parse_number,
};

/// All filter clauses for one request. Composition is logical AND across
/// fields; the `ids` list is applied first as a point lookup.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FilterSet {
	#[serde(default)]
	pub ids: Option<Vec<String>>,
	#[serde(default)]
	pub clauses: Vec<FilterClause>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FilterClause {
	pub field: String,
	pub criterion: CriterionInput,
}

/// Wire-facing criterion. Numeric values arrive as strings and are parsed
/// leniently: an unparseable value drops that criterion alone, never the
/// whole request.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionInput {
	Number { modifier: Modifier, value: Option<String>, value2: Option<String> },
	Date { modifier: Modifier, value: Option<Date>, value2: Option<Date> },
	Text { modifier: Modifier, value: String },
	IdSet { modifier: Modifier, ids: Vec<String>, #[serde(default)] depth: i32 },
	Flag { value: bool },
}

#[derive(Clone, Debug)]
pub(crate) enum ResolvedCriterion {
	Number(NumberCriterion),
	Date(DateCriterion),
	Text(TextCriterion),
	IdSet { modifier: Modifier, expansions: Vec<AHashSet<String>> },
	Flag { value: bool },
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedClause {
	pub field: Field,
	pub criterion: ResolvedCriterion,
}

impl ResolvedClause {
	pub fn expensive(&self) -> bool {
		self.field.overlay()
	}
}

/// Validate and resolve every clause at the boundary. Unknown or
/// unsupported fields are contract violations; degenerate values degrade to
/// dropped clauses.
pub(crate) fn resolve_clauses<T>(
	clauses: &[FilterClause],
	bundle: &SnapshotBundle,
) -> Result<Vec<ResolvedClause>>
where
	T: Queryable,
{
	let mut resolved = Vec::with_capacity(clauses.len());

	for clause in clauses {
		let field = Field::parse(&clause.field).ok_or_else(|| Error::InvalidRequest {
			message: format!("Unknown filter field '{}'.", clause.field),
		})?;

		if !T::supports(field) {
			return Err(Error::InvalidRequest {
				message: format!(
					"Field '{}' is not filterable for {}.",
					clause.field,
					T::TYPE.as_str()
				),
			});
		}

		match resolve_criterion(field, &clause.criterion, bundle)? {
			Some(criterion) => resolved.push(ResolvedClause { field, criterion }),
			None => {
				warn!(field = field.as_str(), "Dropping degenerate filter criterion.");
			},
		}
	}

	Ok(resolved)
}

fn resolve_criterion(
	field: Field,
	input: &CriterionInput,
	bundle: &SnapshotBundle,
) -> Result<Option<ResolvedCriterion>> {
	match (field.kind(), input) {
		(FieldKind::Number, CriterionInput::Number { modifier, value, value2 }) => {
			let value = value.as_deref().and_then(parse_number);
			let value2 = value2.as_deref().and_then(parse_number);

			if value.is_none() && value2.is_none() {
				return Ok(None);
			}

			Ok(Some(ResolvedCriterion::Number(NumberCriterion {
				modifier: *modifier,
				value,
				value2,
			})))
		},
		(FieldKind::Date, CriterionInput::Date { modifier, value, value2 }) => {
			if value.is_none() && value2.is_none() {
				return Ok(None);
			}

			Ok(Some(ResolvedCriterion::Date(DateCriterion {
				modifier: *modifier,
				value: *value,
				value2: *value2,
			})))
		},
		(FieldKind::Text, CriterionInput::Text { modifier, value }) => {
			if value.trim().is_empty() {
				return Ok(None);
			}

			Ok(Some(ResolvedCriterion::Text(TextCriterion {
				modifier: *modifier,
				value: value.clone(),
			})))
		},
		(FieldKind::IdSet, CriterionInput::IdSet { modifier, ids, depth }) => {
			if ids.is_empty() {
				return Ok(None);
			}

			let expansions = match field.hierarchy() {
				Some(HierarchyKind::Tag) => bundle.tag_graph.expand_each(ids, *depth),
				Some(HierarchyKind::Studio) => bundle.studio_graph.expand_each(ids, *depth),
				None => ids
					.iter()
					.map(|id| {
						let mut set = AHashSet::with_capacity(1);

						set.insert(id.clone());

						set
					})
					.collect(),
			};

			Ok(Some(ResolvedCriterion::IdSet { modifier: *modifier, expansions }))
		},
		(FieldKind::Flag, CriterionInput::Flag { value }) =>
			Ok(Some(ResolvedCriterion::Flag { value: *value })),
		_ => Err(Error::InvalidRequest {
			message: format!("Criterion shape does not fit field '{}'.", field.as_str()),
		}),
	}
}

/// Evaluate the catalog-backed clauses against one entity. Overlay-backed
/// clauses are evaluated separately once overlay rows are materialized.
pub(crate) fn entity_matches<T>(entity: &T, clauses: &[ResolvedClause]) -> bool
where
	T: Queryable,
{
	clauses.iter().all(|clause| clause_matches(entity, clause))
}

fn clause_matches<T>(entity: &T, clause: &ResolvedClause) -> bool
where
	T: Queryable,
{
	match &clause.criterion {
		ResolvedCriterion::Number(criterion) => {
			// Absent numeric fields default to 0 rather than failing.
			let value = entity.number_field(clause.field).unwrap_or(0.0);

			match_number(value, criterion)
		},
		ResolvedCriterion::Date(criterion) => {
			let value = entity.date_field(clause.field).flatten();

			match_date(value, criterion)
		},
		ResolvedCriterion::Text(criterion) => {
			let value = entity.text_field(clause.field).unwrap_or("");

			match_text(value, criterion)
		},
		ResolvedCriterion::IdSet { modifier, expansions } => {
			let ids = entity.id_set_field(clause.field).unwrap_or(&[]);

			match_id_set(ids, *modifier, expansions)
		},
		ResolvedCriterion::Flag { .. } => false,
	}
}

/// Evaluate overlay-backed clauses for one entity against the materialized
/// overlay join.
pub(crate) fn overlay_matches<T>(
	entity: &T,
	clauses: &[ResolvedClause],
	overlay: &OverlayJoin,
) -> bool
where
	T: Queryable,
{
	clauses.iter().all(|clause| overlay_clause_matches(entity, clause, overlay))
}

fn overlay_clause_matches<T>(
	entity: &T,
	clause: &ResolvedClause,
	overlay: &OverlayJoin,
) -> bool
where
	T: Queryable,
{
	let entity_ref = entity.entity_ref();

	match (&clause.criterion, clause.field) {
		(ResolvedCriterion::Number(criterion), Field::Rating) => {
			let rating = overlay.rating(&entity_ref).map(f64::from).unwrap_or(0.0);

			match_number(rating, criterion)
		},
		(ResolvedCriterion::Number(criterion), Field::PlayCount) => {
			let plays = overlay.play_count(&entity_ref) as f64;

			match_number(plays, criterion)
		},
		(ResolvedCriterion::Date(criterion), Field::LastWatchedAt) => {
			let watched = overlay.last_watched_at(&entity_ref).map(|at| at.date());

			match_date(watched, criterion)
		},
		(ResolvedCriterion::Flag { value }, Field::Favorite) =>
			overlay.favorite(&entity_ref) == *value,
		_ => false,
	}
}
