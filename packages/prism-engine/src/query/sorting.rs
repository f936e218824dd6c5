use std::cmp::Ordering;

use crate::{
	Error, Result,
	query::fields::{Field, FieldKind, Queryable},
	query::overlay::OverlayJoin,
};
use prism_domain::shuffle::{ordering_key, seed_from_parts};

/// Parsed sort directive. `-field` sorts descending; `random` derives a
/// stable per-user seed from the catalog version so pagination never
/// repeats or skips entities within one snapshot; `random_<seed>` pins the
/// seed verbatim for shareable orderings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum SortKey {
	Field { field: Field, descending: bool },
	Random { seed: u64 },
}

impl SortKey {
	pub fn needs_overlay(&self) -> bool {
		match self {
			Self::Field { field, .. } => field.overlay(),
			Self::Random { .. } => false,
		}
	}
}

pub(crate) fn parse_sort<T>(raw: Option<&str>, user_id: &str, version: u64) -> Result<SortKey>
where
	T: Queryable,
{
	let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return Ok(SortKey::Field { field: Field::Name, descending: false });
	};

	if raw == "random" {
		let seed = seed_from_parts(&[user_id, &version.to_string()]);

		return Ok(SortKey::Random { seed });
	}
	if let Some(rest) = raw.strip_prefix("random_") {
		let seed = rest.parse::<u64>().unwrap_or_else(|_| seed_from_parts(&[rest]));

		return Ok(SortKey::Random { seed });
	}

	let (name, descending) = match raw.strip_prefix('-') {
		Some(rest) => (rest, true),
		None => (raw, false),
	};
	let field = Field::parse(name)
		.ok_or_else(|| Error::InvalidRequest { message: format!("Unknown sort field '{name}'.") })?;

	if !T::supports(field) {
		return Err(Error::InvalidRequest {
			message: format!("Field '{name}' is not sortable for {}.", T::TYPE.as_str()),
		});
	}
	if field.kind() == FieldKind::IdSet {
		return Err(Error::InvalidRequest {
			message: format!("Field '{name}' is a relation and cannot be sorted on."),
		});
	}

	Ok(SortKey::Field { field, descending })
}

enum SortValues {
	Number(Vec<f64>),
	// Julian day for catalog dates, unix seconds for watch instants. Absent
	// values sort last in either direction.
	Instant(Vec<Option<i64>>),
	Text(Vec<String>),
	Flag(Vec<bool>),
	Random(Vec<u64>),
}

/// Reorder candidate indices in place. The comparator is total and ends on
/// an (id, source) tiebreak, so equal keys still order deterministically.
pub(crate) fn sort_candidates<T>(
	items: &[T],
	order: &mut [u32],
	key: &SortKey,
	overlay: Option<&OverlayJoin>,
) where
	T: Queryable,
{
	let (values, descending) = match key {
		SortKey::Random { seed } => {
			let keys = items
				.iter()
				.map(|item| {
					let composite = format!("{}@{}", item.id(), item.source_id());

					ordering_key(*seed, &composite)
				})
				.collect();

			(SortValues::Random(keys), false)
		},
		SortKey::Field { field, descending } =>
			(field_values(items, *field, overlay), *descending),
	};

	order.sort_by(|&a, &b| {
		compare(&values, a as usize, b as usize, descending)
			.then_with(|| tiebreak(items, a as usize, b as usize))
	});
}

fn field_values<T>(items: &[T], field: Field, overlay: Option<&OverlayJoin>) -> SortValues
where
	T: Queryable,
{
	match (field, field.kind()) {
		(Field::Rating, _) => SortValues::Number(
			items
				.iter()
				.map(|item| {
					overlay
						.and_then(|join| join.rating(&item.entity_ref()))
						.map(f64::from)
						.unwrap_or(0.0)
				})
				.collect(),
		),
		(Field::PlayCount, _) => SortValues::Number(
			items
				.iter()
				.map(|item| {
					overlay.map(|join| join.play_count(&item.entity_ref())).unwrap_or(0) as f64
				})
				.collect(),
		),
		(Field::LastWatchedAt, _) => SortValues::Instant(
			items
				.iter()
				.map(|item| {
					overlay
						.and_then(|join| join.last_watched_at(&item.entity_ref()))
						.map(|at| at.unix_timestamp())
				})
				.collect(),
		),
		(Field::Favorite, _) => SortValues::Flag(
			items
				.iter()
				.map(|item| {
					overlay.map(|join| join.favorite(&item.entity_ref())).unwrap_or(false)
				})
				.collect(),
		),
		(_, FieldKind::Number) => SortValues::Number(
			items.iter().map(|item| item.number_field(field).unwrap_or(0.0)).collect(),
		),
		(_, FieldKind::Date) => SortValues::Instant(
			items
				.iter()
				.map(|item| {
					item.date_field(field)
						.flatten()
						.map(|date| i64::from(date.to_julian_day()))
				})
				.collect(),
		),
		_ => SortValues::Text(
			items
				.iter()
				.map(|item| item.text_field(field).unwrap_or("").to_lowercase())
				.collect(),
		),
	}
}

fn compare(values: &SortValues, a: usize, b: usize, descending: bool) -> Ordering {
	if let SortValues::Instant(values) = values {
		// Absent instants sort last regardless of direction.
		return match (values[a], values[b]) {
			(Some(a), Some(b)) =>
				if descending {
					b.cmp(&a)
				} else {
					a.cmp(&b)
				},
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		};
	}

	let ordering = match values {
		SortValues::Number(values) => values[a].total_cmp(&values[b]),
		SortValues::Text(values) => values[a].cmp(&values[b]),
		SortValues::Flag(values) => values[a].cmp(&values[b]),
		SortValues::Random(values) => values[a].cmp(&values[b]),
		SortValues::Instant(_) => Ordering::Equal,
	};

	if descending { ordering.reverse() } else { ordering }
}

fn tiebreak<T>(items: &[T], a: usize, b: usize) -> Ordering
where
	T: Queryable,
{
	items[a]
		.id()
		.cmp(items[b].id())
		.then_with(|| items[a].source_id().cmp(items[b].source_id()))
}
