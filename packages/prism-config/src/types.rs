use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub catalog: Catalog,
	pub query: Query,
	pub scoring: Scoring,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}

impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

impl Default for Postgres {
	fn default() -> Self {
		Self { dsn: String::new(), pool_max_conns: 8 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
	/// Source instance treated as canonical when the snapshot does not
	/// flag one. Empty means "trust the snapshot".
	pub default_source: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Query {
	pub default_per_page: u32,
	pub max_per_page: u32,
}

impl Default for Query {
	fn default() -> Self {
		Self { default_per_page: 25, max_per_page: 250 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Scoring {
	pub favorite_bonus: f64,
	pub rating_bonus: f64,
	/// Explicit ratings at or above this count as "high" evidence (0-100).
	pub rating_threshold: i16,
	pub performer_weight: f64,
	pub tag_weight: f64,
	pub studio_weight: f64,
	pub engagement_bonus: f64,
	/// Entities at or above this engagement-rate percentile get the bonus.
	pub engagement_percentile: f64,
	pub unwatched_bonus: f64,
	pub stale_watch_bonus: f64,
	pub recent_watch_penalty: f64,
	pub day_watch_penalty: f64,
	/// Interaction count cap for the engagement multiplier.
	pub engagement_cap: i64,
	pub tier_count: u32,
	pub max_candidates: u32,
}

impl Default for Scoring {
	fn default() -> Self {
		Self {
			favorite_bonus: 25.0,
			rating_bonus: 20.0,
			rating_threshold: 80,
			performer_weight: 3.0,
			tag_weight: 1.0,
			studio_weight: 2.0,
			engagement_bonus: 10.0,
			engagement_percentile: 0.5,
			unwatched_bonus: 30.0,
			stale_watch_bonus: 20.0,
			recent_watch_penalty: 10.0,
			day_watch_penalty: 30.0,
			engagement_cap: 25,
			tier_count: 10,
			max_candidates: 500,
		}
	}
}
