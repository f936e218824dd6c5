mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Catalog, Config, Postgres, Query, Scoring, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_lowercase();
	cfg.catalog.default_source = cfg.catalog.default_source.trim().to_string();

	if cfg.query.default_per_page > cfg.query.max_per_page {
		cfg.query.default_per_page = cfg.query.max_per_page;
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.query.default_per_page == 0 {
		return Err(Error::Validation {
			message: "query.default_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.query.max_per_page == 0 {
		return Err(Error::Validation {
			message: "query.max_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.tier_count == 0 {
		return Err(Error::Validation {
			message: "scoring.tier_count must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.max_candidates == 0 {
		return Err(Error::Validation {
			message: "scoring.max_candidates must be greater than zero.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.scoring.engagement_percentile)
		|| cfg.scoring.engagement_percentile == 0.0
	{
		return Err(Error::Validation {
			message: "scoring.engagement_percentile must be greater than 0.0 and at most 1.0."
				.to_string(),
		});
	}
	if !(0..=100).contains(&cfg.scoring.rating_threshold) {
		return Err(Error::Validation {
			message: "scoring.rating_threshold must be in the range 0-100.".to_string(),
		});
	}
	if cfg.scoring.engagement_cap <= 0 {
		return Err(Error::Validation {
			message: "scoring.engagement_cap must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("scoring.favorite_bonus", cfg.scoring.favorite_bonus),
		("scoring.rating_bonus", cfg.scoring.rating_bonus),
		("scoring.performer_weight", cfg.scoring.performer_weight),
		("scoring.tag_weight", cfg.scoring.tag_weight),
		("scoring.studio_weight", cfg.scoring.studio_weight),
		("scoring.engagement_bonus", cfg.scoring.engagement_bonus),
		("scoring.unwatched_bonus", cfg.scoring.unwatched_bonus),
		("scoring.stale_watch_bonus", cfg.scoring.stale_watch_bonus),
		("scoring.recent_watch_penalty", cfg.scoring.recent_watch_penalty),
		("scoring.day_watch_penalty", cfg.scoring.day_watch_penalty),
	] {
		if !value.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if value < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be zero or greater."),
			});
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
