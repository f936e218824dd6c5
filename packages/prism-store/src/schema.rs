/// Overlay-store DDL. Rendered as one script and executed statement by
/// statement inside [`Db::ensure_schema`](crate::Db::ensure_schema); keep
/// every statement free of embedded semicolons.
pub fn render_schema() -> String {
	"\
CREATE TABLE IF NOT EXISTS overlay_ratings (
	user_id     TEXT NOT NULL,
	entity_type TEXT NOT NULL,
	entity_id   TEXT NOT NULL,
	source_id   TEXT NOT NULL,
	rating      SMALLINT,
	favorite    BOOLEAN NOT NULL DEFAULT FALSE,
	updated_at  TIMESTAMPTZ NOT NULL,
	PRIMARY KEY (user_id, entity_type, entity_id, source_id)
);
CREATE TABLE IF NOT EXISTS overlay_watch (
	user_id         TEXT NOT NULL,
	entity_type     TEXT NOT NULL,
	entity_id       TEXT NOT NULL,
	source_id       TEXT NOT NULL,
	play_count      BIGINT NOT NULL DEFAULT 0,
	last_watched_at TIMESTAMPTZ,
	PRIMARY KEY (user_id, entity_type, entity_id, source_id)
);
CREATE TABLE IF NOT EXISTS overlay_engagement (
	entity_type     TEXT NOT NULL,
	entity_id       TEXT NOT NULL,
	source_id       TEXT NOT NULL,
	view_count      BIGINT NOT NULL DEFAULT 0,
	engagement_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
	PRIMARY KEY (entity_type, entity_id, source_id)
);
CREATE TABLE IF NOT EXISTS user_restrictions (
	user_id     TEXT NOT NULL,
	entity_type TEXT NOT NULL,
	mode        TEXT NOT NULL CHECK (mode IN ('include', 'exclude')),
	ids         TEXT[] NOT NULL DEFAULT '{}',
	PRIMARY KEY (user_id, entity_type)
);
CREATE TABLE IF NOT EXISTS user_profiles (
	user_id  TEXT PRIMARY KEY,
	elevated BOOLEAN NOT NULL DEFAULT FALSE
);
CREATE INDEX IF NOT EXISTS idx_overlay_ratings_user ON overlay_ratings (user_id, entity_type);
CREATE INDEX IF NOT EXISTS idx_overlay_watch_user ON overlay_watch (user_id, entity_type);
CREATE INDEX IF NOT EXISTS idx_overlay_engagement_type ON overlay_engagement (entity_type)"
		.to_string()
}
