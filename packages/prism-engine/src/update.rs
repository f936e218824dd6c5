use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{Error, PrismEngine, Result};
use prism_catalog::{
	entity::{EntityRef, EntityType},
	provider::EntityUpdate,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SetRatingRequest {
	pub user_id: String,
	pub entity_type: EntityType,
	pub entity: EntityRef,
	/// `None` clears the rating; favorite state is untouched either way.
	pub rating: Option<i16>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SetFavoriteRequest {
	pub user_id: String,
	pub entity_type: EntityType,
	pub entity: EntityRef,
	pub favorite: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecordWatchRequest {
	pub user_id: String,
	pub entity_type: EntityType,
	pub entity: EntityRef,
}

/// Field-level catalog edit, forwarded verbatim to the upstream provider.
/// The snapshot keeps serving the old values until the version signal
/// reports the upstream change.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateEntityRequest {
	pub user_id: String,
	pub entity_type: EntityType,
	pub entity: EntityRef,
	pub fields: Value,
}

impl PrismEngine {
	pub async fn set_rating(&self, req: SetRatingRequest) -> Result<()> {
		require_subject(&req.user_id, &req.entity)?;

		if let Some(rating) = req.rating
			&& !(0..=100).contains(&rating)
		{
			return Err(Error::InvalidRequest {
				message: format!("Rating must be in the range 0-100, got {rating}."),
			});
		}

		self.overlay.upsert_rating(&req.user_id, req.entity_type, &req.entity, req.rating).await?;

		info!(
			user_id = %req.user_id,
			entity_type = req.entity_type.as_str(),
			entity_id = %req.entity.id,
			rating = req.rating,
			"Rating updated."
		);

		Ok(())
	}

	pub async fn set_favorite(&self, req: SetFavoriteRequest) -> Result<()> {
		require_subject(&req.user_id, &req.entity)?;

		self.overlay
			.set_favorite(&req.user_id, req.entity_type, &req.entity, req.favorite)
			.await?;

		info!(
			user_id = %req.user_id,
			entity_type = req.entity_type.as_str(),
			entity_id = %req.entity.id,
			favorite = req.favorite,
			"Favorite updated."
		);

		Ok(())
	}

	pub async fn record_watch(&self, req: RecordWatchRequest) -> Result<()> {
		require_subject(&req.user_id, &req.entity)?;

		self.overlay.record_watch(&req.user_id, req.entity_type, &req.entity).await?;

		Ok(())
	}

	pub async fn update_entity(&self, req: UpdateEntityRequest) -> Result<()> {
		require_subject(&req.user_id, &req.entity)?;

		let fields_ok =
			req.fields.as_object().map(|fields| !fields.is_empty()).unwrap_or(false);

		if !fields_ok {
			return Err(Error::InvalidRequest {
				message: "Entity updates need a non-empty field object.".into(),
			});
		}

		let update = EntityUpdate {
			entity_type: req.entity_type,
			entity: req.entity.clone(),
			fields: req.fields,
		};

		self.catalog.update_entity(&update).await?;

		info!(
			user_id = %req.user_id,
			entity_type = req.entity_type.as_str(),
			entity_id = %req.entity.id,
			"Entity update forwarded upstream."
		);

		Ok(())
	}
}

fn require_subject(user_id: &str, entity: &EntityRef) -> Result<()> {
	if user_id.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "A user id is required.".into() });
	}
	if entity.id.trim().is_empty() || entity.source_id.trim().is_empty() {
		return Err(Error::InvalidRequest {
			message: "Entity id and source id are required.".into(),
		});
	}

	Ok(())
}
