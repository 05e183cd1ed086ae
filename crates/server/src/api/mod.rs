use shared::{
    domain::{ArtworkId, ArtworkRecord, PipelineStatus, ProfileSummary, UserId},
    error::ApiError,
    protocol::{
        ArtworkFields, ArtworkFilter, ArtworkList, ArtworkPatch, CreateArtworkRequest,
        ListArtworksQuery,
    },
};
use storage::Storage;

pub const MAX_TEXT_FIELD_CHARS: usize = 200;
pub const MAX_DISPLAY_NAME_CHARS: usize = 80;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub max_list_limit: u32,
}

pub async fn create_profile(
    ctx: &ApiContext,
    display_name: &str,
) -> Result<ProfileSummary, ApiError> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::validation("display_name must not be empty"));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(ApiError::validation("display_name is too long"));
    }
    ctx.storage
        .create_profile(display_name)
        .await
        .map_err(internal)
}

pub async fn load_profile(ctx: &ApiContext, user_id: UserId) -> Result<ProfileSummary, ApiError> {
    ctx.storage
        .load_profile(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("profile not found"))
}

pub async fn list_artworks(
    ctx: &ApiContext,
    query: &ListArtworksQuery,
) -> Result<ArtworkList, ApiError> {
    let limit = query
        .limit
        .unwrap_or(ctx.max_list_limit)
        .clamp(1, ctx.max_list_limit.max(1));
    let data = ctx
        .storage
        .list_artworks_for_user(
            query.user_id,
            &ArtworkFilter {
                status: query.status,
            },
            limit,
        )
        .await
        .map_err(internal)?;
    Ok(ArtworkList { data })
}

pub async fn create_artwork(
    ctx: &ApiContext,
    request: CreateArtworkRequest,
) -> Result<ArtworkRecord, ApiError> {
    let fields = normalize_fields(request.fields)?;
    load_profile(ctx, request.user_id).await?;
    ctx.storage
        .insert_artwork(request.user_id, &fields)
        .await
        .map_err(internal)
}

pub async fn update_artwork(
    ctx: &ApiContext,
    artwork_id: ArtworkId,
    patch: ArtworkPatch,
) -> Result<ArtworkRecord, ApiError> {
    let patch = normalize_patch(patch)?;
    ctx.storage
        .update_artwork(artwork_id, &patch)
        .await
        .map_err(internal)?
        .ok_or_else(|| artwork_not_found(artwork_id))
}

pub async fn update_artwork_status(
    ctx: &ApiContext,
    artwork_id: ArtworkId,
    status: PipelineStatus,
) -> Result<(), ApiError> {
    let updated = ctx
        .storage
        .update_artwork_status(artwork_id, status)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(artwork_not_found(artwork_id));
    }
    Ok(())
}

pub async fn delete_artwork(ctx: &ApiContext, artwork_id: ArtworkId) -> Result<(), ApiError> {
    let deleted = ctx
        .storage
        .delete_artwork(artwork_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(artwork_not_found(artwork_id));
    }
    Ok(())
}

fn normalize_fields(mut fields: ArtworkFields) -> Result<ArtworkFields, ApiError> {
    fields.title = required_text("title", &fields.title)?;
    fields.medium = required_text("medium", &fields.medium)?;
    validate_price(fields.price)?;
    fields.description = fields.description.and_then(non_blank);
    fields.image_url = fields.image_url.and_then(non_blank);
    Ok(fields)
}

fn normalize_patch(mut patch: ArtworkPatch) -> Result<ArtworkPatch, ApiError> {
    if let Some(title) = patch.title.as_deref() {
        patch.title = Some(required_text("title", title)?);
    }
    if let Some(medium) = patch.medium.as_deref() {
        patch.medium = Some(required_text("medium", medium)?);
    }
    validate_price(patch.price.flatten())?;
    // A blank string clears the field just like an explicit null.
    patch.description = patch.description.map(|value| value.and_then(non_blank));
    patch.image_url = patch.image_url.map(|value| value.and_then(non_blank));
    Ok(patch)
}

fn required_text(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_TEXT_FIELD_CHARS {
        return Err(ApiError::validation(format!(
            "{field} exceeds {MAX_TEXT_FIELD_CHARS} characters"
        )));
    }
    Ok(value.to_string())
}

fn validate_price(price: Option<f64>) -> Result<(), ApiError> {
    match price {
        Some(price) if !price.is_finite() || price < 0.0 => Err(ApiError::validation(
            "price must be a finite, non-negative amount",
        )),
        _ => Ok(()),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn artwork_not_found(artwork_id: ArtworkId) -> ApiError {
    ApiError::not_found(format!("artwork {} not found", artwork_id.0))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
