use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Body of every `PUT …/reorder/bulk` route
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReorderRequest {
    /// Ids in their new order; the first one gets rank 1
    #[serde(alias = "orderedIds")]
    pub ordered_ids: Vec<String>,
}

/// Reads `ordered_ids` (or `orderedIds`) from a reorder body. A missing field,
/// a non-array or a non-string entry is a 400.
pub fn ordered_ids_from(body: &Value) -> Result<Vec<String>, ApiError> {
    let ids = body
        .get("ordered_ids")
        .or_else(|| body.get("orderedIds"))
        .ok_or_else(|| ApiError::bad_request("ordered_ids is required"))?;

    let ids = ids
        .as_array()
        .ok_or_else(|| ApiError::bad_request("ordered_ids must be an array"))?;

    ids.iter()
        .map(|id| {
            id.as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::bad_request("ordered_ids must contain only strings"))
        })
        .collect()
}

/// Same as [`ordered_ids_from`] for collections keyed by UUID.
pub fn ordered_uuids_from(body: &Value) -> Result<Vec<Uuid>, ApiError> {
    ordered_ids_from(body)?
        .iter()
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|_| ApiError::bad_request(format!("'{id}' is not a valid id")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn accepts_snake_and_camel_case() {
        assert_eq!(
            ordered_ids_from(&json!({ "ordered_ids": ["b", "a"] })).unwrap(),
            vec!["b", "a"]
        );
        assert_eq!(
            ordered_ids_from(&json!({ "orderedIds": ["c"] })).unwrap(),
            vec!["c"]
        );
        assert!(ordered_ids_from(&json!({ "ordered_ids": [] }))
            .unwrap()
            .is_empty());
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "ordered_ids": "a,b" }))]
    #[case(json!({ "ordered_ids": null }))]
    #[case(json!({ "ordered_ids": [1, 2] }))]
    fn malformed_bodies_are_bad_requests(#[case] body: Value) {
        assert_matches!(ordered_ids_from(&body), Err(ApiError::BadRequest { .. }));
    }

    #[test]
    fn uuid_ids_must_parse() {
        assert_matches!(
            ordered_uuids_from(&json!({ "ordered_ids": ["not-a-uuid"] })),
            Err(ApiError::BadRequest { .. })
        );
    }
}
