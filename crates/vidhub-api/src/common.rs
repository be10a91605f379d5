// Common DTOs for the public API
//
// Every success response is wrapped in the same envelope:
// {"statusCode": c, "data": ..., "message": m, "success": true}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform success envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// HTTP status code echoed in the body.
    pub status_code: u16,
    /// Operation payload.
    pub data: T,
    /// Human-readable outcome message.
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: true,
        }
    }

    /// 200 OK envelope.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// 201 Created envelope.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Pagination query parameters shared by list endpoints.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Page size (default 20, capped at 100).
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = i64::from(self.limit.unwrap_or(20).clamp(1, 100));
        let page = i64::from(self.page.unwrap_or(1).max(1));
        (limit, (page - 1) * limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = ApiResponse::ok(serde_json::json!({"a": 1}), "done");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["data"]["a"], 1);
        assert_eq!(value["message"], "done");
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_page_query_defaults() {
        assert_eq!(PageQuery::default().limit_offset(), (20, 0));
    }

    #[test]
    fn test_page_query_bounds() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(500),
        };
        // limit capped at 100, offset derived from the capped value
        assert_eq!(query.limit_offset(), (100, 200));

        let query = PageQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(query.limit_offset(), (1, 0));
    }
}
