//! Response bodies and error rendering
//!
//! Every action answers with a small JSON object carrying either a `success`
//! or an `error` label. The caller maps labels to localized text, so the
//! labels are part of the contract and never carry detail.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl ActionResponse {
    pub fn success(label: impl Into<String>) -> Self {
        Self {
            success: Some(label.into()),
            error: None,
            id: None,
        }
    }

    pub fn created(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::success("created")
        }
    }

    pub fn error(label: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(label.into()),
            id: None,
        }
    }
}

/// HTTP status for each error label
pub fn status_code(error: &WorkflowError) -> StatusCode {
    match error {
        WorkflowError::UnknownEntity(_) | WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        WorkflowError::InvalidStatus { .. } | WorkflowError::InvalidPayload(_) => {
            StatusCode::BAD_REQUEST
        }
        WorkflowError::InvalidTransition { .. } | WorkflowError::Conflict { .. } => {
            StatusCode::CONFLICT
        }
        WorkflowError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        if self.is_rejection() {
            tracing::debug!(error = %self, label = self.label(), "Request rejected");
        } else {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(ActionResponse::error(self.label()))).into_response()
    }
}

/// JSON body extractor that answers `invalid payload` instead of axum's plain-text rejection
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = WorkflowError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| WorkflowError::InvalidPayload(rejection.body_text()))?;
        Ok(ValidatedJson(inner))
    }
}

/// Query string extractor with the same error shape
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
{
    type Rejection = WorkflowError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(inner) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| WorkflowError::InvalidPayload(rejection.body_text()))?;
        Ok(ValidatedQuery(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bodies_omit_absent_fields() {
        assert_eq!(
            serde_json::to_value(ActionResponse::success("approved")).unwrap(),
            json!({"success": "approved"})
        );
        assert_eq!(
            serde_json::to_value(ActionResponse::error("unauthorized")).unwrap(),
            json!({"error": "unauthorized"})
        );
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(ActionResponse::created(id)).unwrap(),
            json!({"success": "created", "id": id})
        );
    }

    #[test]
    fn test_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            status_code(&WorkflowError::Unauthorized {
                actor: "u@bruss.example".into(),
                collection: "deviations".into(),
                from: "pending".into(),
                to: "approved".into(),
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_code(&WorkflowError::Conflict {
                collection: "deviations".into(),
                id
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code(&WorkflowError::InvalidStatus {
                collection: "deviations".into(),
                status: "archived".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&WorkflowError::Store(crate::store::StoreError::Duplicate(id))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
