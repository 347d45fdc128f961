use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metavec_domain::outcome::{BatchSummary, Outcome};
use serde::{Deserialize, Serialize};

use crate::Metavec;

#[derive(Deserialize)]
pub struct ProcessEmbeddingsRequest {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ProcessSingleEmbeddingRequest {
    pub user_id: Option<String>,
    pub blob_name: Option<String>,
}

#[derive(Serialize)]
pub struct ProcessEmbeddingsResponse {
    pub message: &'static str,
    pub result: BatchSummary,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

pub async fn process_embeddings(
    State(metavec): State<Metavec>,
    payload: Result<Json<ProcessEmbeddingsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let Some(user_id) = present(request.user_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing user_id in request");
    };

    match metavec.process_all(&user_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ProcessEmbeddingsResponse {
                message: "Processing completed",
                result,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to process embeddings for user {}: {:#}", user_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

pub async fn process_single_embedding(
    State(metavec): State<Metavec>,
    payload: Result<Json<ProcessSingleEmbeddingRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let (Some(user_id), Some(blob_name)) = (present(request.user_id), present(request.blob_name))
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing user_id or blob_name in request",
        );
    };

    let outcome = metavec.process_one(&user_id, &blob_name).await;
    let status = match outcome {
        Outcome::Success { .. } => StatusCode::OK,
        Outcome::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(outcome)).into_response()
}
