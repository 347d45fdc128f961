use axum::{routing::post, Router};

use crate::{api::handlers, Metavec};

pub fn router(metavec: Metavec) -> Router {
    Router::new()
        .route("/process_embeddings", post(handlers::process_embeddings))
        .route(
            "/process_single_embedding",
            post(handlers::process_single_embedding),
        )
        .with_state(metavec)
}
