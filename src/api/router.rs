//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`; a `TraceLayer` logs every request.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router over the given context.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/appointments",
            post(endpoints::appointments::propose).get(endpoints::appointments::list),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail).delete(endpoints::appointments::cancel),
        )
        .route(
            "/appointments/client/:client_id",
            get(endpoints::appointments::by_client),
        )
        .route(
            "/appointments/provider/:provider_id",
            get(endpoints::appointments::by_provider),
        )
        .route("/appointments/:id/confirm", put(endpoints::appointments::confirm))
        .route("/appointments/:id/refuse", put(endpoints::appointments::refuse))
        .route(
            "/appointments/:id/reschedule",
            put(endpoints::appointments::reschedule),
        )
        .route(
            "/consultations",
            post(endpoints::consultations::create).get(endpoints::consultations::list),
        )
        .route(
            "/consultations/:id",
            get(endpoints::consultations::detail)
                .put(endpoints::consultations::update)
                .delete(endpoints::consultations::delete),
        )
        .route(
            "/consultations/client/:client_id",
            get(endpoints::consultations::by_client),
        )
        .route(
            "/consultations/provider/:provider_id",
            get(endpoints::consultations::by_provider),
        )
        .route(
            "/consultations/appointment/:id",
            get(endpoints::consultations::by_appointment),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
