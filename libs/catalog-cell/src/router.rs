use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Extension, Router,
};

use shared_database::AppState;
use shared_utils::extractor::authenticate_admin;

use crate::descriptor::{self, EntityDescriptor};
use crate::handlers;

/// Reads are public, writes are admin-realm. Auth is layered per method
/// so both can share a path.
fn entity_routes(state: Arc<AppState>, prefix: &str, entity: &EntityDescriptor) -> Router {
    let admin_auth = middleware::from_fn_with_state(state.clone(), authenticate_admin);

    // Paths are registered in full (rather than via `nest`) so the
    // collection routes answer with and without a trailing slash.
    let collection = get(handlers::list_entities)
        .merge(post(handlers::create_entity).layer(admin_auth.clone()));

    Router::new()
        .route(prefix, collection.clone())
        .route(&format!("{prefix}/"), collection)
        .route(
            &format!("{prefix}/{{id}}"),
            get(handlers::get_entity).merge(
                put(handlers::update_entity)
                    .delete(handlers::delete_entity)
                    .layer(admin_auth),
            ),
        )
        .layer(Extension(entity.clone()))
        .with_state(state)
}

/// One sub-router per catalog entity, mounted under its plural prefix.
pub fn catalog_routes(state: Arc<AppState>) -> Router {
    let mut router = Router::new();
    for &(prefix, entity) in descriptor::ALL {
        router = router.merge(entity_routes(state.clone(), prefix, entity));
    }
    router
}
