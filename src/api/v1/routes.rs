/*
 * Responsibility
 * - v1 URL structure
 * - Which roles may call which route (auth gate applied per route group)
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::api::v1::handlers::videos::{create_video, delete_video, get_video, list_videos};
use crate::middleware::auth::access;
use crate::services::auth::Role;
use crate::state::AppState;

const VIEWERS: &[Role] = &[Role::Admin, Role::Parent];
const ADMINS: &[Role] = &[Role::Admin];

pub fn routes(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/media/videos", get(list_videos))
        .route("/media/videos/{id}", get(get_video));

    let write = Router::new()
        .route("/media/videos", post(create_video))
        .route("/media/videos/{id}", delete(delete_video));

    // Same paths, disjoint methods: merge combines them per path.
    Router::new()
        .merge(access::apply(read, state, VIEWERS))
        .merge(access::apply(write, state, ADMINS))
}
