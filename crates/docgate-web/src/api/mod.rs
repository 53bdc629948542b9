mod auth_handlers;
mod messages;
mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/message", post(messages::receive_message))
        .route("/auth/login", post(auth_handlers::login))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
}
