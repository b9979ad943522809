pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::assessment::handlers as quiz;
use crate::identity::handlers as auth;
use crate::purchases::handlers as purchases;
use crate::state::AppState;
use crate::users::handlers as users;
use crate::users::photos::MAX_PHOTO_BYTES;

// Room for the multipart framing around the largest accepted photo.
const PHOTO_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Quiz
        .route("/api/v1/quiz/questions", get(quiz::handle_list_questions))
        .route("/api/v1/quiz/sessions", post(quiz::handle_create_session))
        .route("/api/v1/quiz/sessions/:id", get(quiz::handle_get_session))
        .route(
            "/api/v1/quiz/sessions/:id/answers",
            post(quiz::handle_answer),
        )
        .route(
            "/api/v1/quiz/sessions/:id/plan/retry",
            post(quiz::handle_retry_plan),
        )
        .route(
            "/api/v1/quiz/sessions/:id/selection/:module_id",
            post(quiz::handle_toggle_module),
        )
        .route("/api/v1/quiz/sessions/:id/cart", get(quiz::handle_get_cart))
        .route(
            "/api/v1/quiz/sessions/:id/checkout",
            post(quiz::handle_checkout),
        )
        // Auth
        .route("/api/v1/auth/otp/request", post(auth::handle_request_code))
        .route("/api/v1/auth/otp/confirm", post(auth::handle_confirm_code))
        .route("/api/v1/auth/password", post(auth::handle_password_sign_in))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        // Member dashboard
        .route(
            "/api/v1/me",
            get(users::handle_get_me).patch(users::handle_update_me),
        )
        .route(
            "/api/v1/me/photo",
            post(users::handle_upload_photo).layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        .route("/api/v1/me/progress", get(users::handle_get_progress))
        .route(
            "/api/v1/me/progress/:module_id",
            put(users::handle_set_progress),
        )
        // Admin
        .route(
            "/api/v1/admin/purchases",
            get(purchases::handle_list_pending),
        )
        .route(
            "/api/v1/admin/purchases/:id/approve",
            post(purchases::handle_approve),
        )
        .route("/api/v1/admin/users", get(users::handle_list_users))
        .route(
            "/api/v1/admin/users/:uid",
            delete(users::handle_delete_user),
        )
        .with_state(state)
}
