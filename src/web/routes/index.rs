use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};

use crate::web::state::AppState;
use crate::web::templates;

pub(crate) async fn index(State(state): State<AppState>) -> Response {
    let total = state.navigator.index().len();
    let mut resp = Html(templates::render_index(state.resume_page, total)).into_response();
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    resp
}
