use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::debug;

use crate::library::navigator::{RedirectKind, Resolution};
use crate::web::state::AppState;
use crate::web::templates;

pub(crate) async fn page(
    State(state): State<AppState>,
    AxumPath(raw): AxumPath<String>,
) -> Response {
    match state.navigator.resolve(&raw) {
        Resolution::Page(view) => {
            state.page_state.save_detached(view.page);
            Html(templates::render_page(
                view.reference.as_str(),
                view.page,
                view.previous_page,
                view.next_page,
                view.total,
            ))
            .into_response()
        }
        Resolution::Redirect { page, kind } => {
            debug!(target: "web", requested = %raw, target_page = page, ?kind, "page redirect");
            let to = format!("/page/{page}");
            match kind {
                // 303：把非法输入统一送回起点。
                RedirectKind::Default => Redirect::to(&to).into_response(),
                // 307：边界可能在下次重建索引后变化，不能被缓存。
                RedirectKind::Clamp => Redirect::temporary(&to).into_response(),
            }
        }
        Resolution::NoContent => {
            (StatusCode::NOT_FOUND, Html(templates::render_empty())).into_response()
        }
    }
}
