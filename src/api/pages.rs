//! Static simulator pages.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const MATRIX_HTML: &str = include_str!("../../templates/matrix.html");

/// Main simulator page.
pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Interaction matrix page.
pub async fn matrix() -> Html<&'static str> {
    Html(MATRIX_HTML)
}
