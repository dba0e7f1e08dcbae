use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web"]
struct WebAssets;

const INDEX: &str = "index.html";

/// Serve the embedded single-page UI. Unknown paths get `index.html`.
pub async fn serve_static(uri: Uri) -> Response {
    let requested = uri.path().trim_start_matches('/');

    let (path, content) = match <WebAssets as Embed>::get(requested) {
        Some(content) if !requested.is_empty() => (requested, content),
        _ => match <WebAssets as Embed>::get(INDEX) {
            Some(content) => (INDEX, content),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref())],
        content.data.into_owned(),
    )
        .into_response()
}
