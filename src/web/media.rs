//! Media file responses for the kiosk front end.
//!
//! Files are read from the content root on every request; the catalog only
//! holds paths. Paths are resolved by
//! [`CatalogService::resolve_media`](crate::services::CatalogService::resolve_media),
//! which refuses anything outside the served folders.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::services::ResolvedMedia;

/// Reads a resolved file and wraps it in a response.
pub async fn serve(media: &ResolvedMedia) -> Response {
    match tokio::fs::read(&media.path).await {
        Ok(bytes) => file_response(media, bytes),
        Err(e) => {
            tracing::warn!(path = %media.path.display(), error = %e, "Failed to read media file");
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}

/// Creates an HTTP response for a file with its content type.
fn file_response(media: &ResolvedMedia, content: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media.mime.as_str())
        .header(header::CACHE_CONTROL, cache_control_for(&media.mime))
        .body(Body::from(content))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create response",
            )
                .into_response()
        })
}

/// Cache policy by content type.
///
/// Text sidecars can be edited while the kiosk runs, so they are always
/// revalidated. Images and videos are cached for an hour.
fn cache_control_for(mime: &str) -> &'static str {
    if mime.starts_with("image/") || mime.starts_with("video/") {
        "public, max-age=3600"
    } else {
        "no-cache, must-revalidate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cache_control_for() {
        assert_eq!(cache_control_for("image/png"), "public, max-age=3600");
        assert_eq!(cache_control_for("video/mp4"), "public, max-age=3600");
        assert_eq!(cache_control_for("text/plain"), "no-cache, must-revalidate");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let media = ResolvedMedia {
            path: PathBuf::from("/definitely/not/here.jpg"),
            mime: "image/jpeg".to_string(),
        };
        assert_eq!(serve(&media).await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_file_response_headers() {
        let media = ResolvedMedia {
            path: PathBuf::from("a.mp4"),
            mime: "video/mp4".to_string(),
        };
        let response = file_response(&media, vec![1, 2, 3]);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    }
}
