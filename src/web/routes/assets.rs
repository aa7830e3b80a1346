use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use crate::web::state::AppState;

/// 流式返回 `assets_root` 下的页面图片，路径不得逃出根目录。
pub(crate) async fn asset_file(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, StatusCode> {
    let target = resolve_target(state.assets_root.as_ref(), &path)?;

    let meta = tokio::fs::metadata(&target)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    if !meta.is_file() {
        return Err(StatusCode::NOT_FOUND);
    }

    let file = tokio::fs::File::open(&target)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mut resp = Response::new(body);
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(mime_for(&target)),
    );
    if let Ok(len) = HeaderValue::from_str(&meta.len().to_string()) {
        resp.headers_mut().insert(header::CONTENT_LENGTH, len);
    }
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );
    Ok(resp)
}

fn resolve_target(base: &Path, path: &str) -> Result<PathBuf, StatusCode> {
    if path.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let base_canon = std::fs::canonicalize(base).map_err(|_| StatusCode::NOT_FOUND)?;
    let target_canon =
        std::fs::canonicalize(base.join(path)).map_err(|_| StatusCode::NOT_FOUND)?;
    if !target_canon.starts_with(&base_canon) {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(target_canon)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_paths_outside_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("assets");
        std::fs::create_dir_all(root.join("c_01")).unwrap();
        std::fs::write(root.join("c_01").join("1.png"), b"png").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"no").unwrap();

        assert!(resolve_target(&root, "c_01/1.png").is_ok());
        assert_eq!(
            resolve_target(&root, "../secret.txt"),
            Err(StatusCode::FORBIDDEN)
        );
        assert_eq!(
            resolve_target(&root, "c_01/missing.png"),
            Err(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for(Path::new("a/B.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a/b.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("a/b")), "application/octet-stream");
    }
}
