use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

/// Directory the host serves from, plus the document used for `/` and
/// directory paths.
#[derive(Debug, Clone)]
pub struct WebRoot {
    root: PathBuf,
    index: String,
}

impl WebRoot {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Maps a request path onto a file below the root. `None` for anything
    /// that could step outside it.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode(request_path)?;
        if decoded.contains('\\') || decoded.contains('\0') {
            return None;
        }

        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                other => path.push(other),
            }
        }

        if decoded.is_empty() || decoded.ends_with('/') {
            path.push(&self.index);
        }
        Some(path)
    }
}

/// Loads the file a request path names and wraps it in a response.
#[tracing::instrument(skip(web_root))]
pub async fn serve_path(web_root: &WebRoot, request_path: &str) -> Response {
    let Some(mut path) = web_root.resolve(request_path) else {
        warn!("rejected request path");
        return not_found();
    };

    if let Ok(meta) = tokio::fs::metadata(&path).await
        && meta.is_dir()
    {
        path.push(web_root.index());
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!(file = %path.display(), bytes = bytes.len(), "serving asset");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type(&path))],
                bytes,
            )
                .into_response()
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(file = %path.display(), "asset not found");
            not_found()
        }
        Err(err) => {
            warn!(file = %path.display(), error = %err, "failed reading asset");
            not_found()
        }
    }
}

/// Guessed from the extension; text types are served as UTF-8.
pub fn content_type(path: &Path) -> String {
    let guess = mime_guess::from_path(path).first_or_octet_stream();
    let essence = guess.essence_str();
    if essence.starts_with("text/") {
        format!("{essence}; charset=utf-8")
    } else {
        essence.to_string()
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "not found",
    )
        .into_response()
}

/// Decodes `%XX` escapes. Non-UTF-8 results yield `None`.
fn percent_decode(input: &str) -> Option<String> {
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use axum::http::{StatusCode, header};

    use super::{WebRoot, content_type, percent_decode, serve_path};

    fn site() -> (tempfile::TempDir, WebRoot) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<div id=\"app\"></div>").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets").join("index.html"), "nested").unwrap();
        fs::write(dir.path().join("assets").join("app.wasm"), [0u8, 97, 115, 109]).unwrap();
        let root = WebRoot::new(dir.path(), "index.html");
        (dir, root)
    }

    async fn body(resp: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn resolve_blocks_traversal() {
        let root = WebRoot::new("/srv/www", "index.html");
        assert_eq!(root.resolve("/").unwrap(), Path::new("/srv/www/index.html"));
        assert_eq!(
            root.resolve("/a/./b.js").unwrap(),
            Path::new("/srv/www/a/b.js")
        );
        assert!(root.resolve("/../etc/passwd").is_none());
        assert!(root.resolve("/%2e%2e/etc/passwd").is_none());
        assert!(root.resolve("/a%5c..%5csecret").is_none());
        assert!(root.resolve("/%ff").is_none());
        assert_eq!(
            root.resolve("/my%20notes.txt").unwrap(),
            Path::new("/srv/www/my notes.txt")
        );
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type(Path::new("a.HTML")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("site.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("a.wasm")), "application/wasm");
        assert_eq!(content_type(Path::new("a.png")), "image/png");
        assert_eq!(content_type(Path::new("a")), "application/octet-stream");
        assert_eq!(percent_decode("a%20b").as_deref(), Some("a b"));
    }

    #[tokio::test]
    async fn serves_default_document_for_root_and_directories() {
        let (_dir, root) = site();

        let resp = serve_path(&root, "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body(resp).await, b"<div id=\"app\"></div>");

        let resp = serve_path(&root, "/assets").await;
        assert_eq!(body(resp).await, b"nested");
    }

    #[tokio::test]
    async fn serves_assets_and_404s_missing_files() {
        let (_dir, root) = site();

        let resp = serve_path(&root, "/assets/app.wasm").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/wasm");

        let resp = serve_path(&root, "/missing.js").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = serve_path(&root, "/../index.html").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
