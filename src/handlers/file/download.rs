use crate::error::AppError;
use crate::services::archive;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::warn;

/// Capacity of the pipe between the archive writer and the response body.
/// Backpressure from a slow client stalls the writer here.
const PIPE_CAPACITY: usize = 64 * 1024;

pub async fn download(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, AppError> {
    let requested = files_params(req.uri().query().unwrap_or(""));
    if requested.is_empty() {
        return Err(AppError::BadRequest(
            "No files specified for download".to_string(),
        ));
    }

    // Every path is validated before a single byte is streamed; one bad
    // path fails the whole request.
    let mut targets = Vec::with_capacity(requested.len());
    for raw in &requested {
        let resolved = state.files.resolve(raw)?;
        let name = entry_name(raw, &resolved);
        targets.push((resolved, name));
    }

    if targets.len() == 1 {
        let (path, name) = &targets[0];
        return serve_single(path, name, req).await;
    }

    Ok(serve_archive(targets))
}

/// Stream one file with standard content-serving semantics (content length,
/// range requests, conditional headers) and download headers on top.
async fn serve_single(path: &Path, name: &str, req: Request) -> Result<Response, AppError> {
    let meta = match fs::metadata(path).await {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()));
        }
        Err(err) => return Err(err.into()),
    };
    if meta.is_dir() {
        return Err(AppError::NotADirectory(
            "Path is a directory, not a file".to_string(),
        ));
    }

    let mut response = ServeFile::new(path)
        .oneshot(req)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?
        .map(Body::new);

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name))
        .map_err(|err| AppError::Internal(err.to_string()))?;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok(response)
}

/// Bundle several files into a ZIP built inline with the response, with no
/// temporary archive on disk. The response is already 200 by the time
/// entries are read, so per-file failures can only be skipped, never
/// reported.
fn serve_archive(targets: Vec<(PathBuf, String)>) -> Response {
    let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);

    tokio::spawn(async move {
        match archive::write_zip(writer, targets).await {
            Ok(summary) if !summary.skipped.is_empty() => {
                warn!(
                    written = summary.written.len(),
                    skipped = summary.skipped.len(),
                    "archive finished with entries missing"
                );
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "archive stream aborted"),
        }
    });

    let body = Body::from_stream(ReaderStream::new(reader));
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/zip"),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"download.zip\""),
        ),
    ];

    (headers, body).into_response()
}

/// Repeated `files=` query parameters, in request order.
fn files_params(query: &str) -> Vec<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter_map(|(key, value)| (key == "files").then(|| value.into_owned()))
        .collect()
}

/// Archive entries are named by base name, like the downloaded filename.
fn entry_name(raw: &str, resolved: &Path) -> String {
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_params() {
        assert_eq!(
            files_params("files=a.txt&files=sub%2Fb.txt"),
            vec!["a.txt", "sub/b.txt"]
        );
        assert_eq!(files_params("other=x"), Vec::<String>::new());
        assert_eq!(files_params(""), Vec::<String>::new());
    }

    #[test]
    fn test_entry_name_uses_base_name() {
        assert_eq!(
            entry_name("sub/inner.txt", Path::new("/data/sub/inner.txt")),
            "inner.txt"
        );
    }
}
