use crate::error::AppError;
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components lexically, without touching the
/// filesystem. `..` at the root stays at the root.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(c) => out.push(c),
        }
    }
    out
}

/// Resolve a client-supplied relative path against `root` and enforce that
/// the result stays inside `root`.
///
/// `root` must already be canonical. The containment check runs twice: once
/// lexically, so traversal is rejected even for paths that do not exist, and
/// once on the canonicalized path when the target exists, so a symlink
/// cannot escape the root either. `Path::starts_with` compares whole
/// components, which keeps a sibling like `/data2` from passing as inside
/// `/data`.
///
/// A contained path that does not exist is returned in its lexical form;
/// the caller's stat or open decides whether that is a 404 or a skip.
pub fn resolve_within(root: &Path, candidate: &str) -> Result<PathBuf, AppError> {
    let rel = Path::new(candidate);
    if rel.is_absolute() {
        return Err(AppError::InvalidPath(format!(
            "Invalid path: {}",
            candidate
        )));
    }

    let normalized = lexical_normalize(&root.join(rel));
    if !normalized.starts_with(root) {
        return Err(AppError::InvalidPath(format!(
            "Invalid path: {}",
            candidate
        )));
    }

    match normalized.canonicalize() {
        Ok(real) => {
            if real.starts_with(root) {
                Ok(real)
            } else {
                Err(AppError::InvalidPath(format!(
                    "Invalid path: {}",
                    candidate
                )))
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(normalized),
        Err(err) => Err(err.into()),
    }
}
