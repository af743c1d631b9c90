use std::path::{Path, PathBuf};

use actix_files::NamedFile;
use actix_web::{HttpRequest, HttpResponse};
use log::debug;

pub const INDEX_FILE: &str = "index.html";

/// Map a decoded request path onto a relative filesystem path.
///
/// Returns `None` for anything that could step outside the asset directory.
pub fn sanitize(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') || Path::new(s).is_absolute() => {
                return None;
            }
            s => relative.push(s),
        }
    }
    Some(relative)
}

/// Serve a file from `static_dir`, falling back to `index.html` for client-side routes.
pub async fn serve(
    req: &HttpRequest,
    tail: &str,
    static_dir: &Path,
) -> Result<HttpResponse, actix_web::Error> {
    let Some(relative) = sanitize(tail) else {
        debug!("Rejecting asset path {:?}", tail);
        return Ok(HttpResponse::NotFound().body(format!("Not found: {}", req.path())));
    };

    let mut candidate = static_dir.join(&relative);
    if candidate.is_dir() {
        candidate = candidate.join(INDEX_FILE);
    }
    if candidate.is_file() {
        debug!("Serving asset {:?}", candidate);
        return Ok(NamedFile::open_async(&candidate).await?.into_response(req));
    }

    let index = static_dir.join(INDEX_FILE);
    if index.is_file() {
        debug!("No asset at {:?}, falling back to {:?}", candidate, index);
        return Ok(NamedFile::open_async(&index).await?.into_response(req));
    }

    Ok(HttpResponse::NotFound().body(format!("Not found: {}", req.path())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_kept() {
        assert_eq!(sanitize(""), Some(PathBuf::new()));
        assert_eq!(
            sanitize("assets/index-3f2a.js"),
            Some(PathBuf::from("assets").join("index-3f2a.js"))
        );
        assert_eq!(sanitize("./a//b/"), Some(PathBuf::from("a").join("b")));
    }

    #[test]
    fn traversal_is_rejected() {
        assert_eq!(sanitize("../secret.txt"), None);
        assert_eq!(sanitize("assets/../../etc/passwd"), None);
        assert_eq!(sanitize("assets\\..\\x"), None);
    }
}
