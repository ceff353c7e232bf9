// src/output/path.rs
// =============================================================================
// Maps a crawled URL to the file that holds its snapshot.
//
//   http://site.test/           -> <root>/index.html
//   http://site.test/about      -> <root>/about/index.html
//   http://site.test/a/b/?x=1   -> <root>/a/b/index.html
//
// Every page becomes a directory with an index.html inside, so the mirror can
// be served by any static file server with the original URLs intact.
// Segments are used as-is: no escaping of characters the filesystem dislikes.
// =============================================================================

use std::path::{Path, PathBuf};

use super::WriteError;
use crate::crawl::normalize;

// Name of the file written for every page
pub const INDEX_FILE: &str = "index.html";

// Pure: the same URL always yields the same path.
//
// Empty segments ("//", trailing "/") and "." are dropped. A ".." segment is
// rejected, since it would write outside the output root.
pub fn to_output_path(url: &str, output_root: &Path, origin: &str) -> Result<PathBuf, WriteError> {
    let canonical = normalize(url);
    let relative = canonical.strip_prefix(origin).unwrap_or(canonical);

    let mut path = output_root.to_path_buf();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(WriteError::UnsafePath(url.to_string())),
            segment => path.push(segment),
        }
    }

    path.push(INDEX_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://site.test";

    fn map(url: &str) -> PathBuf {
        to_output_path(url, Path::new("/mirror"), ORIGIN).unwrap()
    }

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(map("http://site.test/"), PathBuf::from("/mirror/index.html"));
        assert_eq!(map("http://site.test"), PathBuf::from("/mirror/index.html"));
    }

    #[test]
    fn test_nested_paths() {
        assert_eq!(map("http://site.test/about"), PathBuf::from("/mirror/about/index.html"));
        assert_eq!(
            map("http://site.test/blog/2020/post/"),
            PathBuf::from("/mirror/blog/2020/post/index.html")
        );
    }

    #[test]
    fn test_query_and_fragment_do_not_affect_path() {
        assert_eq!(map("http://site.test/a/b?x=1#frag"), map("http://site.test/a/b"));
    }

    #[test]
    fn test_empty_and_dot_segments_are_dropped() {
        assert_eq!(map("http://site.test//a/./b"), PathBuf::from("/mirror/a/b/index.html"));
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let result = to_output_path("http://site.test/a/../../etc", Path::new("/mirror"), ORIGIN);
        assert!(matches!(result, Err(WriteError::UnsafePath(_))));
    }
}
