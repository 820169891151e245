//! URL path resolution for Folio.
//!
//! Pure functions that map a source file's relative path to its canonical URL
//! and classify the leading path segment as a version or locale token.
//!
//! # URL Convention
//!
//! URLs are absolute and always start with `/`:
//! - `index.md` -> `/`
//! - `guide.md` -> `/guide`
//! - `guide/index.md` -> `/guide/`
//! - `v2/README.md` -> `/v2/`
//!
//! # Example
//!
//! ```
//! use folio_paths::{add_prefix, detect_version, file_to_url_path, strip_prefix};
//!
//! assert_eq!(file_to_url_path("v1/guide/intro.md"), "/v1/guide/intro");
//! assert_eq!(detect_version("v1/guide/intro.md"), Some("v1".to_owned()));
//! assert_eq!(strip_prefix("/v1/guide/intro", "v1"), "/guide/intro");
//! assert_eq!(add_prefix("/guide/intro", "v2"), "/v2/guide/intro");
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// File extensions treated as markdown-family sources.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx"];

/// File stems that make a file its directory's index page.
const INDEX_STEMS: &[&str] = &["index", "readme"];

static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^v[0-9]+(\.[0-9]+)*$").expect("valid version regex"));

static LOCALE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]{2}(-[A-Z]{2})?$").expect("valid locale regex"));

/// Check whether a file name carries a markdown-family extension.
///
/// The comparison is ASCII case-insensitive (`Guide.MD` counts).
pub fn is_markdown_file(name: &str) -> bool {
    split_extension(name).1.is_some()
}

/// Split a file name into stem and markdown extension, if it has one.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && MARKDOWN_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    }
}

/// Split a relative path into its non-empty segments.
///
/// Accepts both `/` and `\` separators and ignores `.` segments.
fn segments(relative_path: &str) -> Vec<&str> {
    relative_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Convert a relative source path to its canonical URL path.
///
/// The markdown extension is stripped. A file named `index` or `readme`
/// (any case) is its directory's index and produces a URL ending in `/`;
/// the root index maps to `/`. Segment case is preserved.
///
/// # Examples
///
/// ```
/// use folio_paths::file_to_url_path;
///
/// assert_eq!(file_to_url_path("index.md"), "/");
/// assert_eq!(file_to_url_path("README.md"), "/");
/// assert_eq!(file_to_url_path("Guide/Setup.mdx"), "/Guide/Setup");
/// assert_eq!(file_to_url_path("v2/index.md"), "/v2/");
/// ```
pub fn file_to_url_path(relative_path: &str) -> String {
    let mut segs = segments(relative_path);
    let Some(last) = segs.pop() else {
        return "/".to_owned();
    };

    let (stem, _) = split_extension(last);
    let is_index = INDEX_STEMS
        .iter()
        .any(|index| stem.eq_ignore_ascii_case(index));

    if is_index {
        if segs.is_empty() {
            "/".to_owned()
        } else {
            format!("/{}/", segs.join("/"))
        }
    } else {
        segs.push(stem);
        format!("/{}", segs.join("/"))
    }
}

/// Check whether a path segment is a version token (`v2`, `v1.2.3`, `V2`).
pub fn is_version_token(segment: &str) -> bool {
    VERSION_TOKEN.is_match(segment)
}

/// Check whether a path segment is a locale token (`en`, `ja`, `en-US`).
///
/// The language part is case-insensitive; the region part must be upper case.
pub fn is_locale_token(segment: &str) -> bool {
    LOCALE_TOKEN.is_match(segment)
}

/// First segment of a path that has more segments after it.
///
/// A lone file name is never a version or locale folder.
fn leading_folder(relative_path: &str) -> Option<&str> {
    let segs = segments(relative_path);
    match segs.as_slice() {
        [first, _, ..] => Some(first),
        _ => None,
    }
}

/// Detect the version token in the first segment of a relative path.
pub fn detect_version(relative_path: &str) -> Option<String> {
    leading_folder(relative_path)
        .filter(|s| is_version_token(s))
        .map(str::to_owned)
}

/// Detect the locale token in the first segment of a relative path.
///
/// Version detection is attempted first and wins: a versioned path never
/// carries a locale.
pub fn detect_locale(relative_path: &str) -> Option<String> {
    if detect_version(relative_path).is_some() {
        return None;
    }
    leading_folder(relative_path)
        .filter(|s| is_locale_token(s))
        .map(str::to_owned)
}

/// Check whether a URL path carries `token` as its first segment.
pub fn has_prefix(url_path: &str, token: &str) -> bool {
    url_path
        .strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(token))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Remove a leading `/{token}` segment from a URL path.
///
/// A path that is exactly the token (`/v2` or `/v2/`) becomes `/`. A path
/// without the prefix is returned unchanged.
///
/// [`add_prefix`] undoes this for every path the catalog produces. The bare
/// `/v2` form is the exception: it comes back as the directory URL `/v2/`,
/// since route discovery never emits a token without its trailing slash.
///
/// # Examples
///
/// ```
/// use folio_paths::strip_prefix;
///
/// assert_eq!(strip_prefix("/v2/guide", "v2"), "/guide");
/// assert_eq!(strip_prefix("/v2/", "v2"), "/");
/// assert_eq!(strip_prefix("/guide", "v2"), "/guide");
/// ```
pub fn strip_prefix(url_path: &str, token: &str) -> String {
    if !has_prefix(url_path, token) {
        return url_path.to_owned();
    }
    let rest = &url_path[1 + token.len()..];
    if rest.is_empty() || rest == "/" {
        "/".to_owned()
    } else {
        rest.to_owned()
    }
}

/// Prepend a `/{token}` segment to a URL path.
///
/// # Examples
///
/// ```
/// use folio_paths::add_prefix;
///
/// assert_eq!(add_prefix("/", "ja"), "/ja/");
/// assert_eq!(add_prefix("/guide/", "ja"), "/ja/guide/");
/// ```
pub fn add_prefix(url_path: &str, token: &str) -> String {
    match url_path.trim_start_matches('/') {
        "" => format!("/{token}/"),
        rest => format!("/{token}/{rest}"),
    }
}
