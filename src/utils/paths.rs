//! Path utilities for canonical node keys and anchored resolution.
//!
//! Node keys are strings, not `PathBuf`s: layers authored on Windows and
//! opened on Linux (and vice versa) must still collapse to one key per file, so
//! normalization is done on the textual form with forward slashes regardless of
//! the host platform.

/// Produces the canonical key for a path string.
///
/// - Backslashes become forward slashes
/// - `.` segments and duplicate separators are dropped, `..` is folded
/// - A Windows drive letter is upper-cased (`c:/x` and `C:\x` share a key)
///
/// # Examples
///
/// ```rust
/// use noodle::utils::paths::canonical_key;
///
/// assert_eq!(canonical_key(r"c:\proj\shots\..\assets\tree.usd"), "C:/proj/assets/tree.usd");
/// assert_eq!(canonical_key("/proj//shots/./s01.usda"), "/proj/shots/s01.usda");
/// ```
#[must_use]
pub fn canonical_key(path: &str) -> String {
    let slashed = path.trim().replace('\\', "/");

    let (prefix, rest) = split_prefix(&slashed);
    let absolute = !prefix.is_empty() || rest.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            s => segments.push(s),
        }
    }

    let mut key = prefix;
    if rest.starts_with("//") && key.is_empty() {
        // UNC share
        key.push_str("//");
    } else if absolute {
        key.push('/');
    }
    key.push_str(&segments.join("/"));
    key
}

/// Splits an upper-cased drive prefix (`C:`) from the rest of a slashed path.
fn split_prefix(path: &str) -> (String, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = (bytes[0] as char).to_ascii_uppercase();
        (format!("{drive}:"), &path[2..])
    } else {
        (String::new(), path)
    }
}

/// Returns true when the path is absolute on any platform we read layers from.
#[must_use]
pub fn is_absolute_key(path: &str) -> bool {
    let slashed = path.replace('\\', "/");
    let (prefix, rest) = split_prefix(&slashed);
    !prefix.is_empty() || rest.starts_with('/')
}

/// Returns true for explicitly anchored relative paths (`./x`, `../x`).
#[must_use]
pub fn is_anchored_relative(path: &str) -> bool {
    let slashed = path.replace('\\', "/");
    slashed.starts_with("./") || slashed.starts_with("../")
}

/// Resolves `path` against the directory containing `anchor`.
///
/// Absolute paths are only canonicalized. The anchor is the key of the layer
/// that *authored* the path, never the root of the walk.
///
/// # Examples
///
/// ```rust
/// use noodle::utils::paths::anchor_relative;
///
/// assert_eq!(
///     anchor_relative("/project/shots/s01/layer.usd", "../textures/a.png"),
///     "/project/shots/textures/a.png"
/// );
/// ```
#[must_use]
pub fn anchor_relative(anchor: &str, path: &str) -> String {
    if is_absolute_key(path) {
        return canonical_key(path);
    }

    let anchor = canonical_key(anchor);
    match anchor.rfind('/') {
        Some(idx) => canonical_key(&format!("{}/{}", &anchor[..idx], path)),
        None => canonical_key(path),
    }
}

/// Returns the parent directory portion of a key, or the empty string.
#[must_use]
pub fn parent_dir(key: &str) -> &str {
    match key.rfind('/') {
        Some(0) => "/",
        Some(idx) => &key[..idx],
        None => "",
    }
}

/// Returns the final path segment of a key.
#[must_use]
pub fn file_name(key: &str) -> &str {
    key.rsplit(['/', '\\']).next().unwrap_or(key)
}

/// Returns the lower-cased extension of a key including the dot, if any.
#[must_use]
pub fn extension(key: &str) -> Option<String> {
    let name = file_name(key);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(name[idx..].to_ascii_lowercase()),
    }
}
