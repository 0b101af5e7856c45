//! Clip sequence collapsing.
//!
//! A value clip declares one asset per frame (`render.1001.usd`,
//! `render.1002.usd`, ...). Showing every frame would flood the graph, so the
//! whole declaration becomes one node keyed by a frame-range template such as
//! `render.1001-1024.usd`.
//!
//! The frame token is the last standalone run of digits in the declared path.
//! The range label takes the first frame from the first declared asset and the
//! last frame from the last declared asset; the list is never sorted, so the
//! label follows the authored order.

use regex::Regex;
use std::sync::OnceLock;

/// A collapsed clip sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSequence {
    /// Template key, e.g. `render.1001-1024.usd`
    pub key: String,
    /// Frame token of the first declared asset
    pub first_frame: Option<String>,
    /// Frame token of the last declared asset
    pub last_frame: Option<String>,
    /// Number of declared assets
    pub frame_count: usize,
}

fn frame_token_regex() -> Option<&'static Regex> {
    static FRAME_TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
    FRAME_TOKEN.get_or_init(|| Regex::new(r"\b\d+\b").ok()).as_ref()
}

/// Returns the byte range of the frame token in `path`, if it has one.
#[must_use]
pub fn frame_token(path: &str) -> Option<(usize, usize)> {
    frame_token_regex()?.find_iter(path).last().map(|m| (m.start(), m.end()))
}

/// Collapses a declared asset list into a single sequence.
///
/// Returns `None` for an empty list. A first path without a frame token keeps
/// its declared path as the key.
///
/// # Examples
///
/// ```rust
/// use noodle::graph::clip::collapse_sequence;
///
/// let paths = vec![
///     "shot.1001.usd".to_string(),
///     "shot.1002.usd".to_string(),
///     "shot.1003.usd".to_string(),
/// ];
/// let seq = collapse_sequence(&paths).unwrap();
/// assert_eq!(seq.key, "shot.1001-1003.usd");
/// assert_eq!(seq.frame_count, 3);
/// ```
#[must_use]
pub fn collapse_sequence(asset_paths: &[String]) -> Option<ClipSequence> {
    let first = asset_paths.first()?;
    let last = asset_paths.last()?;

    let Some((start, end)) = frame_token(first) else {
        return Some(ClipSequence {
            key: first.clone(),
            first_frame: None,
            last_frame: None,
            frame_count: asset_paths.len(),
        });
    };

    let first_frame = &first[start..end];
    let last_frame = frame_token(last).map_or(first_frame, |(s, e)| &last[s..e]);

    let key = format!("{}{}-{}{}", &first[..start], first_frame, last_frame, &first[end..]);

    Some(ClipSequence {
        key,
        first_frame: Some(first_frame.to_string()),
        last_frame: Some(last_frame.to_string()),
        frame_count: asset_paths.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_collapse_basic_sequence() {
        let seq =
            collapse_sequence(&paths(&["shot.1001.usd", "shot.1002.usd", "shot.1003.usd"])).unwrap();
        assert_eq!(seq.key, "shot.1001-1003.usd");
        assert_eq!(seq.first_frame.as_deref(), Some("1001"));
        assert_eq!(seq.last_frame.as_deref(), Some("1003"));
    }

    #[test]
    fn test_collapse_uses_declared_order_not_numeric() {
        let seq = collapse_sequence(&paths(&["r.0010.usd", "r.0002.usd", "r.0005.usd"])).unwrap();
        assert_eq!(seq.key, "r.0010-0005.usd");
    }

    #[test]
    fn test_collapse_replaces_only_last_token() {
        let seq = collapse_sequence(&paths(&[
            "./clips/1001/render.1001.usd",
            "./clips/1001/render.1024.usd",
        ]))
        .unwrap();
        assert_eq!(seq.key, "./clips/1001/render.1001-1024.usd");
    }

    #[test]
    fn test_version_digits_are_not_frame_tokens() {
        // "v002" is glued to a letter, so the frame is 1001
        let seq = collapse_sequence(&paths(&["fx_v002.1001.usd", "fx_v002.1010.usd"])).unwrap();
        assert_eq!(seq.key, "fx_v002.1001-1010.usd");
    }

    #[test]
    fn test_single_frame_and_no_token() {
        let seq = collapse_sequence(&paths(&["still.0042.usd"])).unwrap();
        assert_eq!(seq.key, "still.0042-0042.usd");

        let seq = collapse_sequence(&paths(&["static.usd", "static.usd"])).unwrap();
        assert_eq!(seq.key, "static.usd");
        assert_eq!(seq.first_frame, None);

        assert!(collapse_sequence(&[]).is_none());
    }
}
