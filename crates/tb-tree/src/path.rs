//! Splitting listing paths into tree segments.

use smallvec::SmallVec;
use tb_core::SegmentCase;

use crate::error::MalformedReason;

/// Hierarchy separator used by the listing API.
pub(crate) const SEPARATOR: char = '/';

/// Segments of one path; most torrents nest fewer than eight levels deep.
pub(crate) type Segments<'a> = SmallVec<[&'a str; 8]>;

/// Splits `path` into the segments inserted into a tree.
///
/// Leading and doubled separators are ignored. A trailing separator is
/// rejected because the path would name a directory rather than a file.
/// With `strip_root`, the first segment is dropped when at least two remain.
pub(crate) fn split_segments(path: &str, strip_root: bool) -> Result<Segments<'_>, MalformedReason> {
    if path.ends_with(SEPARATOR) {
        return Err(MalformedReason::TrailingSeparator);
    }

    let mut segments: Segments<'_> = path.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(MalformedReason::Empty);
    }

    if strip_root && segments.len() > 1 {
        segments.remove(0);
    }
    Ok(segments)
}

/// Returns the lookup key of a segment under `case`.
pub(crate) fn segment_key(segment: &str, case: SegmentCase) -> String {
    match case {
        SegmentCase::Sensitive => segment.to_owned(),
        SegmentCase::Insensitive => segment.to_lowercase(),
    }
}
