//! Top-level search filtering.

use tb_core::TorrentRecord;

/// Returns the records whose name contains `term`, ignoring case.
///
/// An empty term matches everything. Snapshot order is preserved.
///
/// # Examples
///
/// ```
/// use tb_core::{TorrentId, TorrentRecord};
/// use tb_session::filter_records;
///
/// let records = vec![
///     TorrentRecord::new(TorrentId::from("1"), "One Piece", vec![]),
///     TorrentRecord::new(TorrentId::from("2"), "Naruto", vec![]),
/// ];
/// let hits = filter_records(&records, "ONE");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].name, "One Piece");
/// ```
#[must_use]
pub fn filter_records<'a>(records: &'a [TorrentRecord], term: &str) -> Vec<&'a TorrentRecord> {
    let needle = term.to_lowercase();
    records.iter().filter(|r| r.name_matches(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use tb_core::TorrentId;

    use super::*;

    fn records(names: &[&str]) -> Vec<TorrentRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| TorrentRecord::new(TorrentId::from(i as u64), *name, Vec::new()))
            .collect()
    }

    fn names<'a>(hits: &[&'a TorrentRecord]) -> Vec<&'a str> {
        hits.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_term_returns_everything() {
        let all = records(&["One Piece", "Naruto", "Bleach"]);
        assert_eq!(filter_records(&all, "").len(), 3);
    }

    #[test]
    fn test_substring_case_insensitive() {
        let all = records(&["One Piece", "Naruto", "Someone Else", "BLEACH"]);
        assert_eq!(names(&filter_records(&all, "one")), ["One Piece", "Someone Else"]);
        assert_eq!(names(&filter_records(&all, "bleach")), ["BLEACH"]);
        assert!(filter_records(&all, "xyz").is_empty());
    }

    #[test]
    fn test_filter_is_pure() {
        let all = records(&["One Piece", "Naruto"]);
        let first = names(&filter_records(&all, "o"));
        let second = names(&filter_records(&all, "o"));
        assert_eq!(first, second);
    }
}
