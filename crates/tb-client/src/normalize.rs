//! Turning raw torrent JSON into [`TorrentRecord`]s.
//!
//! Unknown fields are ignored. A torrent with a missing or mistyped required
//! field yields a [`ListingError::Schema`] naming the torrent and field; the
//! caller skips it and keeps the rest of the listing.

use serde_json::Value;
use tb_core::{RawFileEntry, TorrentId, TorrentRecord};

use crate::error::ListingError;

/// Normalizes the torrent at `index` of the combined listing.
pub(crate) fn normalize_torrent(index: usize, raw: &Value) -> Result<TorrentRecord, ListingError> {
    let id = torrent_id(raw.get("id")).ok_or_else(|| ListingError::schema(format!("#{index}"), "id"))?;

    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ListingError::schema(id.as_str(), "name"))?;

    let files = match raw.get("files") {
        // Torrents that are still downloading may report no files yet.
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(files)) => files
            .iter()
            .enumerate()
            .map(|(i, file)| normalize_file(&id, i, file))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ListingError::schema(id.as_str(), "files")),
    };

    Ok(TorrentRecord::new(id, name, files))
}

fn normalize_file(id: &TorrentId, index: usize, raw: &Value) -> Result<RawFileEntry, ListingError> {
    // The API calls the full path `name` (and the last segment `short_name`).
    let path = raw
        .get("name")
        .or_else(|| raw.get("path"))
        .and_then(Value::as_str)
        .ok_or_else(|| ListingError::schema(id.as_str(), format!("files[{index}].name")))?;

    let size = raw
        .get("size")
        .and_then(Value::as_u64)
        .ok_or_else(|| ListingError::schema(id.as_str(), format!("files[{index}].size")))?;

    Ok(RawFileEntry {
        torrent_id: id.clone(),
        file_id: raw.get("id").and_then(Value::as_u64),
        path: path.to_owned(),
        size,
    })
}

fn torrent_id(raw: Option<&Value>) -> Option<TorrentId> {
    match raw? {
        Value::Number(n) => n.as_u64().map(TorrentId::from),
        Value::String(s) if !s.is_empty() => Some(TorrentId::from(s.as_str())),
        _ => None,
    }
}
