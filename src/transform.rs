//! Per-item derivation of the thumbnail URL and the output file name.

use chrono::DateTime;

use crate::{error::CrawlError, search::SearchItem};

const STANDARD_THUMBNAIL: &str = "hqdefault.jpg";
const MAXRES_THUMBNAIL: &str = "maxresdefault.jpg";

/// Points a "high" thumbnail URL at the maximum-resolution variant.
///
/// URLs that don't end in `hqdefault.jpg` get the variant appended as-is.
/// Nothing checks that the resulting image actually exists.
pub fn upgrade_thumbnail_url(url: &str) -> String {
    let base = url.strip_suffix(STANDARD_THUMBNAIL).unwrap_or(url);
    format!("{base}{MAXRES_THUMBNAIL}")
}

/// Builds `YYYYMMDD-<video id>-<title>` from an RFC 3339 publish timestamp.
///
/// The date is taken in the timestamp's own offset. The result is not
/// sanitized; see [`sanitize`].
pub fn derive_file_name(
    published_at: &str,
    video_id: &str,
    title: &str,
) -> Result<String, CrawlError> {
    let published =
        DateTime::parse_from_rfc3339(published_at).map_err(|source| CrawlError::TimestampParse {
            value: published_at.to_owned(),
            source,
        })?;

    Ok(format!("{}-{video_id}-{title}", published.format("%Y%m%d")))
}

/// Swaps `/`, `?` and `.` for their full-width forms.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' => '／',
            '?' => '？',
            '.' => '．',
            other => other,
        })
        .collect()
}

/// A thumbnail URL paired with the unsanitized base name it is saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub name: String,
}

impl DownloadTarget {
    pub fn from_item(item: &SearchItem) -> Result<Self, CrawlError> {
        Ok(Self {
            url: upgrade_thumbnail_url(&item.thumbnail_url),
            name: derive_file_name(&item.published_at, &item.video_id, &item.title)?,
        })
    }
}
