//! Sector image extraction

use crate::crawler::PageSource;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static PHOTO_DETAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/cgi-bin/photos/jump\.cgi\?Detailed=[0-9]+").unwrap());
static LARGEST_PHOTO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)/images/photos/[^"]+largest[^"]+"#).unwrap());

/// Site-absolute paths are resolved one level above the listing root
fn site_path(path: &str) -> String {
    format!("..{}", path)
}

/// Follows a page's photo link to the largest rendition of the photo
///
/// Returns `None` when the page links no photo or the photo page has no
/// large rendition.
pub async fn extract_image<S>(source: &mut S, content: &str) -> Result<Option<Vec<u8>>>
where
    S: PageSource + ?Sized,
{
    let Some(detail) = PHOTO_DETAIL.find(content) else {
        return Ok(None);
    };

    let detail_page = source.fetch_text(&site_path(detail.as_str())).await?;
    let Some(largest) = LARGEST_PHOTO.find(&detail_page) else {
        return Ok(None);
    };

    let bytes = source.fetch_binary(&site_path(largest.as_str())).await?;
    Ok(if bytes.is_empty() { None } else { Some(bytes) })
}
