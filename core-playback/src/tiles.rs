//! Time-indexed media resolver.
//!
//! Audio content items carry an ordered list of timestamped cover images
//! ([`MediaTile`]). Given the current playback position, the resolver picks
//! the last tile in list order whose threshold has been reached, falling
//! back to the item's primary image before the first threshold.
//!
//! The scan is linear and recomputed on every position update; tile counts
//! are small (they drive cover art, not data), so O(tiles) per sample is
//! fine. The list is taken as-is from the backend and is not assumed to be
//! sorted.

use provider_dpop::models::{ContentItem, MediaTile};

/// Resolve the current tile URL for a playback position.
///
/// Returns `None` when no tile's threshold has been reached yet. Among
/// qualifying tiles, the last one in list order wins.
pub fn resolve_tile(tiles: &[MediaTile], position_secs: f64) -> Option<&str> {
    let mut current = None;
    for tile in tiles {
        if tile.elapsed_time <= position_secs {
            current = Some(tile.url.as_str());
        }
    }
    current
}

/// Resolve the current image for a playback position, falling back to the
/// given primary image before the first tile threshold.
pub fn current_image<'a>(
    tiles: &'a [MediaTile],
    position_secs: f64,
    primary_url: &'a str,
) -> &'a str {
    resolve_tile(tiles, position_secs).unwrap_or(primary_url)
}

/// Resolve the current cover for a content item at a playback position.
///
/// Returns `None` only when the item has neither a qualifying tile nor a
/// primary image.
pub fn content_cover_at(item: &ContentItem, position_secs: f64) -> Option<&str> {
    resolve_tile(&item.media_tiles, position_secs).or(item.image_url.as_deref())
}
