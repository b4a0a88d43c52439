use anyhow::Result;
use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use tracing::debug;

use crate::provider::{SourceCatalog, SourceItem, TrackDescriptor};

/// Lazily walk a source playlist, yielding at most `cap` usable tracks.
///
/// Pages are only requested while more tracks are wanted, so a cap reached
/// mid-playlist leaves the remaining pages unread.
pub fn track_stream<'a>(
    source: &'a dyn SourceCatalog,
    access_token: &'a str,
    playlist_id: &'a str,
    cap: usize,
) -> impl Stream<Item = Result<TrackDescriptor>> + 'a {
    try_stream! {
        let mut yielded = 0usize;
        let mut cursor: Option<String> = None;

        while yielded < cap {
            let page = source
                .playlist_tracks_page(access_token, playlist_id, cursor.as_deref())
                .await?;
            debug!(items = page.items.len(), "fetched source page");

            for track in page.items.into_iter().filter_map(into_descriptor) {
                if yielded == cap {
                    break;
                }
                yielded += 1;
                yield track;
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    }
}

pub async fn read_tracks(
    source: &dyn SourceCatalog,
    access_token: &str,
    playlist_id: &str,
    cap: usize,
) -> Result<Vec<TrackDescriptor>> {
    track_stream(source, access_token, playlist_id, cap)
        .try_collect()
        .await
}

/// Drops entries without a title or without any named artist (local files,
/// removed tracks).
fn into_descriptor(item: SourceItem) -> Option<TrackDescriptor> {
    let title = item.title.filter(|t| !t.trim().is_empty())?;
    let artists: Vec<String> = item
        .artists
        .into_iter()
        .flatten()
        .filter(|a| !a.trim().is_empty())
        .collect();

    if artists.is_empty() {
        return None;
    }

    Some(TrackDescriptor {
        title,
        artists,
        album: item.album.filter(|a| !a.is_empty()),
    })
}
