use std::collections::HashSet;

use tracing::info;

use crate::error::SyncError;
use crate::provider::{DestinationCatalog, DestinationPlaylistState};

/// Stand-in id used by dry runs when the playlist would have been created.
pub const DRY_RUN_PLAYLIST_ID: &str = "DRY_RUN_PLAYLIST_ID";

/// Find the account's playlist titled `title` (case-insensitively) or create
/// it, then load its full membership.
pub async fn resolve(
    destination: &dyn DestinationCatalog,
    access_token: &str,
    title: &str,
    dry_run: bool,
) -> Result<DestinationPlaylistState, SyncError> {
    let id = match find_playlist(destination, access_token, title).await? {
        Some(id) => {
            info!(playlist_id = %id, "found destination playlist");
            id
        }
        None if dry_run => {
            info!("destination playlist missing, dry run will not create it");
            return Ok(DestinationPlaylistState {
                id: DRY_RUN_PLAYLIST_ID.to_string(),
                existing_item_ids: HashSet::new(),
            });
        }
        None => {
            let id = destination
                .create_playlist(access_token, title)
                .await?
                .ok_or_else(|| SyncError::Create {
                    title: title.to_string(),
                })?;
            info!(playlist_id = %id, "created destination playlist");
            id
        }
    };

    let existing_item_ids = load_membership(destination, access_token, &id).await?;
    info!(items = existing_item_ids.len(), "loaded destination membership");

    Ok(DestinationPlaylistState {
        id,
        existing_item_ids,
    })
}

async fn find_playlist(
    destination: &dyn DestinationCatalog,
    access_token: &str,
    title: &str,
) -> anyhow::Result<Option<String>> {
    let wanted = title.to_lowercase();
    let mut page_token: Option<String> = None;

    loop {
        let page = destination
            .my_playlists_page(access_token, page_token.as_deref())
            .await?;

        if let Some(found) = page
            .items
            .into_iter()
            .find(|p| p.title.to_lowercase() == wanted)
        {
            return Ok(Some(found.id));
        }

        page_token = page.next;
        if page_token.is_none() {
            return Ok(None);
        }
    }
}

/// Every item id in the playlist, across all pages.
pub async fn load_membership(
    destination: &dyn DestinationCatalog,
    access_token: &str,
    playlist_id: &str,
) -> anyhow::Result<HashSet<String>> {
    let mut ids = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = destination
            .playlist_items_page(access_token, playlist_id, page_token.as_deref())
            .await?;
        ids.extend(page.items);

        page_token = page.next;
        if page_token.is_none() {
            break;
        }
    }

    Ok(ids)
}
