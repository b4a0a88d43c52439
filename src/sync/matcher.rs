use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::provider::{CandidateItem, DestinationCatalog, TrackDescriptor};

// Alternation binds loosest: "official ... video", or "audio", or "lyric" anywhere.
static OFFICIAL_UPLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"official.*video|audio|lyric").expect("valid regex"));

/// `"<title> - <artist1, artist2, ...>"`
pub fn build_query(track: &TrackDescriptor) -> String {
    format!("{} - {}", track.title, track.artists.join(", "))
}

/// Crude relevance score of a search hit for `query`. Higher is better.
pub fn score_candidate(title: &str, channel_title: &str, query: &str) -> u32 {
    let title = title.to_lowercase();
    let channel = channel_title.to_lowercase();
    let query = query.to_lowercase();

    let mut score = 0;
    if title.contains(&query) {
        score += 5;
    }
    if query.split_whitespace().all(|word| title.contains(word)) {
        score += 3;
    }
    // auto-generated "Artist - Topic" channels carry the label's uploads
    if channel.ends_with("topic") {
        score += 2;
    }
    if OFFICIAL_UPLOAD.is_match(&title) {
        score += 1;
    }
    score
}

/// Highest scoring candidate; ties go to the earliest one in provider order.
pub fn pick_best<'c>(candidates: &'c [CandidateItem], query: &str) -> Option<&'c CandidateItem> {
    let mut best: Option<(&CandidateItem, u32)> = None;

    for candidate in candidates {
        let score = score_candidate(&candidate.title, &candidate.channel_title, query);
        debug!(id = %candidate.id, title = %candidate.title, score, "scored candidate");

        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// One bounded search for `track`, resolved to a single item id.
pub async fn find_best_match(
    destination: &dyn DestinationCatalog,
    access_token: &str,
    track: &TrackDescriptor,
    max_results: u32,
) -> Result<Option<String>> {
    let query = build_query(track);
    let candidates = destination.search(access_token, &query, max_results).await?;

    Ok(pick_best(&candidates, &query).map(|c| c.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeDestination;

    fn track(title: &str, artists: &[&str]) -> TrackDescriptor {
        TrackDescriptor {
            title: title.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album: Some("ignored".to_string()),
        }
    }

    fn candidate(id: &str, title: &str, channel: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            title: title.to_string(),
            channel_title: channel.to_string(),
        }
    }

    #[test]
    fn test_build_query() {
        assert_eq!(build_query(&track("Song A", &["Artist X"])), "Song A - Artist X");
        assert_eq!(
            build_query(&track("Under Pressure", &["Queen", "David Bowie"])),
            "Under Pressure - Queen, David Bowie"
        );
    }

    #[test]
    fn test_score_components() {
        let query = "Song A - Artist X";

        // full query substring (+5) implies every token (+3)
        assert_eq!(score_candidate("song a - artist x", "", query), 8);
        // tokens scattered, no substring
        assert_eq!(score_candidate("Artist X - Song A", "", query), 3);
        assert_eq!(score_candidate("Something else", "Artist X - Topic", query), 2);
        assert_eq!(score_candidate("Song A (Official Music Video)", "Vevo", query), 1);
        assert_eq!(score_candidate("Song A (Lyrics)", "", query), 1);
        assert_eq!(score_candidate("Song A audio", "", query), 1);
        assert_eq!(score_candidate("nothing", "nobody", query), 0);
        assert_eq!(
            score_candidate("Song A - Artist X (Official Audio)", "Artist X - Topic", query),
            11
        );
    }

    #[test]
    fn test_topic_must_be_suffix() {
        assert_eq!(score_candidate("x", "Topical Songs", "q"), 0);
        assert_eq!(score_candidate("x", "ARTIST - TOPIC", "q"), 2);
    }

    #[test]
    fn test_exact_containment_beats_partial() {
        let query = "Song A - Artist X";
        let candidates = vec![
            candidate("cover", "Song A cover", "Someone"),
            candidate("exact", "Song A - Artist X", "Someone"),
        ];

        assert_eq!(pick_best(&candidates, query).unwrap().id, "exact");
    }

    #[test]
    fn test_tie_goes_to_first() {
        let candidates = vec![
            candidate("first", "nothing", "a"),
            candidate("second", "nothing", "b"),
        ];

        assert_eq!(pick_best(&candidates, "q").unwrap().id, "first");
    }

    #[test]
    fn test_zero_scores_still_pick_first() {
        let candidates = vec![candidate("only", "unrelated", "x")];
        assert_eq!(pick_best(&candidates, "Song A - Artist X").unwrap().id, "only");
    }

    #[test]
    fn test_pick_best_is_deterministic() {
        let candidates = vec![
            candidate("a", "Song A live", "x"),
            candidate("b", "Song A - Artist X (Official Video)", "Artist X - Topic"),
            candidate("c", "Song A - Artist X", "x"),
        ];

        for _ in 0..5 {
            assert_eq!(pick_best(&candidates, "Song A - Artist X").unwrap().id, "b");
        }
    }

    #[test]
    fn test_empty_candidates() {
        assert!(pick_best(&[], "q").is_none());
    }

    #[tokio::test]
    async fn test_find_best_match_searches_once_with_cap() {
        let destination = FakeDestination::new().with_search(
            "Song A - Artist X",
            &[
                ("v0", "Song A (Live)", "Fan"),
                ("v1", "Artist X - Song A (Official Video)", "ArtistXVEVO"),
                ("v2", "Song A - Artist X", "Artist X - Topic"),
            ],
        );

        let found = find_best_match(&destination, "token", &track("Song A", &["Artist X"]), 5)
            .await
            .unwrap();

        assert_eq!(found.as_deref(), Some("v2"));
        assert_eq!(destination.searches(), vec![("Song A - Artist X".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_find_best_match_no_results() {
        let destination = FakeDestination::new();

        let found = find_best_match(&destination, "token", &track("Song B", &["Artist Y"]), 5)
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_best_match_propagates_search_errors() {
        let destination = FakeDestination::new().failing_search("Song B - Artist Y");

        let result = find_best_match(&destination, "token", &track("Song B", &["Artist Y"]), 5).await;

        assert!(result.is_err());
    }
}
