//! Sync engine integration tests
//!
//! Drives the routines against an in-memory catalog and a static file server.

mod common;

use assert_matches::assert_matches;
use common::{listing, TestHarness};
use reelsync::fileserver::Listing;
use reelsync::sync::{
    run_full_sync, sync_blurhash, sync_captions, sync_chapters, sync_episode_thumbnails,
    sync_length_and_dimensions, sync_logos, sync_metadata, sync_missing_media, sync_posters,
    sync_video_url, Routine,
};
use reelsync_common::{Error, MediaKind, SkipReason};
use reelsync_db::pool::get_conn;
use reelsync_db::queries::sync_info;
use reelsync_db::update::Target;
use serde_json::{json, Value};

fn catalog_listing() -> Value {
    json!({
        "movies": {
            "Arrival": {
                "fileNames": ["Arrival.mp4", "poster.jpg"],
                "length": {"Arrival.mp4": 6_960_000},
                "dimensions": {"Arrival.mp4": "1920x800"},
                "urls": {
                    "mp4": "/movies/Arrival/Arrival.mp4",
                    "mediaLastModified": "2024-05-01T10:00:00.000Z",
                    "metadata": "/movies/Arrival/metadata.json",
                    "poster": "/movies/Arrival/poster.jpg",
                    "posterBlurhash": "LEHV6nWB2y",
                    "logo": "/movies/Arrival/logo.png",
                    "chapters": "/movies/Arrival/chapters.vtt",
                    "subtitles": {
                        "Spanish": {"url": "/movies/Arrival/Arrival.es.vtt", "srcLang": "es", "lastModified": "2024-05-01"},
                        "English": {"url": "/movies/Arrival/Arrival.en.vtt", "srcLang": "en", "lastModified": "2024-05-01"}
                    }
                }
            },
            "NoVideo": {"fileNames": ["NoVideo.mkv"]}
        },
        "tv": {
            "Severance": {
                "metadata": "/tv/Severance/metadata.json",
                "poster": "/tv/Severance/poster.jpg",
                "posterBlurhash": "L6PZfSi_",
                "logo": "/tv/Severance/logo.png",
                "seasons": {
                    "Season 2": {
                        "metadata": "/tv/Severance/Season 2/metadata.json",
                        "fileNames": ["S02E01.mp4"]
                    },
                    "Season 1": {
                        "metadata": "/tv/Severance/Season 1/metadata.json",
                        "fileNames": ["S01E02 - Half Loop.mp4", "S01E01 - Good News About Hell.mp4"],
                        "lengths": {"S01E01 - Good News About Hell.mp4": 3_420_000},
                        "dimensions": {"S01E01 - Good News About Hell.mp4": "3840x2160"},
                        "urls": {
                            "S01E01 - Good News About Hell.mp4": {
                                "thumbnail": "/tv/Severance/Season 1/S01E01.jpg",
                                "thumbnailBlurhash": "LKO2?U",
                                "subtitles": {
                                    "English": {"url": "/tv/Severance/Season 1/S01E01.en.vtt", "srcLang": "en"}
                                }
                            }
                        }
                    },
                    "Extras": {"fileNames": ["behind the scenes.mp4"]}
                }
            }
        }
    })
}

fn harness() -> TestHarness {
    let harness = TestHarness::new(listing(catalog_listing()));
    harness.fs.set_metadata(
        "/movies/Arrival/metadata.json",
        json!({"title": "Arrival", "last_updated": "2024-01-01T00:00:00.000Z"}),
    );
    harness.fs.set_metadata(
        "/tv/Severance/metadata.json",
        json!({"name": "Severance", "last_updated": "2024-02-01"}),
    );
    harness.fs.set_metadata(
        "/tv/Severance/Season 1/metadata.json",
        json!({
            "season_number": 1,
            "episodes": [
                {"episode_number": 1, "name": "Good News About Hell"},
                {"episode_number": 2, "name": "Half Loop"}
            ]
        }),
    );
    harness
}

fn with_movie(value: &mut Value, title: &str, movie: Value) -> Listing {
    value["movies"][title] = movie;
    listing(value.clone())
}

const PILOT: &str = "S01E01 - Good News About Hell.mp4";
const HALF_LOOP: &str = "S01E02 - Half Loop.mp4";

fn season_one(value: &mut Value) -> &mut Value {
    &mut value["tv"]["Severance"]["seasons"]["Season 1"]
}

/// Harness whose catalog already matches [`catalog_listing`].
async fn synced_harness() -> TestHarness {
    let harness = harness();
    run_full_sync(&harness.ctx).await.unwrap();
    harness
}

#[tokio::test]
async fn test_full_sync_builds_catalog() {
    let harness = harness();

    let result = run_full_sync(&harness.ctx).await.unwrap();

    assert_eq!(result.missing_media.movies, ["Arrival"]);
    assert_eq!(result.missing_media.tv.len(), 1);
    assert_eq!(result.missing_mp4.movies, ["NoVideo"]);
    assert!(harness.movie("NoVideo").is_none());

    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(
        movie.video_url.as_deref(),
        Some("http://fs.test/movies/Arrival/Arrival.mp4")
    );
    assert_eq!(movie.length, Some(6_960_000));
    assert_eq!(movie.dimensions.as_deref(), Some("1920x800"));
    assert_eq!(movie.logo.as_deref(), Some("http://fs.test/movies/Arrival/logo.png"));
    assert_eq!(movie.poster_blurhash.as_deref(), Some("LEHV6nWB2y"));
    assert_eq!(movie.metadata.as_ref().unwrap()["title"], "Arrival");
    let languages: Vec<_> = movie.caption_urls.keys().map(String::as_str).collect();
    assert_eq!(languages, ["English", "Spanish"]);
    assert_eq!(
        movie.caption_urls["English"].url,
        "http://fs.test/movies/Arrival/Arrival.en.vtt"
    );

    let show = harness.show("Severance").unwrap();
    assert_eq!(show.logo.as_deref(), Some("http://fs.test/tv/Severance/logo.png"));
    assert_eq!(show.metadata.as_ref().unwrap()["name"], "Severance");
    let seasons: Vec<_> = show.seasons.iter().map(|s| s.season_number).collect();
    assert_eq!(seasons, [1, 2]);

    let season = show.season(1).unwrap();
    let episodes: Vec<_> = season.episodes.iter().map(|e| e.episode_number).collect();
    assert_eq!(episodes, [1, 2]);
    assert!(season.metadata.is_some());

    let pilot = season.episode(1).unwrap();
    assert_eq!(pilot.title.as_deref(), Some("Good News About Hell"));
    assert_eq!(pilot.length, Some(3_420_000));
    assert_eq!(
        pilot.thumbnail.as_deref(),
        Some("http://fs.test/tv/Severance/Season 1/S01E01.jpg")
    );
    assert_eq!(pilot.caption_urls.len(), 1);
    assert_eq!(season.episode(2).unwrap().title.as_deref(), Some("Half Loop"));

    let skipped_extras = result.reports[0]
        .skipped
        .iter()
        .any(|s| s.kind == MediaKind::Season && s.reason == SkipReason::UnparseableNumber);
    assert!(skipped_extras);

    let conn = get_conn(&harness.pool).unwrap();
    assert!(sync_info::get_last_sync(&conn).unwrap().is_some());
}

#[tokio::test]
async fn test_second_full_sync_writes_nothing() {
    let harness = harness();

    let first = run_full_sync(&harness.ctx).await.unwrap();
    assert!(first.total_writes() > 0);

    let second = run_full_sync(&harness.ctx).await.unwrap();
    assert_eq!(second.total_writes(), 0);
    for report in &second.reports {
        assert_eq!(report.planned, 0, "{} planned updates on a clean catalog", report.routine);
    }
    assert!(second.missing_media.movies.is_empty());
    assert!(second.missing_media.tv.is_empty());
    assert_eq!(second.missing_mp4.movies, ["NoVideo"]);
}

#[tokio::test]
async fn test_newer_metadata_replaces_stored() {
    let harness = harness();
    harness.seed(
        Target::movie("Arrival"),
        json!({"metadata": {"last_updated": "2024-01-01"}}),
    );
    harness.fs.set_metadata(
        "/movies/Arrival/metadata.json",
        json!({"last_updated": "2024-06-01", "overview": "new"}),
    );

    let report = sync_metadata(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    assert_eq!(report.routine, Routine::Metadata);
    assert_eq!(report.writes, 1);
    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(movie.metadata.unwrap()["last_updated"], "2024-06-01");
}

#[tokio::test]
async fn test_older_metadata_is_ignored() {
    let harness = harness();
    harness.seed(
        Target::movie("Arrival"),
        json!({"metadata": {"last_updated": "2024-06-01"}}),
    );
    harness.fs.set_metadata(
        "/movies/Arrival/metadata.json",
        json!({"last_updated": "2024-01-01", "overview": "old"}),
    );

    let report = sync_metadata(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    assert_eq!(report.planned, 0);
    assert_eq!(report.writes, 0);
    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(movie.metadata.unwrap()["last_updated"], "2024-06-01");
}

#[tokio::test]
async fn test_unreachable_metadata_skips_entity() {
    let harness = harness();
    harness.seed(
        Target::movie("Arrival"),
        json!({"metadata": {"last_updated": "2024-01-01"}}),
    );
    harness.fs.remove_metadata("/movies/Arrival/metadata.json");

    let report = sync_metadata(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    assert_eq!(report.writes, 0);
    assert!(report
        .skipped
        .iter()
        .any(|s| s.name == "Arrival" && s.reason == SkipReason::MetadataUnavailable));
}

#[tokio::test]
async fn test_movie_without_mp4_is_not_created() {
    let harness = harness();

    let outcome = sync_missing_media(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    assert!(harness.movie("NoVideo").is_none());
    assert_eq!(outcome.missing_mp4.movies, ["NoVideo"]);
    assert!(outcome
        .report
        .skipped
        .iter()
        .any(|s| s.name == "NoVideo" && s.reason == SkipReason::MissingVideo));
}

#[tokio::test]
async fn test_season_without_mp4_reported() {
    let mut value = catalog_listing();
    value["tv"]["Severance"]["seasons"]["Season 3"] = json!({"fileNames": ["S03E01.mkv"]});
    let harness = TestHarness::new(listing(value));

    let outcome = sync_missing_media(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    assert_eq!(outcome.missing_mp4.tv, ["Severance - Season 3"]);
    let show = harness.show("Severance").unwrap();
    assert!(show.season(3).is_none());
}

#[tokio::test]
async fn test_captions_english_first_after_merge() {
    let harness = harness();
    harness.seed(
        Target::movie("Arrival"),
        json!({
            "captionURLs": {
                "Spanish": {"url": "http://fs.test/es.vtt", "srcLang": "es"},
                "French": {"url": "http://fs.test/fr.vtt", "srcLang": "fr"}
            }
        }),
    );

    let report = sync_captions(&harness.ctx, &harness.listing().await).unwrap();
    assert_eq!(report.writes, 1);

    let movie = harness.movie("Arrival").unwrap();
    let languages: Vec<_> = movie.caption_urls.keys().map(String::as_str).collect();
    assert_eq!(languages, ["English", "French", "Spanish"]);
    // Listed Spanish track has a timestamp; the stored one does not.
    assert_eq!(
        movie.caption_urls["Spanish"].url,
        "http://fs.test/movies/Arrival/Arrival.es.vtt"
    );

    let again = sync_captions(&harness.ctx, &harness.listing().await).unwrap();
    assert_eq!(again.planned, 0);
}

#[tokio::test]
async fn test_new_episode_merged_into_existing_show() {
    let harness = harness();
    run_full_sync(&harness.ctx).await.unwrap();

    let mut value = catalog_listing();
    value["tv"]["Severance"]["seasons"]["Season 1"]["fileNames"]
        .as_array_mut()
        .unwrap()
        .push(json!("S01E03 - In Perpetuity.mp4"));
    harness.fs.set_listing(listing(value));

    let outcome = sync_missing_media(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    assert_eq!(outcome.missing_media.tv.len(), 1);
    let added = &outcome.missing_media.tv[0].seasons;
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].season_number, 1);
    assert_eq!(added[0].episodes, [3]);

    let show = harness.show("Severance").unwrap();
    let season = show.season(1).unwrap();
    let episodes: Vec<_> = season.episodes.iter().map(|e| e.episode_number).collect();
    assert_eq!(episodes, [1, 2, 3]);
    assert!(season.episode(1).unwrap().thumbnail.is_some());
    assert_eq!(show.seasons.len(), 2);
}

#[tokio::test]
async fn test_show_without_seasons_gains_all_listed_seasons() {
    let harness = TestHarness::new(listing(json!({
        "tv": {
            "Dark": {
                "seasons": {
                    "Season 3": {"fileNames": ["S03E02.mp4", "S03E01.mp4"]},
                    "Season 1": {"fileNames": ["S01E03.mp4", "S01E01.mp4", "S01E02.mp4"]},
                    "Season 2": {"fileNames": ["S02E01.mp4"]}
                }
            }
        }
    })));
    harness.seed(Target::show("Dark"), json!({"seasons": []}));

    sync_missing_media(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();

    let show = harness.show("Dark").unwrap();
    let seasons: Vec<_> = show.seasons.iter().map(|s| s.season_number).collect();
    assert_eq!(seasons, [1, 2, 3]);
    for season in &show.seasons {
        let numbers: Vec<_> = season.episodes.iter().map(|e| e.episode_number).collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted);
    }
    assert_eq!(show.episode_count(), 6);
}

#[tokio::test]
async fn test_malformed_season_episodes_aborts_routine() {
    let harness = harness();
    harness.fs.set_metadata(
        "/tv/Severance/Season 1/metadata.json",
        json!({"episodes": {"1": {"name": "Good News About Hell"}}}),
    );

    let result = sync_missing_media(&harness.ctx, &harness.listing().await).await;

    assert_matches!(result, Err(Error::MalformedListing(_)));
    assert!(harness.show("Severance").is_none());
    assert!(harness.movie("Arrival").is_none());
}

#[tokio::test]
async fn test_removed_logo_is_unset() {
    let harness = harness();
    run_full_sync(&harness.ctx).await.unwrap();

    let mut value = catalog_listing();
    value["movies"]["Arrival"]["urls"]
        .as_object_mut()
        .unwrap()
        .remove("logo");
    let updated = listing(value);

    let report = sync_logos(&harness.ctx, &updated).unwrap();
    assert_eq!(report.writes, 1);
    assert!(harness.movie("Arrival").unwrap().logo.is_none());
    assert!(harness.show("Severance").unwrap().logo.is_some());
}

#[tokio::test]
async fn test_vanished_video_keeps_video_url() {
    let harness = harness();
    run_full_sync(&harness.ctx).await.unwrap();

    let mut value = catalog_listing();
    let updated = with_movie(&mut value, "Arrival", json!({"fileNames": ["Arrival.mkv"]}));

    let report = sync_video_url(&harness.ctx, &updated).unwrap();
    assert_eq!(report.writes, 0);
    assert!(report
        .skipped
        .iter()
        .any(|s| s.name == "Arrival" && s.reason == SkipReason::MissingVideo));
    assert!(harness.movie("Arrival").unwrap().video_url.is_some());
}

#[tokio::test]
async fn test_moved_video_updates_url() {
    let harness = harness();
    run_full_sync(&harness.ctx).await.unwrap();

    let mut value = catalog_listing();
    value["movies"]["Arrival"]["urls"]["mp4"] = json!("/movies/Arrival/Arrival (2016).mp4");
    value["movies"]["Arrival"]["urls"]["mediaLastModified"] = json!("2024-07-01T00:00:00.000Z");

    let report = sync_video_url(&harness.ctx, &listing(value)).unwrap();
    assert_eq!(report.writes, 1);

    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(
        movie.video_url.as_deref(),
        Some("http://fs.test/movies/Arrival/Arrival (2016).mp4")
    );
    assert_eq!(movie.media_last_modified.as_deref(), Some("2024-07-01T00:00:00.000Z"));
}

#[tokio::test]
async fn test_new_episode_keeps_unmodelled_keys() {
    let harness = TestHarness::new(listing(json!({
        "tv": {
            "S": {"seasons": {"Season 1": {"fileNames": ["S01E01.mp4", "S01E02.mp4"]}}}
        }
    })));
    harness.seed(
        Target::show("S"),
        json!({
            "addedBy": "admin",
            "seasons": [{
                "seasonNumber": 1,
                "customSeason": "keep",
                "episodes": [{
                    "episodeNumber": 1,
                    "hdr": "HDR10",
                    "videoURL": "http://fs.test/tv/S/Season 1/S01E01.mp4"
                }]
            }]
        }),
    );

    let outcome = sync_missing_media(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();
    assert_eq!(outcome.missing_media.tv[0].seasons[0].episodes, [2]);

    let show = harness.show("S").unwrap();
    assert_eq!(show.extra["addedBy"], "admin");
    let season = show.season(1).unwrap();
    assert_eq!(season.extra["customSeason"], "keep");
    assert_eq!(season.episode(1).unwrap().extra["hdr"], "HDR10");
    assert_eq!(
        season.episode(2).unwrap().video_url.as_deref(),
        Some("http://fs.test/tv/S/Season 1/S01E02.mp4")
    );
}

#[tokio::test]
async fn test_chapters_set_and_unset() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    value["movies"]["Arrival"]["urls"]
        .as_object_mut()
        .unwrap()
        .remove("chapters");
    season_one(&mut value)["urls"][HALF_LOOP] =
        json!({"chapters": "/tv/Severance/Season 1/S01E02.chapters.vtt"});
    let updated = listing(value);

    let report = sync_chapters(&harness.ctx, &updated).unwrap();
    assert_eq!(report.routine, Routine::Chapters);
    assert_eq!(report.writes, 2);

    assert!(harness.movie("Arrival").unwrap().chapter_url.is_none());
    let show = harness.show("Severance").unwrap();
    assert_eq!(
        show.season(1).unwrap().episode(2).unwrap().chapter_url.as_deref(),
        Some("http://fs.test/tv/Severance/Season 1/S01E02.chapters.vtt")
    );
    assert!(show.season(1).unwrap().episode(1).unwrap().chapter_url.is_none());

    assert_eq!(sync_chapters(&harness.ctx, &updated).unwrap().planned, 0);
}

#[tokio::test]
async fn test_blurhash_set_and_unset() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    value["movies"]["Arrival"]["urls"]["posterBlurhash"] = json!("LNEWHASH");
    value["tv"]["Severance"]
        .as_object_mut()
        .unwrap()
        .remove("posterBlurhash");
    season_one(&mut value)["urls"][PILOT]
        .as_object_mut()
        .unwrap()
        .remove("thumbnailBlurhash");
    let updated = listing(value);

    let report = sync_blurhash(&harness.ctx, &updated).unwrap();
    assert_eq!(report.writes, 3);

    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(movie.poster_blurhash.as_deref(), Some("LNEWHASH"));
    let show = harness.show("Severance").unwrap();
    assert!(show.poster_blurhash.is_none());
    assert!(show.poster_url.is_some());
    let pilot = show.season(1).unwrap().episode(1).unwrap();
    assert!(pilot.thumbnail_blurhash.is_none());
    assert!(pilot.thumbnail.is_some());

    assert_eq!(sync_blurhash(&harness.ctx, &updated).unwrap().planned, 0);
}

#[tokio::test]
async fn test_episode_blurhash_changed_through_array_filter() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    season_one(&mut value)["urls"][PILOT]["thumbnailBlurhash"] = json!("LREPLACED");

    let report = sync_blurhash(&harness.ctx, &listing(value)).unwrap();
    assert_eq!(report.writes, 1);
    assert_eq!(report.unmatched, 0);

    let show = harness.show("Severance").unwrap();
    let season = show.season(1).unwrap();
    assert_eq!(
        season.episode(1).unwrap().thumbnail_blurhash.as_deref(),
        Some("LREPLACED")
    );
    assert!(season.episode(2).unwrap().thumbnail_blurhash.is_none());
}

#[tokio::test]
async fn test_posters_set_and_unset() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    value["movies"]["Arrival"]["urls"]["poster"] = json!("/movies/Arrival/poster-2016.jpg");
    value["tv"]["Severance"]["backdrop"] = json!("/tv/Severance/backdrop.jpg");
    let report = sync_posters(&harness.ctx, &listing(value.clone())).unwrap();
    assert_eq!(report.writes, 2);

    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(
        movie.poster_url.as_deref(),
        Some("http://fs.test/movies/Arrival/poster-2016.jpg")
    );
    let show = harness.show("Severance").unwrap();
    assert_eq!(
        show.backdrop.as_deref(),
        Some("http://fs.test/tv/Severance/backdrop.jpg")
    );

    value["tv"]["Severance"]
        .as_object_mut()
        .unwrap()
        .remove("poster");
    let report = sync_posters(&harness.ctx, &listing(value)).unwrap();
    assert_eq!(report.writes, 1);

    let show = harness.show("Severance").unwrap();
    assert!(show.poster_url.is_none());
    assert!(show.backdrop.is_some());
    assert_eq!(show.poster_blurhash.as_deref(), Some("L6PZfSi_"));
}

#[tokio::test]
async fn test_length_and_dimensions_set_and_unset() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    value["movies"]["Arrival"]["length"] = json!({"Arrival.mp4": 7_000_000});
    value["movies"]["Arrival"]
        .as_object_mut()
        .unwrap()
        .remove("dimensions");
    season_one(&mut value)["lengths"][PILOT] = json!(3_500_000);
    season_one(&mut value)["dimensions"]
        .as_object_mut()
        .unwrap()
        .remove(PILOT);
    let updated = listing(value);

    let report = sync_length_and_dimensions(&harness.ctx, &updated).unwrap();
    assert_eq!(report.writes, 2);

    let movie = harness.movie("Arrival").unwrap();
    assert_eq!(movie.length, Some(7_000_000));
    assert!(movie.dimensions.is_none());
    let show = harness.show("Severance").unwrap();
    let pilot = show.season(1).unwrap().episode(1).unwrap();
    assert_eq!(pilot.length, Some(3_500_000));
    assert!(pilot.dimensions.is_none());

    assert_eq!(
        sync_length_and_dimensions(&harness.ctx, &updated)
            .unwrap()
            .planned,
        0
    );
}

#[tokio::test]
async fn test_episode_thumbnail_set_and_unset() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    season_one(&mut value)["urls"][PILOT]["thumbnail"] =
        json!("/tv/Severance/Season 1/S01E01-still.jpg");
    let report = sync_episode_thumbnails(&harness.ctx, &listing(value.clone())).unwrap();
    assert_eq!(report.writes, 1);

    let show = harness.show("Severance").unwrap();
    assert_eq!(
        show.season(1).unwrap().episode(1).unwrap().thumbnail.as_deref(),
        Some("http://fs.test/tv/Severance/Season 1/S01E01-still.jpg")
    );

    season_one(&mut value)["urls"][PILOT]
        .as_object_mut()
        .unwrap()
        .remove("thumbnail");
    let report = sync_episode_thumbnails(&harness.ctx, &listing(value)).unwrap();
    assert_eq!(report.writes, 1);

    let show = harness.show("Severance").unwrap();
    let pilot = show.season(1).unwrap().episode(1).unwrap();
    assert!(pilot.thumbnail.is_none());
    assert_eq!(pilot.thumbnail_blurhash.as_deref(), Some("LKO2?U"));
}

#[tokio::test]
async fn test_show_metadata_only_moves_forward() {
    let harness = synced_harness().await;
    let listing = harness.listing().await;

    harness.fs.set_metadata(
        "/tv/Severance/metadata.json",
        json!({"name": "Severance", "last_updated": "2024-03-01"}),
    );
    let report = sync_metadata(&harness.ctx, &listing).await.unwrap();
    assert_eq!(report.writes, 1);

    harness.fs.set_metadata(
        "/tv/Severance/metadata.json",
        json!({"name": "Old Title", "last_updated": "2024-01-01"}),
    );
    let report = sync_metadata(&harness.ctx, &listing).await.unwrap();
    assert_eq!(report.writes, 0);

    let show = harness.show("Severance").unwrap();
    let metadata = show.metadata.unwrap();
    assert_eq!(metadata["last_updated"], "2024-03-01");
    assert_eq!(metadata["name"], "Severance");
}

#[tokio::test]
async fn test_season_document_drives_season_and_episode_metadata() {
    let harness = synced_harness().await;
    let listing = harness.listing().await;

    harness.fs.set_metadata(
        "/tv/Severance/Season 1/metadata.json",
        json!({
            "season_number": 1,
            "last_updated": "2024-06-01",
            "episodes": [
                {"episode_number": 1, "name": "Good News About Hell (Remastered)", "last_updated": "2024-06-01"},
                {"episode_number": 2, "name": "Half Loop", "last_updated": "2024-06-01"}
            ]
        }),
    );
    let report = sync_metadata(&harness.ctx, &listing).await.unwrap();
    // Season 1 plus both episodes
    assert_eq!(report.writes, 3);

    let show = harness.show("Severance").unwrap();
    let season = show.season(1).unwrap();
    assert_eq!(season.metadata.as_ref().unwrap()["last_updated"], "2024-06-01");
    let pilot = season.episode(1).unwrap();
    assert_eq!(pilot.title.as_deref(), Some("Good News About Hell (Remastered)"));
    assert_eq!(pilot.metadata.as_ref().unwrap()["last_updated"], "2024-06-01");
    assert_eq!(season.episode(2).unwrap().title.as_deref(), Some("Half Loop"));

    harness.fs.set_metadata(
        "/tv/Severance/Season 1/metadata.json",
        json!({
            "season_number": 1,
            "last_updated": "2024-05-01",
            "episodes": [
                {"episode_number": 1, "name": "Stale Name", "last_updated": "2024-05-01"},
                {"episode_number": 2, "name": "Stale Loop", "last_updated": "2024-05-01"}
            ]
        }),
    );
    let report = sync_metadata(&harness.ctx, &listing).await.unwrap();
    assert_eq!(report.writes, 0);

    let show = harness.show("Severance").unwrap();
    let season = show.season(1).unwrap();
    assert_eq!(season.metadata.as_ref().unwrap()["last_updated"], "2024-06-01");
    assert_eq!(
        season.episode(1).unwrap().title.as_deref(),
        Some("Good News About Hell (Remastered)")
    );
}

#[tokio::test]
async fn test_episode_sidecar_metadata_only_moves_forward() {
    let harness = synced_harness().await;

    let mut value = catalog_listing();
    season_one(&mut value)["urls"][HALF_LOOP] =
        json!({"metadata": "/tv/Severance/Season 1/S01E02.json"});
    let listing = listing(value);

    harness.fs.set_metadata(
        "/tv/Severance/Season 1/S01E02.json",
        json!({"name": "Half Loop (Extended)", "last_updated": "2024-07-01"}),
    );
    let report = sync_metadata(&harness.ctx, &listing).await.unwrap();
    assert_eq!(report.writes, 1);

    harness.fs.set_metadata(
        "/tv/Severance/Season 1/S01E02.json",
        json!({"name": "Half Loop (Draft)", "last_updated": "2024-03-01"}),
    );
    let report = sync_metadata(&harness.ctx, &listing).await.unwrap();
    assert_eq!(report.writes, 0);

    let show = harness.show("Severance").unwrap();
    let episode = show.season(1).unwrap().episode(2).unwrap();
    assert_eq!(episode.title.as_deref(), Some("Half Loop (Extended)"));
    assert_eq!(episode.metadata.as_ref().unwrap()["last_updated"], "2024-07-01");
}

#[tokio::test]
async fn test_edited_episode_title_survives_metadata_sync() {
    let harness = synced_harness().await;
    harness.seed(
        Target::episode("Severance", 1, 1),
        json!({"title": "Good News About Hell (Pilot)"}),
    );

    let report = sync_metadata(&harness.ctx, &harness.listing().await)
        .await
        .unwrap();
    assert_eq!(report.writes, 0);

    let show = harness.show("Severance").unwrap();
    assert_eq!(
        show.season(1).unwrap().episode(1).unwrap().title.as_deref(),
        Some("Good News About Hell (Pilot)")
    );
}

#[tokio::test]
async fn test_failed_sync_bookkeeping_fails_run() {
    let harness = harness();
    get_conn(&harness.pool)
        .unwrap()
        .execute_batch("DROP TABLE sync_info")
        .unwrap();

    let result = run_full_sync(&harness.ctx).await;

    assert_matches!(result, Err(Error::Database(_)));
}
