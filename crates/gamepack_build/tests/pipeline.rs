use std::io::{Cursor, Read};
use std::time::Duration;

use gamepack_build::bundle::{pack_entry, sprite_image_entry, sprite_manifest_entry};
use gamepack_build::prelude::*;
use gamepack_core::prelude::*;
use gamepack_mock::fixtures::{game, image_asset, transformed_url};
use gamepack_mock::{MemoryCdn, MemoryGameStore, solid_png};

fn pipeline(
    store: &MemoryGameStore,
    cdn: &MemoryCdn,
) -> BuildPipeline<MemoryGameStore, MemoryCdn, MemoryCdn> {
    BuildPipeline::new(store.clone(), cdn.clone(), cdn.clone(), BuildConfig::default())
}

fn code(c: &str) -> GameRef {
    GameRef::Code(c.to_string())
}

/// A game with a 64x64 and a 32x32 image, both with complete metadata.
fn two_tile_store() -> MemoryGameStore {
    let store = MemoryGameStore::new();
    let g = game("g1", "slots");
    store.insert_asset(image_asset(&g, 1, "seven", 64, 64));
    store.insert_asset(image_asset(&g, 2, "cherry", 32, 32));
    store.insert_game(g);
    store
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let store = MemoryGameStore::new();
    let cdn = MemoryCdn::synthesizing();
    let err = pipeline(&store, &cdn)
        .build_pack(&code("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::GameNotFound(GameRef::Code(c)) if c == "missing"));
}

#[tokio::test]
async fn pack_of_empty_game_has_no_assets() {
    let store = MemoryGameStore::new();
    store.insert_game(game("g1", "empty"));
    let cdn = MemoryCdn::synthesizing();

    let pack = pipeline(&store, &cdn).build_pack(&code("empty")).await.unwrap();
    assert_eq!(pack.game_code, "empty");
    assert!(pack.assets.is_empty());

    let json = serde_json::to_value(&pack).unwrap();
    assert_eq!(json["assets"], serde_json::json!([]));
    assert_eq!(json["config"]["theme"], "empty");
}

#[tokio::test]
async fn pack_resolves_urls_in_creation_order() {
    let store = MemoryGameStore::new();
    let g = game("g1", "slots");
    // Inserted out of order; creation time decides.
    store.insert_asset(image_asset(&g, 2, "cherry", 32, 32));
    let mut seven = image_asset(&g, 1, "seven", 128, 128);
    seven.target_width = Some(64);
    seven.target_height = Some(64);
    store.insert_asset(seven);
    store.insert_game(g);
    let cdn = MemoryCdn::synthesizing();

    let pack = pipeline(&store, &cdn)
        .build_pack(&GameRef::Id("g1".into()))
        .await
        .unwrap();

    let labels: Vec<_> = pack.assets.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, ["seven", "cherry"]);

    let seven = &pack.assets[0];
    assert_eq!(seven.original.width, Some(128));
    assert_eq!(seven.target.width, Some(64));
    assert_eq!(seven.processed.url, transformed_url("seven", 64, 64));
    assert!(cdn.fetched().is_empty(), "pack builds never fetch");
}

#[tokio::test]
async fn pack_keeps_origin_url_without_transform_metadata() {
    let store = MemoryGameStore::new();
    let g = game("g1", "slots");
    let mut bare = image_asset(&g, 1, "bare", 16, 16);
    bare.metadata = AssetMetadata::default();
    let origin = bare.url.clone();
    store.insert_asset(bare);
    let mut no_format = image_asset(&g, 2, "noformat", 16, 16);
    no_format.format = None;
    let no_format_origin = no_format.url.clone();
    store.insert_asset(no_format);
    store.insert_game(g);
    let cdn = MemoryCdn::synthesizing();

    let pack = pipeline(&store, &cdn).build_pack(&code("slots")).await.unwrap();
    assert_eq!(pack.assets[0].processed.url, origin);
    assert_eq!(pack.assets[1].processed.url, no_format_origin);
}

#[tokio::test]
async fn sprite_of_two_tiles() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();

    let manifest = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap();

    let sheet = &manifest.sprite;
    assert_eq!((sheet.columns, sheet.rows), (2, 1));
    assert_eq!((sheet.cell_width, sheet.cell_height), (64, 64));
    assert_eq!((sheet.width, sheet.height), (128, 64));
    assert_eq!(manifest.frames["seven"], Frame { x: 0, y: 0, w: 64, h: 64 });
    assert_eq!(manifest.frames["cherry"], Frame { x: 64, y: 0, w: 32, h: 32 });

    assert_eq!(sheet.url, cdn.sheet_url("sprite_slots"));
    assert_eq!(cdn.uploads(), ["sprite_slots"]);

    let png = cdn.object(&sheet.url).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (128, 64));
}

#[tokio::test]
async fn sprite_skips_non_image_assets() {
    let store = two_tile_store();
    let g = game("g1", "slots");
    let mut clip = image_asset(&g, 3, "intro", 320, 240);
    clip.kind = AssetKind::Video;
    clip.metadata = AssetMetadata::default();
    store.insert_asset(clip);
    let cdn = MemoryCdn::synthesizing();

    let manifest = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap();
    assert_eq!(manifest.frames.len(), 2);
    assert!(!manifest.frames.contains_key("intro"));
}

#[tokio::test]
async fn sprite_of_empty_game_fails() {
    let store = MemoryGameStore::new();
    store.insert_game(game("g1", "empty"));
    let cdn = MemoryCdn::synthesizing();

    let err = pipeline(&store, &cdn)
        .build_sprite(&code("empty"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::NoImageAssets(_)));
    assert!(cdn.uploads().is_empty());
}

#[tokio::test]
async fn sprite_fails_fast_on_missing_public_id() {
    let store = two_tile_store();
    let g = game("g1", "slots");
    let mut broken = image_asset(&g, 3, "broken", 16, 16);
    broken.metadata.public_id = None;
    store.insert_asset(broken);
    let cdn = MemoryCdn::synthesizing();

    let err = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();

    match &err {
        BuildError::DataIntegrity { asset_id, reason } => {
            assert_eq!(asset_id, "g1-3");
            assert_eq!(*reason, ResolveError::MissingPublicId);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("g1-3"));
    assert!(cdn.fetched().is_empty(), "no fetch before validation passes");
}

async fn integrity_failure(mutate: impl FnOnce(&mut GameAsset)) -> (BuildError, MemoryCdn) {
    let store = two_tile_store();
    let g = game("g1", "slots");
    let mut broken = image_asset(&g, 3, "broken", 16, 16);
    mutate(&mut broken);
    store.insert_asset(broken);
    let cdn = MemoryCdn::synthesizing();

    let err = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();
    (err, cdn)
}

#[tokio::test]
async fn sprite_fails_fast_on_missing_format() {
    let (err, cdn) = integrity_failure(|asset| asset.format = None).await;

    match &err {
        BuildError::DataIntegrity { asset_id, reason } => {
            assert_eq!(asset_id, "g1-3");
            assert_eq!(*reason, ResolveError::MissingFormat);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cdn.fetched().is_empty());
    assert!(cdn.uploads().is_empty());
}

#[tokio::test]
async fn sprite_fails_fast_on_missing_size() {
    let (err, cdn) = integrity_failure(|asset| {
        asset.width = None;
        asset.height = Some(0);
    })
    .await;

    match &err {
        BuildError::DataIntegrity { asset_id, reason } => {
            assert_eq!(asset_id, "g1-3");
            assert_eq!(*reason, ResolveError::MissingSize);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cdn.fetched().is_empty());
}

#[tokio::test]
async fn oversized_sheet_is_rejected_before_fetching() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();
    let config = BuildConfig {
        max_sheet_pixels: 128 * 64 - 1,
        ..Default::default()
    };

    let err = BuildPipeline::new(store, cdn.clone(), cdn.clone(), config)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();

    match err {
        BuildError::SheetTooLarge { width, height, .. } => assert_eq!((width, height), (128, 64)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(cdn.fetched().is_empty());
    assert!(cdn.uploads().is_empty());
}

#[tokio::test]
async fn tiles_keep_their_cells_when_fetches_finish_out_of_order() {
    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    let store = MemoryGameStore::new();
    let g = game("g1", "slots");
    store.insert_asset(image_asset(&g, 1, "seven", 32, 32));
    store.insert_asset(image_asset(&g, 2, "cherry", 32, 32));
    store.insert_asset(image_asset(&g, 3, "bar", 32, 32));
    store.insert_game(g);

    let cdn = MemoryCdn::default();
    cdn.put(transformed_url("seven", 32, 32), solid_png(32, 32, RED));
    cdn.put(transformed_url("cherry", 32, 32), solid_png(32, 32, BLUE));
    cdn.put(transformed_url("bar", 32, 32), solid_png(32, 32, GREEN));
    // The first tile completes last, the second after the third.
    cdn.delay(transformed_url("seven", 32, 32), Duration::from_millis(200));
    cdn.delay(transformed_url("cherry", 32, 32), Duration::from_millis(100));

    let composed = pipeline(&store, &cdn)
        .compose_sprite(&code("slots"))
        .await
        .unwrap();

    let frames = composed.frames();
    assert_eq!(frames["seven"], Frame { x: 0, y: 0, w: 32, h: 32 });
    assert_eq!(frames["cherry"], Frame { x: 32, y: 0, w: 32, h: 32 });
    assert_eq!(frames["bar"], Frame { x: 0, y: 32, w: 32, h: 32 });

    let sheet = image::load_from_memory(&composed.png).unwrap().to_rgba8();
    assert_eq!(sheet.dimensions(), (64, 64));
    assert_eq!(sheet.get_pixel(0, 0).0, RED);
    assert_eq!(sheet.get_pixel(32, 0).0, BLUE);
    assert_eq!(sheet.get_pixel(0, 32).0, GREEN);
    assert_eq!(sheet.get_pixel(32, 32).0[3], 0, "unused cell stays transparent");
}

#[tokio::test]
async fn sprite_rejects_duplicate_labels() {
    let store = two_tile_store();
    let g = game("g1", "slots");
    store.insert_asset(image_asset(&g, 3, "seven", 16, 16));
    let cdn = MemoryCdn::synthesizing();

    let err = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateLabel { ref label, ref asset_id } if label == "seven" && asset_id == "g1-3"));
}

#[tokio::test]
async fn duplicate_labels_last_wins_when_allowed() {
    let store = two_tile_store();
    let g = game("g1", "slots");
    store.insert_asset(image_asset(&g, 3, "seven", 16, 16));
    let cdn = MemoryCdn::synthesizing();
    let config = BuildConfig {
        reject_duplicate_labels: false,
        ..Default::default()
    };

    let manifest = BuildPipeline::new(store, cdn.clone(), cdn, config)
        .build_sprite(&code("slots"))
        .await
        .unwrap();
    assert_eq!(manifest.frames.len(), 2);
    assert_eq!(manifest.frames["seven"], Frame { x: 0, y: 64, w: 16, h: 16 });
}

#[tokio::test]
async fn one_failed_fetch_among_five_aborts_the_sprite() {
    let store = MemoryGameStore::new();
    let g = game("g1", "slots");
    for (seq, label) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        store.insert_asset(image_asset(&g, seq as i64, label, 24, 24));
    }
    store.insert_game(g);

    let cdn = MemoryCdn::synthesizing();
    let failing = transformed_url("c", 24, 24);
    cdn.fail(failing.clone(), 503);

    let err = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();

    match err {
        BuildError::Fetch(fetch) => {
            assert_eq!(fetch.url(), failing);
            assert_eq!(
                fetch,
                FetchError::Status {
                    url: failing.clone(),
                    status: 503
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cdn.uploads().is_empty(), "nothing published after a failed fetch");
}

#[tokio::test]
async fn slow_tile_times_out() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing().with_latency(Duration::from_millis(500));
    let config = BuildConfig {
        fetch_timeout: Duration::from_millis(20),
        ..Default::default()
    };

    let err = BuildPipeline::new(store, cdn.clone(), cdn, config)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Fetch(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn undecodable_tile_fails_with_its_url() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();
    let url = transformed_url("cherry", 32, 32);
    cdn.put(url.clone(), bytes::Bytes::from_static(b"<html>oops</html>"));

    let err = pipeline(&store, &cdn)
        .build_sprite(&code("slots"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Decode { url: ref u, .. } if *u == url));
}

#[tokio::test]
async fn rebuild_overwrites_the_same_sheet() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();
    let pipeline = pipeline(&store, &cdn);

    let first = pipeline.build_sprite(&code("slots")).await.unwrap();
    let second = pipeline.build_sprite(&GameRef::Id("g1".into())).await.unwrap();

    assert_eq!(first.sprite.url, second.sprite.url);
    assert_eq!(cdn.uploads(), ["sprite_slots", "sprite_slots"]);
}

#[tokio::test]
async fn bundle_contains_both_manifests_and_the_sheet() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();

    let bundle = pipeline(&store, &cdn)
        .build_bundle(&code("slots"))
        .await
        .unwrap();
    assert_eq!(bundle.file_name, "game_pack_slots.zip");
    assert!(
        cdn.fetched().contains(&bundle.sprite.sprite.url),
        "sheet is downloaded again from its public url"
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(bundle.data.to_vec())).unwrap();
    assert_eq!(archive.len(), 3);

    let mut pack_json = String::new();
    archive
        .by_name(&pack_entry("slots"))
        .unwrap()
        .read_to_string(&mut pack_json)
        .unwrap();
    let pack: PackManifest = serde_json::from_str(&pack_json).unwrap();
    assert_eq!(pack, bundle.pack);

    let mut sprite_json = String::new();
    archive
        .by_name(&sprite_manifest_entry("slots"))
        .unwrap()
        .read_to_string(&mut sprite_json)
        .unwrap();
    let sprite: SpriteManifest = serde_json::from_str(&sprite_json).unwrap();
    assert_eq!(sprite.frames.len(), 2);

    let mut png = Vec::new();
    archive
        .by_name(&sprite_image_entry("slots"))
        .unwrap()
        .read_to_end(&mut png)
        .unwrap();
    assert_eq!(png, cdn.object(&sprite.sprite.url).unwrap().to_vec());
}

#[tokio::test]
async fn bundle_reports_the_upload_error() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();
    cdn.fail_uploads("quota exceeded");

    let err = pipeline(&store, &cdn)
        .build_bundle(&code("slots"))
        .await
        .unwrap_err();

    match err {
        BuildError::Publish(PublishError::Upload { public_id, message }) => {
            assert_eq!(public_id, "sprite_slots");
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn bundle_fails_when_published_sheet_is_unreachable() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();
    let sheet = cdn.sheet_url("sprite_slots");
    cdn.fail(sheet.clone(), 403);

    let err = pipeline(&store, &cdn)
        .build_bundle(&code("slots"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Fetch(FetchError::Status { ref url, status: 403 }) if *url == sheet));
}

#[tokio::test]
async fn export_lists_raw_assets() {
    let store = two_tile_store();
    let cdn = MemoryCdn::synthesizing();

    let export = pipeline(&store, &cdn)
        .export_game(&code("slots"))
        .await
        .unwrap();
    assert_eq!(export.id, "g1");
    assert_eq!(export.assets.len(), 2);
    assert_eq!(
        export.assets[0].url,
        "https://res.cloudinary.com/demo/image/upload/v1/seven.png"
    );
}
