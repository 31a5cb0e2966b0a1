//! Canonical name source tests against scratch catalog databases

mod helpers;

use helpers::{create_catalog_db, create_catalog_db_with_schema, MediaTree};
use popmedia_match::models::Outcome;
use popmedia_match::services::{
    CanonicalNameSource, NameListSource, PupDatabaseSource, RunMode,
};
use popmedia_match::DataSourceError;
use tempfile::TempDir;

#[tokio::test]
async fn test_stock_schema_lists_visual_pinball_tables() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = create_catalog_db(
        temp_dir.path(),
        &[(1, "Visual Pinball X"), (2, "Future Pinball"), (3, "Visual Pinball 9")],
        &[
            (Some("Twilight Zone (Bally 1993)"), 1),
            (Some("medieval Madness"), 1),
            (Some("Attack from Mars.vpx"), 3),
            (Some("Black Knight"), 2),
            (None, 1),
            (Some("   "), 1),
        ],
    )
    .await
    .unwrap();

    let source = PupDatabaseSource::open(&db_path, "Visual Pinball").await.unwrap();
    let listing = source.list_canonical_names().await.unwrap();

    assert_eq!(
        listing.names,
        vec!["Attack from Mars", "medieval Madness", "Twilight Zone (Bally 1993)"]
    );
    assert!(listing.warnings.is_empty());
}

#[tokio::test]
async fn test_renamed_columns_fall_back_by_position() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = create_catalog_db_with_schema(
        temp_dir.path(),
        &[
            "CREATE TABLE emulators (ID INTEGER, Name TEXT)",
            "CREATE TABLE Games (Title TEXT, Emu INTEGER)",
            "INSERT INTO emulators VALUES (1, 'Visual Pinball X'), (2, 'Future Pinball')",
            "INSERT INTO Games VALUES ('Twilight Zone', 1), ('Scared Stiff', 1), ('Other', 2)",
        ],
    )
    .await
    .unwrap();

    let source = PupDatabaseSource::open(&db_path, "Visual Pinball").await.unwrap();
    let listing = source.list_canonical_names().await.unwrap();

    assert_eq!(listing.names, vec!["Scared Stiff", "Twilight Zone"]);
    assert_eq!(listing.warnings.len(), 4);
    assert!(listing
        .warnings
        .iter()
        .all(|w| matches!(w, DataSourceError::ColumnFallback { .. })));
}

#[tokio::test]
async fn test_too_few_columns_yields_empty_listing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = create_catalog_db_with_schema(
        temp_dir.path(),
        &[
            "CREATE TABLE emulators (EMUID INTEGER, EmuName TEXT)",
            "CREATE TABLE Games (GameDisplay TEXT)",
            "INSERT INTO emulators VALUES (1, 'Visual Pinball X')",
            "INSERT INTO Games VALUES ('Twilight Zone')",
        ],
    )
    .await
    .unwrap();

    let source = PupDatabaseSource::open(&db_path, "Visual Pinball").await.unwrap();
    let listing = source.list_canonical_names().await.unwrap();

    assert!(listing.names.is_empty());
    assert_eq!(listing.warnings.len(), 1);
    assert!(matches!(
        &listing.warnings[0],
        DataSourceError::TooFewColumns { table, found: 1 } if table == "Games"
    ));
}

#[tokio::test]
async fn test_missing_emulators_table_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = create_catalog_db_with_schema(
        temp_dir.path(),
        &["CREATE TABLE Games (GameDisplay TEXT, EMUID INTEGER)"],
    )
    .await
    .unwrap();

    let source = PupDatabaseSource::open(&db_path, "Visual Pinball").await.unwrap();
    let listing = source.list_canonical_names().await.unwrap();

    assert!(listing.names.is_empty());
    assert!(matches!(
        &listing.warnings[..],
        [DataSourceError::TooFewColumns { found: 0, .. }]
    ));
}

#[tokio::test]
async fn test_no_matching_emulator_yields_empty_listing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = create_catalog_db(
        temp_dir.path(),
        &[(1, "Future Pinball")],
        &[(Some("Black Knight"), 1)],
    )
    .await
    .unwrap();

    let source = PupDatabaseSource::open(&db_path, "Visual Pinball").await.unwrap();
    let listing = source.list_canonical_names().await.unwrap();

    assert!(listing.names.is_empty());
    assert!(listing.warnings.is_empty());
}

#[tokio::test]
async fn test_missing_database_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("PUPDatabase.db");
    let result = PupDatabaseSource::open(&db_path, "Visual Pinball").await;

    assert!(matches!(
        result,
        Err(DataSourceError::Catalog(popmedia_common::Error::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_name_list_skips_comments_and_blanks() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("names.txt");
    std::fs::write(
        &path,
        "# exported tables\n\nTwilight Zone\n  Medieval Madness.vpx  \nTwilight Zone\n",
    )
    .unwrap();

    let listing = NameListSource::new(&path).list_canonical_names().await.unwrap();
    assert_eq!(
        listing.names,
        vec!["Twilight Zone", "Medieval Madness", "Twilight Zone"]
    );
}

#[tokio::test]
async fn test_missing_name_list_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = NameListSource::new(temp_dir.path().join("absent.txt"))
        .list_canonical_names()
        .await;
    assert!(matches!(result, Err(DataSourceError::NameList(_, _))));
}

#[tokio::test]
async fn test_catalog_names_drive_a_run() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = create_catalog_db(
        temp_dir.path(),
        &[(1, "Visual Pinball X")],
        &[(Some("Medieval Madness"), 1), (Some("Twilight Zone"), 1)],
    )
    .await
    .unwrap();
    let listing = PupDatabaseSource::open(&db_path, "Visual Pinball")
        .await
        .unwrap()
        .list_canonical_names()
        .await
        .unwrap();

    let tree = MediaTree::new();
    tree.add("Wheel/Medieval_Madness_v1.2 (US).png");
    let output = tree.run(RunMode::Apply, &listing.names);

    assert_eq!(output.outcomes[0].records[0].outcome, Outcome::Renamed);
    assert!(tree.media("Wheel/Medieval Madness.png").exists());
}
