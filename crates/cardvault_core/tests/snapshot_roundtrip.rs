use cardvault_core::{
    export_snapshot, import_snapshot, parse_snapshot, CardRepository, ExportOptions, MemoryStore,
    SnapshotError, SNAPSHOT_VERSION,
};
use serde_json::json;
use std::collections::BTreeSet;

fn repo() -> CardRepository<MemoryStore> {
    CardRepository::new(MemoryStore::new())
}

#[test]
fn export_then_import_preserves_name_image_multiset() {
    let mut source = repo();
    source.create("Visa", "data:image/png;base64,AAA").unwrap();
    source.create("Amex", "data:image/png;base64,BBB").unwrap();
    source.create("Metro", "data:image/png;base64,CCC").unwrap();

    let cards = source.read_all().unwrap();
    let doc = export_snapshot(&cards, &ExportOptions::default());
    assert_eq!(doc.version, SNAPSHOT_VERSION);
    assert_eq!(doc.card_count, 3);

    let mut target = repo();
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(import_snapshot(&mut target, &value).unwrap(), 3);

    let imported = target.read_all().unwrap();
    let original_pairs: BTreeSet<_> = cards
        .iter()
        .map(|card| (card.name.clone(), card.image_data.clone()))
        .collect();
    let imported_pairs: BTreeSet<_> = imported
        .iter()
        .map(|card| (card.name.clone(), card.image_data.clone()))
        .collect();
    assert_eq!(original_pairs, imported_pairs);

    // Imported records carry fresh identities.
    let original_ids: BTreeSet<_> = cards.iter().map(|card| card.id).collect();
    assert!(imported.iter().all(|card| !original_ids.contains(&card.id)));
}

#[test]
fn visa_amex_scenario_preserves_hidden_through_roundtrip() {
    let mut source = repo();
    let a = source.create("Visa", "data:image/...AAA").unwrap();
    source.create("Amex", "data:image/...BBB").unwrap();

    assert!(source.toggle_visibility(a.id).unwrap());
    let cards = source.read_all().unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards[0].hidden);
    assert!(!cards[1].hidden);

    let doc = export_snapshot(
        &cards,
        &ExportOptions {
            include_images: true,
            include_metadata: false,
        },
    );
    assert_eq!(doc.card_count, 2);

    let mut target = repo();
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(import_snapshot(&mut target, &value).unwrap(), 2);

    let imported = target.read_all().unwrap();
    let names: Vec<_> = imported.iter().map(|card| card.name.as_str()).collect();
    assert_eq!(names, vec!["Visa", "Amex"]);

    // The exporter always includes `hidden`, so the flag survives.
    let visa = imported.iter().find(|card| card.name == "Visa").unwrap();
    assert!(visa.hidden);
    let amex = imported.iter().find(|card| card.name == "Amex").unwrap();
    assert!(!amex.hidden);
}

#[test]
fn import_without_cards_field_fails_before_any_write() {
    let mut target = repo();
    let err = import_snapshot(&mut target, &json!({ "version": "2.0" })).unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidImportFormat(_)));
    assert!(target.read_all().unwrap().is_empty());
}

#[test]
fn import_with_non_sequence_cards_fails() {
    let mut target = repo();
    let err = import_snapshot(&mut target, &json!({ "cards": "nope" })).unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidImportFormat(_)));
}

#[test]
fn import_with_no_valid_entry_fails() {
    let mut target = repo();
    let doc = json!({
        "cards": [
            { "name": "", "imageData": "data:AAA" },
            { "name": "Visa" },
            { "hidden": true }
        ]
    });

    let err = import_snapshot(&mut target, &doc).unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidImportFormat(_)));
    assert!(target.read_all().unwrap().is_empty());
}

#[test]
fn import_filters_invalid_entries_and_keeps_the_rest() {
    let mut target = repo();
    let doc = json!({
        "cards": [
            { "name": "Visa", "imageData": "data:AAA" },
            { "name": "", "imageData": "data:BBB" },
            { "name": "Amex", "imageData": "data:CCC" }
        ]
    });

    assert_eq!(import_snapshot(&mut target, &doc).unwrap(), 2);
    let names: Vec<_> = target
        .read_all()
        .unwrap()
        .into_iter()
        .map(|card| card.name)
        .collect();
    assert_eq!(names, vec!["Visa", "Amex"]);
}

#[test]
fn legacy_shape_without_version_or_metadata_is_backfilled() {
    let mut target = repo();
    let legacy = parse_snapshot(
        r#"{
            "cards": [
                { "id": "1699900000000-x7f", "name": "Visa", "imageData": "data:AAA" }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(import_snapshot(&mut target, &legacy).unwrap(), 1);

    let card = &target.read_all().unwrap()[0];
    assert_eq!(card.name, "Visa");
    assert!(!card.hidden);
    assert_eq!(card.created_at, card.last_modified);
    let metadata = card.metadata.clone().unwrap();
    assert_eq!(metadata.imported, Some(true));
}

#[test]
fn type_mismatched_optional_fields_are_backfilled_not_dropped() {
    let mut target = repo();
    let doc = json!({
        "cards": [
            {
                "name": "Visa",
                "imageData": "data:AAA",
                "createdAt": 1699900000000u64,
                "hidden": "yes",
                "metadata": "legacy"
            }
        ]
    });

    assert_eq!(import_snapshot(&mut target, &doc).unwrap(), 1);

    let card = &target.read_all().unwrap()[0];
    assert_eq!(card.name, "Visa");
    assert!(!card.hidden);
    assert_eq!(card.created_at, card.last_modified);
    assert_eq!(card.metadata.clone().unwrap().imported, Some(true));
}

#[test]
fn reimporting_the_same_snapshot_appends_duplicates() {
    let mut source = repo();
    source.create("Visa", "data:AAA").unwrap();
    let doc = export_snapshot(&source.read_all().unwrap(), &ExportOptions::default());
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(import_snapshot(&mut source, &value).unwrap(), 1);
    assert_eq!(import_snapshot(&mut source, &value).unwrap(), 1);
    assert_eq!(source.read_all().unwrap().len(), 3);
}

#[test]
fn import_into_full_store_reports_import_storage_full() {
    let mut target = CardRepository::new(MemoryStore::with_capacity(64));
    let doc = json!({
        "cards": [
            { "name": "Visa", "imageData": format!("data:{}", "x".repeat(512)) }
        ]
    });

    let err = import_snapshot(&mut target, &doc).unwrap_err();
    assert!(matches!(err, SnapshotError::ImportStorageFull));

    // The batched write failed as a unit; nothing from the batch remains.
    assert!(target.read_all().unwrap().is_empty());
}

#[test]
fn parse_snapshot_rejects_non_json_text() {
    let err = parse_snapshot("not json at all").unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidImportFormat(_)));
}
