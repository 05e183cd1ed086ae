use super::*;

#[test]
fn patch_tells_missing_keys_from_nulls() {
    let patch: ArtworkPatch =
        serde_json::from_str(r#"{"title":"Tide II","price":null,"description":"dusk"}"#)
            .expect("json");
    assert_eq!(patch.title.as_deref(), Some("Tide II"));
    assert_eq!(patch.price, Some(None));
    assert_eq!(patch.description, Some(Some("dusk".to_string())));
    assert_eq!(patch.due_date, None);
    assert_eq!(patch.image_url, None);
}

#[test]
fn clearing_patch_serializes_null_and_skips_untouched() {
    let patch = ArtworkPatch {
        price: Some(None),
        ..ArtworkPatch::default()
    };
    let value = serde_json::to_value(&patch).expect("json");
    assert_eq!(value, serde_json::json!({ "price": null }));
    assert!(!patch.is_empty());
    assert!(ArtworkPatch::default().is_empty());
}
