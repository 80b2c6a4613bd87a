use serde_json::json;
use storefront_api::{
    dto::categories::UpdateCategoryRequest,
    models::{string_list, string_list_json},
    routes::params::Pagination,
    services::{order_service::validate_order_status, upload_service::build_image_name},
};
use uuid::Uuid;

#[test]
fn pagination_defaults() {
    let pagination = Pagination {
        page: None,
        per_page: None,
    };
    assert_eq!(pagination.normalize(), (1, 12, 0));
}

#[test]
fn pagination_clamps_out_of_range_values() {
    let pagination = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    assert_eq!(pagination.normalize(), (1, 100, 0));

    let pagination = Pagination {
        page: Some(-5),
        per_page: Some(0),
    };
    assert_eq!(pagination.normalize(), (1, 1, 0));
}

#[test]
fn pagination_computes_offset() {
    let pagination = Pagination {
        page: Some(3),
        per_page: Some(10),
    };
    assert_eq!(pagination.normalize(), (3, 10, 20));
}

#[test]
fn string_list_reads_canonical_arrays() {
    let value = json!(["a.jpg", "b.jpg"]);
    assert_eq!(string_list(&value), vec!["a.jpg", "b.jpg"]);
}

#[test]
fn string_list_reads_legacy_encoded_strings() {
    // Older rows stored the array as a JSON-encoded string.
    let value = json!("[\"a.jpg\",\"b.jpg\"]");
    assert_eq!(string_list(&value), vec!["a.jpg", "b.jpg"]);
}

#[test]
fn string_list_tolerates_garbage() {
    assert!(string_list(&json!(42)).is_empty());
    assert!(string_list(&json!(null)).is_empty());
    assert!(string_list(&json!("not json")).is_empty());
    // Non-string elements are dropped rather than failing the read.
    assert_eq!(string_list(&json!(["ok", 7, null])), vec!["ok"]);
}

#[test]
fn string_list_json_writes_canonical_arrays() {
    let items = vec!["x.png".to_string(), "y.png".to_string()];
    assert_eq!(string_list_json(&items), json!(["x.png", "y.png"]));
}

#[test]
fn order_status_accepts_known_values() {
    for status in ["PENDING", "PAID", "SHIPPED", "COMPLETED", "CANCELED"] {
        assert!(validate_order_status(status).is_ok(), "{status} rejected");
    }
}

#[test]
fn order_status_rejects_unknown_values() {
    assert!(validate_order_status("pending").is_err());
    assert!(validate_order_status("REFUNDED").is_err());
    assert!(validate_order_status("").is_err());
}

#[test]
fn category_update_distinguishes_absent_from_null_parent() {
    let absent: UpdateCategoryRequest = serde_json::from_str(r#"{"name":"Shoes"}"#).unwrap();
    assert_eq!(absent.parent_id, None);

    let detach: UpdateCategoryRequest = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
    assert_eq!(detach.parent_id, Some(None));

    let id = Uuid::new_v4();
    let attach: UpdateCategoryRequest =
        serde_json::from_str(&format!(r#"{{"parent_id":"{id}"}}"#)).unwrap();
    assert_eq!(attach.parent_id, Some(Some(id)));
}

#[test]
fn image_names_keep_extension_and_never_collide() {
    let first = build_image_name("photo.png");
    let second = build_image_name("photo.png");
    assert!(first.starts_with("product-"));
    assert!(first.ends_with(".png"));
    assert_ne!(first, second);
}

#[test]
fn image_names_default_extension() {
    let name = build_image_name("no-extension");
    assert!(name.ends_with(".bin"));
}
