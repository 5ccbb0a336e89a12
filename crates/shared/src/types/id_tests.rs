use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = VariantId::new();
    assert!(!id.to_string().is_empty());
    assert_ne!(id, VariantId::new());
}

#[test]
fn test_typed_id_uuid_conversions() {
    let uuid = Uuid::new_v4();
    let id = SaleId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
    assert_eq!(SaleId::from(uuid), id);
    assert_eq!(Uuid::from(id), uuid);
}

#[test]
fn test_typed_id_display_matches_uuid() {
    let uuid = Uuid::new_v4();
    assert_eq!(OrderId::from_uuid(uuid).to_string(), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = OrderItemId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(OrderItemId::from_str("ORDER-1").is_err());
}

#[test]
fn test_typed_ids_order_by_uuid() {
    let low = VariantId::from_uuid(Uuid::from_u128(1));
    let high = VariantId::from_uuid(Uuid::from_u128(2));
    let mut ids = vec![high, low];
    ids.sort();
    assert_eq!(ids, vec![low, high]);
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::from_u128(42);
    let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
