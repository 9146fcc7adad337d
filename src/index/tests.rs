use super::*;
use crate::catalog::Catalog;

#[test]
fn metadata_round_trips_product() {
    let catalog = Catalog::builtin();
    for product in catalog.all() {
        let metadata = ProductMetadata::try_from(product).expect("metadata encodes");
        assert_eq!(metadata.id, product.id);
        assert!(metadata.features.starts_with('['));

        let decoded = Product::try_from(metadata).expect("metadata decodes");
        assert_eq!(&decoded, product);
    }
}

#[test]
fn metadata_serializes_flat() {
    let product = Catalog::builtin()
        .by_id("laptop_001")
        .expect("macbook exists");
    let metadata = ProductMetadata::try_from(product).expect("metadata encodes");
    let json = serde_json::to_value(&metadata).expect("metadata serializes");

    assert_eq!(json["category"], "laptop");
    assert_eq!(json["price"], 1999.0);
    assert!(json["specs"].is_string());
    assert!(json["tags"].as_str().is_some_and(|t| t.contains("development")));
}

#[test]
fn corrupt_metadata_is_rejected() {
    let product = Catalog::builtin().by_id("phone_003").expect("pixel exists");
    let mut metadata = ProductMetadata::try_from(product).expect("metadata encodes");
    metadata.features = "5G, AI camera".to_string();

    let err = Product::try_from(metadata).expect_err("plain text is not a JSON list");
    assert!(err.to_string().contains("phone_003"));
}

#[test]
fn filter_documents() {
    assert_eq!(
        MetadataFilter::Category(Category::Laptop).to_json(),
        json!({ "category": "laptop" })
    );
    assert_eq!(
        MetadataFilter::Brand("Apple".to_string()).to_json(),
        json!({ "brand": "Apple" })
    );
    assert_eq!(
        MetadataFilter::PriceRange(PriceRange::new(500.0, 1000.0)).to_json(),
        json!({ "price": { "$gte": 500.0, "$lte": 1000.0 } })
    );
}
