use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::MenuItem;

/// Where the canonical menu document comes from.
///
/// The CLI implements this with reqwest; tests use in-memory fakes.
pub trait MenuSource {
    fn fetch_menu(&self) -> impl Future<Output = Result<Vec<MenuItem>>> + Send;
}

#[derive(Debug, Deserialize)]
pub struct MenuDocument {
    pub menu: Vec<MenuRecord>,
}

#[derive(Debug, Deserialize)]
pub struct MenuRecord {
    pub id: Option<i64>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceField>,
    pub image: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Text(String),
    Number(f64),
}

impl PriceField {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => format!("{n:.2}"),
        }
    }
}

/// Map one record to a [`MenuItem`]. `position` is the 1-based index in the
/// document and stands in for a missing `id`.
pub fn record_to_item(record: MenuRecord, position: usize) -> Result<MenuItem> {
    let title = record
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::parse(format!("menu record {position} has no title")))?;
    let id = match record.id {
        Some(id) => id,
        None => i64::try_from(position)
            .map_err(|_| Error::parse(format!("menu record {position} has no usable id")))?,
    };

    Ok(MenuItem {
        id,
        title,
        description: record.description.unwrap_or_default(),
        price: record.price.map(PriceField::into_text).unwrap_or_default(),
        image: record.image.unwrap_or_default(),
        category: record.category.unwrap_or_default(),
    })
}

/// Parse a `{ "menu": [ ... ] }` document.
pub fn parse_menu_document(bytes: &[u8]) -> Result<Vec<MenuItem>> {
    let doc: MenuDocument = serde_json::from_slice(bytes)?;
    doc.menu
        .into_iter()
        .enumerate()
        .map(|(i, record)| record_to_item(record, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_full_document() {
        let json = br#"{
            "menu": [
                {"id": 1, "title": "Greek salad", "description": "Crispy lettuce", "price": "12.99", "image": "greekSalad.jpg", "category": "starters"},
                {"id": 2, "title": "Lemon Dessert", "description": "Grandma's recipe", "price": "5.00", "image": "lemonDessert.jpg", "category": "desserts"}
            ]
        }"#;
        let items = parse_menu_document(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].title, "Greek salad");
        assert_eq!(items[0].price, "12.99");
        assert_eq!(items[1].category, "desserts");
    }

    #[test]
    fn test_parse_numeric_price_and_missing_id() {
        let json = br#"{"menu": [
            {"name": "Bruschetta", "price": 7.5, "category": "starters"},
            {"name": "Pasta", "price": 18, "category": "mains"}
        ]}"#;
        let items = parse_menu_document(json).unwrap();
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].title, "Bruschetta");
        assert_eq!(items[0].price, "7.50");
        assert_eq!(items[0].description, "");
        assert_eq!(items[1].id, 2);
        assert_eq!(items[1].price, "18.00");
    }

    #[test]
    fn test_parse_null_fields_default_to_empty() {
        let json = br#"{"menu": [{"id": 9, "title": "Soup", "description": null, "image": null}]}"#;
        let items = parse_menu_document(json).unwrap();
        assert_eq!(items[0].description, "");
        assert_eq!(items[0].image, "");
        assert_eq!(items[0].price, "");
    }

    #[test]
    fn test_parse_missing_menu_key() {
        let err = parse_menu_document(br#"{"items": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_menu_document(b"<html>502</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_record_without_title() {
        let err = parse_menu_document(br#"{"menu": [{"id": 1, "price": "1"}]}"#).unwrap_err();
        assert!(err.to_string().contains("record 1 has no title"));
    }

    #[test]
    fn test_parse_empty_menu() {
        assert!(parse_menu_document(br#"{"menu": []}"#).unwrap().is_empty());
    }
}
