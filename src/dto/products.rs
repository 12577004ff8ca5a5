use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{ImageRef, ProductRecord};

/// Price as typed into a form: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl Default for PriceInput {
    fn default() -> Self {
        PriceInput::Text(String::new())
    }
}

impl PriceInput {
    /// The parsed value, if it is a finite number.
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

/// Unvalidated catalog item captured from the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub price: PriceInput,
    #[serde(default)]
    pub description: String,
}

impl From<&ProductRecord> for ProductDraft {
    fn from(record: &ProductRecord) -> Self {
        Self {
            name: record.name.clone(),
            image: Some(record.image.clone()),
            price: PriceInput::Number(record.price),
            description: record.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Name,
    Image,
    Price,
    Description,
}

impl ProductField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Image => "image",
            ProductField::Price => "price",
            ProductField::Description => "description",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetFieldRequest {
    pub field: ProductField,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_accepts_numbers_and_numeric_text() {
        let draft: ProductDraft =
            serde_json::from_str(r#"{"name":"a","price":"1500.5","description":"d"}"#).unwrap();
        assert_eq!(draft.price.parse(), Some(1500.5));

        let draft: ProductDraft = serde_json::from_str(r#"{"price":1000}"#).unwrap();
        assert_eq!(draft.price.parse(), Some(1000.0));
        assert!(draft.image.is_none());
    }

    #[test]
    fn price_rejects_text_that_is_not_a_number() {
        assert_eq!(PriceInput::Text("abc".into()).parse(), None);
        assert_eq!(PriceInput::Text(String::new()).parse(), None);
        assert_eq!(PriceInput::Text("NaN".into()).parse(), None);
    }
}
