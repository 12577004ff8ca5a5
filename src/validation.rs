//! Field-level checks for drafts.
//!
//! Every check produces a [`FieldErrors`] map keyed by field name. A draft may
//! be submitted exactly when its map is empty.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{payments::PaymentDraft, products::ProductDraft},
    models::ImageRef,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Drops the error of a single field, leaving the others in place.
    pub fn clear(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A catalog draft that passed [`validate_product`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    pub name: String,
    pub image: ImageRef,
    pub price: f64,
    pub description: String,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `existing_image` is the picture of the record being edited, if any. It
/// exempts the draft from supplying a new one.
pub fn validate_product(draft: &ProductDraft, existing_image: Option<&ImageRef>) -> FieldErrors {
    check_product(draft, existing_image).1
}

/// Validates and converts in one step. A missing image falls back to
/// `existing_image`.
pub fn validated_product(
    draft: ProductDraft,
    existing_image: Option<&ImageRef>,
) -> Result<ValidProduct, FieldErrors> {
    match check_product(&draft, existing_image) {
        (Some((image, price)), errors) if errors.is_empty() => Ok(ValidProduct {
            name: draft.name,
            image,
            price,
            description: draft.description,
        }),
        (_, errors) => Err(errors),
    }
}

/// Picks the image and parses the price once; the errors are derived from
/// those same results.
fn check_product(
    draft: &ProductDraft,
    existing_image: Option<&ImageRef>,
) -> (Option<(ImageRef, f64)>, FieldErrors) {
    let mut errors = FieldErrors::new();

    if is_blank(&draft.name) {
        errors.insert("name", "Product name is required.");
    }

    let image = draft
        .image
        .as_ref()
        .filter(|image| !image.is_blank())
        .or(existing_image.filter(|image| !image.is_blank()))
        .cloned();
    if image.is_none() {
        errors.insert("image", "Product image is required.");
    }

    let price = draft.price.parse().filter(|price| *price > 0.0);
    if price.is_none() {
        errors.insert("price", "Price must be a positive number.");
    }

    if is_blank(&draft.description) {
        errors.insert("description", "Description is required.");
    }

    (image.zip(price), errors)
}

pub fn validate_payment(draft: &PaymentDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&draft.buyer_name) {
        errors.insert("buyer_name", "Buyer name is required.");
    }

    if draft.items.is_empty() {
        errors.insert("items", "At least one item is required.");
    }

    for (index, item) in draft.items.iter().enumerate() {
        if is_blank(&item.name) {
            errors.insert(format!("items[{index}].name"), "Item name is required.");
        }
        if item.qty <= 0 || item.qty > i64::from(u32::MAX) {
            errors.insert(
                format!("items[{index}].qty"),
                "Quantity must be a positive whole number.",
            );
        }
        if !item.price.is_finite() || item.price < 0.0 {
            errors.insert(
                format!("items[{index}].price"),
                "Price must not be negative.",
            );
        }
    }

    errors
}
