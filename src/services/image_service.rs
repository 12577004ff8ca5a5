use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{models::ImageRef, validation::FieldErrors};

/// Largest accepted source picture, 2 MiB.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct ImageUpload<'a> {
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Encodes raw bytes as a `data:` URL.
pub fn read_as_inline_data(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Size and type gate in front of [`read_as_inline_data`].
pub fn ingest(upload: ImageUpload<'_>) -> Result<ImageRef, FieldErrors> {
    let mut errors = FieldErrors::new();

    if upload.bytes.len() > MAX_IMAGE_BYTES {
        errors.insert("image", "Image must be at most 2MB.");
        return Err(errors);
    }
    let content_type = upload.content_type.trim();
    if !content_type.starts_with("image/") {
        errors.insert("image", "File must be an image.");
        return Err(errors);
    }
    if upload.bytes.is_empty() {
        errors.insert("image", "Product image is required.");
        return Err(errors);
    }

    Ok(ImageRef::Inline(read_as_inline_data(content_type, upload.bytes)))
}
