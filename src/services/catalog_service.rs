//! Catalog of products, one instance per catalog kind.

use std::marker::PhantomData;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    audit::log_audit,
    confirm::{Confirmer, Preapproved},
    dto::products::{PriceInput, ProductDraft, ProductField, ProductList, SetFieldRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ImageRef, ProductId, ProductRecord},
    response::{ApiResponse, Meta},
    routes::params::CatalogKind,
    services::image_service::{self, ImageUpload},
    state::AppState,
    store::{GROUPED_PRODUCTS_SLOT, Persisted, RecordStore, UNIT_PRODUCTS_SLOT},
    validation::{FieldErrors, validated_product},
};

/// A product collection with its own slot.
pub trait Catalog: Send + Sync + 'static {
    const SLOT: &'static str;
    const LABEL: &'static str;
}

/// Equipment sold per piece ("alat satuan").
#[derive(Debug)]
pub enum UnitCatalog {}

impl Catalog for UnitCatalog {
    const SLOT: &'static str = UNIT_PRODUCTS_SLOT;
    const LABEL: &'static str = "unit items";
}

/// Equipment sold as a set ("alat kelompok").
#[derive(Debug)]
pub enum GroupedCatalog {}

impl Catalog for GroupedCatalog {
    const SLOT: &'static str = GROUPED_PRODUCTS_SLOT;
    const LABEL: &'static str = "grouped items";
}

/// Editor state: the draft being typed and its inline errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ProductForm {
    pub editing: Option<ProductId>,
    pub draft: ProductDraft,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing had that id. Still a success.
    Absent,
    Cancelled,
}

#[derive(Debug)]
pub struct CatalogService<C: Catalog> {
    store: RecordStore,
    items: Vec<ProductRecord>,
    form: ProductForm,
    catalog: PhantomData<C>,
}

impl<C: Catalog> CatalogService<C> {
    /// Reads the slot once. An absent or unreadable slot starts empty.
    pub async fn load(store: RecordStore) -> Self {
        let items: Vec<ProductRecord> = store.load(C::SLOT).await.unwrap_or_default();
        tracing::info!(catalog = C::LABEL, count = items.len(), "catalog loaded");
        Self {
            store,
            items,
            form: ProductForm::default(),
            catalog: PhantomData,
        }
    }

    pub fn list(&self) -> &[ProductRecord] {
        &self.items
    }

    pub fn get(&self, id: ProductId) -> Option<&ProductRecord> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn reset_form(&mut self) {
        self.form = ProductForm::default();
    }

    /// Changes one draft field and drops only that field's error.
    pub fn set_field(&mut self, field: ProductField, value: String) {
        let draft = &mut self.form.draft;
        match field {
            ProductField::Name => draft.name = value,
            ProductField::Description => draft.description = value,
            ProductField::Price => draft.price = PriceInput::Text(value),
            ProductField::Image => {
                draft.image = (!value.trim().is_empty()).then(|| ImageRef::from(value));
            }
        }
        self.form.errors.clear(field.as_str());
    }

    pub fn set_image(&mut self, image: ImageRef) {
        self.form.draft.image = Some(image);
        self.form.errors.clear(ProductField::Image.as_str());
    }

    fn reject_image(&mut self, errors: &FieldErrors) {
        self.form.draft.image = None;
        for (field, message) in errors.iter() {
            self.form.errors.insert(field, message);
        }
    }

    /// Loads a record into the editor. The list is left untouched.
    pub fn edit(&mut self, id: ProductId) -> AppResult<ProductDraft> {
        let record = self.get(id).ok_or(AppError::NotFound)?;
        let draft = ProductDraft::from(record);
        self.form = ProductForm {
            editing: Some(id),
            draft: draft.clone(),
            errors: FieldErrors::new(),
        };
        Ok(draft)
    }

    pub async fn add(&mut self, draft: ProductDraft) -> AppResult<Persisted<ProductRecord>> {
        let valid = match validated_product(draft.clone(), None) {
            Ok(valid) => valid,
            Err(errors) => return Err(self.keep_invalid(None, draft, errors)),
        };

        let record = ProductRecord {
            id: self.next_id(),
            name: valid.name,
            image: valid.image,
            price: valid.price,
            description: valid.description,
        };
        self.items.push(record.clone());
        let warning = self.persist().await;
        self.reset_form();

        tracing::debug!(catalog = C::LABEL, id = %record.id, "product added");
        Ok(Persisted {
            value: record,
            warning,
        })
    }

    /// Replaces the record in place. A draft without an image keeps the
    /// current one.
    pub async fn update(
        &mut self,
        id: ProductId,
        draft: ProductDraft,
    ) -> AppResult<Persisted<ProductRecord>> {
        let index = self
            .items
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::NotFound)?;

        let existing_image = self.items[index].image.clone();
        let valid = match validated_product(draft.clone(), Some(&existing_image)) {
            Ok(valid) => valid,
            Err(errors) => return Err(self.keep_invalid(Some(id), draft, errors)),
        };

        let record = ProductRecord {
            id,
            name: valid.name,
            image: valid.image,
            price: valid.price,
            description: valid.description,
        };
        self.items[index] = record.clone();
        let warning = self.persist().await;
        self.reset_form();

        tracing::debug!(catalog = C::LABEL, %id, "product updated");
        Ok(Persisted {
            value: record,
            warning,
        })
    }

    pub async fn delete(
        &mut self,
        id: ProductId,
        confirmer: &impl Confirmer,
    ) -> Persisted<DeleteOutcome> {
        if !confirmer.confirm("Are you sure you want to delete this product?") {
            return Persisted::clean(DeleteOutcome::Cancelled);
        }

        if self.form.editing == Some(id) {
            self.reset_form();
        }

        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        if self.items.len() == before {
            return Persisted::clean(DeleteOutcome::Absent);
        }

        let warning = self.persist().await;
        tracing::debug!(catalog = C::LABEL, %id, "product deleted");
        Persisted {
            value: DeleteOutcome::Deleted,
            warning,
        }
    }

    fn keep_invalid(
        &mut self,
        editing: Option<ProductId>,
        draft: ProductDraft,
        errors: FieldErrors,
    ) -> AppError {
        self.form = ProductForm {
            editing,
            draft,
            errors: errors.clone(),
        };
        AppError::Validation(errors)
    }

    /// Millisecond timestamp, bumped past the largest id if the clock has
    /// not moved on.
    fn next_id(&self) -> ProductId {
        let now = Utc::now().timestamp_millis();
        match self.items.iter().map(|p| p.id.0).max() {
            Some(max) if max >= now => ProductId(max + 1),
            _ => ProductId(now),
        }
    }

    async fn persist(&self) -> Option<String> {
        match self.store.save(C::SLOT, &self.items).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(catalog = C::LABEL, error = %err, "catalog not saved");
                Some(format!("Failed to save {}: {err}", C::LABEL))
            }
        }
    }
}

macro_rules! with_catalog {
    ($state:expr, $kind:expr, |$svc:ident| $body:expr) => {
        match $kind {
            CatalogKind::Unit => {
                #[allow(unused_mut)]
                let mut $svc = $state.unit.lock().await;
                $body
            }
            CatalogKind::Grouped => {
                #[allow(unused_mut)]
                let mut $svc = $state.grouped.lock().await;
                $body
            }
        }
    };
}

async fn audit(state: &AppState, user: &AuthUser, action: &str, kind: CatalogKind, id: ProductId) {
    if let Err(err) = log_audit(
        &state.audit,
        Some(&user.user_id),
        action,
        Some(kind.slot()),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}

pub async fn list_products(
    state: &AppState,
    kind: CatalogKind,
) -> AppResult<ApiResponse<ProductList>> {
    let items = with_catalog!(state, kind, |svc| svc.list().to_vec());
    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    kind: CatalogKind,
    id: ProductId,
) -> AppResult<ApiResponse<ProductRecord>> {
    let product = with_catalog!(state, kind, |svc| svc.get(id).cloned());
    let product = product.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    draft: ProductDraft,
) -> AppResult<ApiResponse<ProductRecord>> {
    ensure_admin(user)?;
    let persisted = with_catalog!(state, kind, |svc| svc.add(draft).await)?;
    audit(state, user, "product_create", kind, persisted.value.id).await;

    Ok(
        ApiResponse::success("Product created", persisted.value, Some(Meta::empty()))
            .with_warning(persisted.warning),
    )
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    id: ProductId,
    draft: ProductDraft,
) -> AppResult<ApiResponse<ProductRecord>> {
    ensure_admin(user)?;
    let persisted = with_catalog!(state, kind, |svc| svc.update(id, draft).await)?;
    audit(state, user, "product_update", kind, id).await;

    Ok(
        ApiResponse::success("Updated", persisted.value, Some(Meta::empty()))
            .with_warning(persisted.warning),
    )
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    id: ProductId,
    confirm: bool,
) -> AppResult<ApiResponse<DeleteOutcome>> {
    ensure_admin(user)?;
    let persisted = with_catalog!(state, kind, |svc| svc
        .delete(id, &Preapproved(confirm))
        .await);
    if persisted.value == DeleteOutcome::Deleted {
        audit(state, user, "product_delete", kind, id).await;
    }

    let message = match persisted.value {
        DeleteOutcome::Cancelled => "Cancelled",
        DeleteOutcome::Deleted | DeleteOutcome::Absent => "Deleted",
    };
    Ok(
        ApiResponse::success(message, persisted.value, Some(Meta::empty()))
            .with_warning(persisted.warning),
    )
}

pub async fn edit_product(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    id: ProductId,
) -> AppResult<ApiResponse<ProductForm>> {
    ensure_admin(user)?;
    let form = with_catalog!(state, kind, |svc| {
        svc.edit(id)?;
        svc.form().clone()
    });
    Ok(ApiResponse::success("Editing", form, None))
}

pub async fn get_form(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
) -> AppResult<ApiResponse<ProductForm>> {
    ensure_admin(user)?;
    let form = with_catalog!(state, kind, |svc| svc.form().clone());
    Ok(ApiResponse::success("Form", form, None))
}

pub async fn set_form_field(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    payload: SetFieldRequest,
) -> AppResult<ApiResponse<ProductForm>> {
    ensure_admin(user)?;
    let form = with_catalog!(state, kind, |svc| {
        svc.set_field(payload.field, payload.value);
        svc.form().clone()
    });
    Ok(ApiResponse::success("Form", form, None))
}

pub async fn reset_form(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
) -> AppResult<ApiResponse<ProductForm>> {
    ensure_admin(user)?;
    let form = with_catalog!(state, kind, |svc| {
        svc.reset_form();
        svc.form().clone()
    });
    Ok(ApiResponse::success("Form reset", form, None))
}

/// Ingests an uploaded picture into the editor's draft.
pub async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    kind: CatalogKind,
    upload: ImageUpload<'_>,
) -> AppResult<ApiResponse<ImageRef>> {
    ensure_admin(user)?;
    let ingested = image_service::ingest(upload);
    with_catalog!(state, kind, |svc| match &ingested {
        Ok(image) => svc.set_image(image.clone()),
        Err(errors) => svc.reject_image(errors),
    });
    let image = ingested.map_err(AppError::Validation)?;
    Ok(ApiResponse::success("Image ready", image, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn widget() -> ProductDraft {
        ProductDraft {
            name: "Widget".into(),
            image: Some(ImageRef::Url("http://x/img.png".into())),
            price: 1000.0.into(),
            description: "basic".into(),
        }
    }

    #[tokio::test]
    async fn add_assigns_increasing_ids() {
        let mut svc = CatalogService::<UnitCatalog>::load(RecordStore::memory()).await;
        let a = svc.add(widget()).await.unwrap().value;
        let b = svc.add(widget()).await.unwrap().value;
        assert!(b.id > a.id);
        assert_eq!(svc.list().len(), 2);
    }

    #[tokio::test]
    async fn failed_add_keeps_draft_and_errors_in_form() {
        let mut svc = CatalogService::<GroupedCatalog>::load(RecordStore::memory()).await;
        let mut draft = widget();
        draft.price = (-5.0).into();

        let err = svc.add(draft.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains("price")));
        assert!(svc.list().is_empty());
        assert_eq!(svc.form().draft, draft);

        svc.set_field(ProductField::Price, "2500".into());
        assert!(svc.form().errors.is_empty());
    }

    #[tokio::test]
    async fn deleting_the_record_under_edit_resets_the_form() {
        let mut svc = CatalogService::<UnitCatalog>::load(RecordStore::memory()).await;
        let id = svc.add(widget()).await.unwrap().value.id;
        svc.edit(id).unwrap();
        assert_eq!(svc.form().editing, Some(id));

        let outcome = svc.delete(id, &|_: &str| true).await;
        assert_eq!(outcome.value, DeleteOutcome::Deleted);
        assert_eq!(svc.form(), &ProductForm::default());
    }

    #[tokio::test]
    async fn declined_confirmation_changes_nothing() {
        let mut svc = CatalogService::<UnitCatalog>::load(RecordStore::memory()).await;
        let id = svc.add(widget()).await.unwrap().value.id;
        let outcome = svc.delete(id, &Preapproved(false)).await;
        assert_eq!(outcome.value, DeleteOutcome::Cancelled);
        assert_eq!(svc.list().len(), 1);
    }

    #[tokio::test]
    async fn full_store_warns_but_keeps_the_change() {
        let store = RecordStore::new(MemoryStore::with_quota(8));
        let mut svc = CatalogService::<UnitCatalog>::load(store.clone()).await;

        let persisted = svc.add(widget()).await.unwrap();
        assert!(persisted.warning.is_some());
        assert_eq!(svc.list().len(), 1);
        assert!(store.load::<ProductRecord>(UnitCatalog::SLOT).await.is_none());
    }

    #[tokio::test]
    async fn oversized_upload_sets_an_inline_image_error() {
        let mut svc = CatalogService::<UnitCatalog>::load(RecordStore::memory()).await;
        svc.set_image(ImageRef::Url("http://x/old.png".into()));

        let bytes = vec![0u8; image_service::MAX_IMAGE_BYTES + 1];
        let errors = image_service::ingest(ImageUpload {
            content_type: "image/png",
            bytes: &bytes,
        })
        .unwrap_err();
        svc.reject_image(&errors);

        assert!(svc.form().errors.contains("image"));
        assert!(svc.form().draft.image.is_none());
    }
}
