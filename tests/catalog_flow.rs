use std::sync::Arc;

use admin_panel_api::{
    dto::products::ProductDraft,
    error::AppError,
    middleware::auth::{AuthSettings, AuthUser},
    models::{ImageRef, ProductRecord},
    receipt::UnavailableExporter,
    routes::params::CatalogKind,
    services::catalog_service::{self, CatalogService, DeleteOutcome, UnitCatalog},
    state::AppState,
    store::{GROUPED_PRODUCTS_SLOT, MemoryStore, RecordStore, UNIT_PRODUCTS_SLOT},
};

fn admin() -> AuthUser {
    AuthUser {
        user_id: "admin@example.com".into(),
        role: "admin".into(),
    }
}

fn settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".into(),
        admin_email: "admin@example.com".into(),
        admin_password_hash: String::new(),
    }
}

async fn state_with(store: RecordStore) -> AppState {
    AppState::load(store, Arc::new(UnavailableExporter), settings()).await
}

fn draft(name: &str, price: f64) -> ProductDraft {
    ProductDraft {
        name: name.into(),
        image: Some(ImageRef::Url(format!("http://x/{name}.png"))),
        price: price.into(),
        description: format!("{name} description"),
    }
}

#[tokio::test]
async fn added_products_survive_a_reload() -> anyhow::Result<()> {
    let store = RecordStore::memory();
    let state = state_with(store.clone()).await;
    let user = admin();

    let drill = catalog_service::create_product(&state, &user, CatalogKind::Unit, draft("Drill", 450000.0))
        .await?
        .data
        .expect("created product");
    let before = CatalogService::<UnitCatalog>::load(store.clone()).await;
    assert_eq!(before.list().len(), 1);

    let saw_draft = draft("Saw", 125000.0);
    let saw = catalog_service::create_product(&state, &user, CatalogKind::Unit, saw_draft.clone())
        .await?
        .data
        .expect("created product");

    let reloaded = CatalogService::<UnitCatalog>::load(store.clone()).await;
    assert_eq!(reloaded.list().len(), before.list().len() + 1);
    assert_ne!(saw.id, drill.id);

    let added: Vec<&ProductRecord> = reloaded
        .list()
        .iter()
        .filter(|p| !before.list().iter().any(|old| old.id == p.id))
        .collect();
    let expected = ProductRecord {
        id: saw.id,
        name: saw_draft.name,
        image: saw_draft.image.expect("draft image"),
        price: 125000.0,
        description: saw_draft.description,
    };
    assert_eq!(added, [&expected]);
    assert_eq!(reloaded.list()[0], drill);

    // The other catalog has its own slot.
    assert!(store.load::<ProductRecord>(GROUPED_PRODUCTS_SLOT).await.is_none());
    Ok(())
}

#[tokio::test]
async fn update_keeps_position_and_image_when_left_blank() -> anyhow::Result<()> {
    let state = state_with(RecordStore::memory()).await;
    let user = admin();

    let first = catalog_service::create_product(&state, &user, CatalogKind::Unit, draft("Widget", 1000.0))
        .await?
        .data
        .expect("created product");
    catalog_service::create_product(&state, &user, CatalogKind::Unit, draft("Gadget", 2000.0))
        .await?;

    let mut edit = draft("Widget Pro", 1500.0);
    edit.image = None;
    let updated = catalog_service::update_product(&state, &user, CatalogKind::Unit, first.id, edit)
        .await?
        .data
        .expect("updated product");

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.image, first.image);
    assert_eq!(updated.price, 1500.0);

    let list = catalog_service::list_products(&state, CatalogKind::Unit)
        .await?
        .data
        .expect("product list");
    assert_eq!(list.items[0].name, "Widget Pro");
    assert_eq!(list.items[1].name, "Gadget");
    Ok(())
}

#[tokio::test]
async fn new_product_without_image_is_rejected() -> anyhow::Result<()> {
    let state = state_with(RecordStore::memory()).await;
    let mut missing = draft("Widget", 1000.0);
    missing.image = None;

    let err = catalog_service::create_product(&state, &admin(), CatalogKind::Unit, missing)
        .await
        .unwrap_err();
    match err {
        AppError::Validation(errors) => {
            assert_eq!(errors.get("image"), Some("Product image is required."));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn negative_price_on_grouped_item_leaves_list_unchanged() -> anyhow::Result<()> {
    let state = state_with(RecordStore::memory()).await;
    let user = admin();

    let err = catalog_service::create_product(&state, &user, CatalogKind::Grouped, draft("Set", -5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.len() == 1 && e.contains("price")));

    let list = catalog_service::list_products(&state, CatalogKind::Grouped)
        .await?
        .data
        .expect("product list");
    assert!(list.items.is_empty());

    let form = catalog_service::get_form(&state, &user, CatalogKind::Grouped)
        .await?
        .data
        .expect("form");
    assert_eq!(form.draft.name, "Set");
    assert!(form.errors.contains("price"));
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> anyhow::Result<()> {
    let state = state_with(RecordStore::memory()).await;
    let user = admin();
    let product = catalog_service::create_product(&state, &user, CatalogKind::Unit, draft("Widget", 1000.0))
        .await?
        .data
        .expect("created product");

    let first = catalog_service::delete_product(&state, &user, CatalogKind::Unit, product.id, true)
        .await?;
    assert_eq!(first.data, Some(DeleteOutcome::Deleted));

    let second = catalog_service::delete_product(&state, &user, CatalogKind::Unit, product.id, true)
        .await?;
    assert_eq!(second.data, Some(DeleteOutcome::Absent));
    Ok(())
}

#[tokio::test]
async fn unconfirmed_delete_keeps_the_product() -> anyhow::Result<()> {
    let state = state_with(RecordStore::memory()).await;
    let user = admin();
    let product = catalog_service::create_product(&state, &user, CatalogKind::Unit, draft("Widget", 1000.0))
        .await?
        .data
        .expect("created product");

    let resp = catalog_service::delete_product(&state, &user, CatalogKind::Unit, product.id, false)
        .await?;
    assert_eq!(resp.data, Some(DeleteOutcome::Cancelled));
    assert!(catalog_service::get_product(&state, CatalogKind::Unit, product.id).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn full_store_reports_a_warning_and_keeps_the_product() -> anyhow::Result<()> {
    let store = RecordStore::new(MemoryStore::with_quota(16));
    let state = state_with(store.clone()).await;

    let resp = catalog_service::create_product(&state, &admin(), CatalogKind::Unit, draft("Widget", 1000.0))
        .await?;
    assert!(resp.warning.is_some());

    let list = catalog_service::list_products(&state, CatalogKind::Unit)
        .await?
        .data
        .expect("product list");
    assert_eq!(list.items.len(), 1);
    assert!(store.load::<ProductRecord>(UNIT_PRODUCTS_SLOT).await.is_none());
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_create() {
    let state = state_with(RecordStore::memory()).await;
    let user = AuthUser {
        user_id: "someone".into(),
        role: "user".into(),
    };
    let err = catalog_service::create_product(&state, &user, CatalogKind::Unit, draft("Widget", 1000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}
