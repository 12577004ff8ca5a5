use admin_panel_api::{
    config::StoreSettings,
    models::{ImageRef, ProductId, ProductRecord},
    services::{auth_service::hash_password, payment_service::default_payments},
    store::{self, GROUPED_PRODUCTS_SLOT, PAYMENTS_SLOT, UNIT_PRODUCTS_SLOT},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = StoreSettings::from_env()?;
    let store = store::open(&settings).await?;

    let payments = default_payments();
    store.save(PAYMENTS_SLOT, &payments).await?;
    store.save(UNIT_PRODUCTS_SLOT, &unit_products()).await?;
    store.save(GROUPED_PRODUCTS_SLOT, &grouped_products()).await?;
    println!("Seed completed. {} payments written.", payments.len());

    // Prints a line ready to paste into .env.
    if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
        let hash = hash_password(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        println!("ADMIN_PASSWORD_HASH={hash}");
    }
    Ok(())
}

fn product(id: i64, name: &str, image: &str, price: f64, description: &str) -> ProductRecord {
    ProductRecord {
        id: ProductId(id),
        name: name.into(),
        image: ImageRef::Url(image.into()),
        price,
        description: description.into(),
    }
}

fn unit_products() -> Vec<ProductRecord> {
    vec![
        product(
            1,
            "Cordless Drill",
            "https://picsum.photos/seed/drill/400/300",
            450000.0,
            "18V drill with two batteries.",
        ),
        product(
            2,
            "Angle Grinder",
            "https://picsum.photos/seed/grinder/400/300",
            325000.0,
            "100mm grinder for cutting and polishing.",
        ),
    ]
}

fn grouped_products() -> Vec<ProductRecord> {
    vec![product(
        1,
        "Carpentry Set",
        "https://picsum.photos/seed/carpentry/400/300",
        1250000.0,
        "Saw, chisels, hammer and clamps in one case.",
    )]
}
