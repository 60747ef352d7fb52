use crate::models::NewProduct;
use crate::storage::CatalogStore;

fn demo_product(title: &str, description: &str, price: f64, code: &str, stock: i64) -> NewProduct {
    NewProduct {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        price: Some(price),
        thumbnail: Some(format!("/img/{}.png", code.to_ascii_lowercase())),
        code: Some(code.to_string()),
        stock: Some(stock),
    }
}

/// Fills an empty catalog with a few demo products. Returns how many were inserted.
pub async fn seed_demo_products(catalog: &dyn CatalogStore) -> anyhow::Result<usize> {
    if !catalog.get_products().await?.is_empty() {
        tracing::info!("Catalog already has data, skipping seed");
        return Ok(0);
    }

    let products = [
        demo_product("Mate", "Calabaza de madera", 2500.0, "MATE01", 12),
        demo_product("Bombilla", "Bombilla de acero inoxidable", 1200.0, "BOMB01", 30),
        demo_product("Yerba", "Yerba mate 1kg", 1800.0, "YERB01", 50),
    ];
    let count = products.len();
    for product in products {
        catalog.add_product(product).await?;
    }

    tracing::info!("Seeded {} demo products", count);
    Ok(count)
}
