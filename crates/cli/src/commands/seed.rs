//! Seed the database with a demo company, store and menu.
//!
//! ```bash
//! mh-cli seed
//! ```
//!
//! Records are built from the same JSON bodies the API accepts, so the demo
//! data passes the same validation. Running the command twice is a no-op.

use serde_json::{Value, json};

use menuhub_core::Slug;
use menuhub_server::db::{AddonRepository, CompanyRepository, MenuRepository, StoreRepository};
use menuhub_server::models::addon::{NewAddon, NewAddonGroup};
use menuhub_server::models::company::NewCompany;
use menuhub_server::models::menu::{NewProduct, NewSection};
use menuhub_server::models::store::NewStore;

use super::{CommandError, connect};

/// Slug of the demo store.
pub const DEMO_SLUG: &str = "pizzaria-centro";

/// A section and the products listed under it.
struct SeedSection {
    section: Value,
    products: Vec<Value>,
}

fn demo_menu() -> Vec<SeedSection> {
    vec![
        SeedSection {
            section: json!({"name": "Pizzas", "description": "Massa de fermentação natural"}),
            products: vec![
                json!({"name": "Margherita", "price": "42.00", "tags": ["vegetariana"]}),
                json!({
                    "name": "Calabresa",
                    "price": "39.90",
                    "originalPrice": "46.90",
                    "isPromotion": true
                }),
                json!({"name": "Quatro Queijos", "price": "48.50", "allergens": ["lactose"]}),
            ],
        },
        SeedSection {
            section: json!({"name": "Bebidas"}),
            products: vec![
                json!({"name": "Refrigerante lata", "price": "6.00", "preparationTime": "imediato"}),
                json!({"name": "Suco natural", "price": "9.50"}),
            ],
        },
        SeedSection {
            section: json!({"name": "Sobremesas"}),
            products: vec![json!({"name": "Pizza de chocolate", "price": "36.00"})],
        },
    ]
}

/// Insert the demo data unless the demo store already exists.
///
/// # Errors
///
/// Returns `CommandError` if a seed record is invalid or a write fails.
pub async fn demo() -> Result<(), CommandError> {
    let pool = connect().await?;
    let slug = Slug::parse(DEMO_SLUG).map_err(|e| CommandError::Input(e.to_string()))?;

    if StoreRepository::new(&pool).get_by_slug(&slug).await?.is_some() {
        tracing::info!(slug = DEMO_SLUG, "Demo store already exists, nothing to do");
        return Ok(());
    }

    let company: NewCompany = serde_json::from_value(json!({
        "name": "Grupo Sabor",
        "description": "Restaurantes de bairro",
        "phone": "(11) 3333-4444"
    }))?;
    let company = CompanyRepository::new(&pool)
        .create(&company.normalized()?)
        .await?;

    let store: NewStore = serde_json::from_value(json!({
        "name": "Pizzaria Centro",
        "companyId": company.id,
        "slug": DEMO_SLUG,
        "address": "Rua Augusta, 100 - São Paulo",
        "phone": "(11) 98888-7777",
        "deliveryFee": "5.00",
        "minimumOrder": "25.00",
        "openingHours": {"mon-fri": "18:00-23:00", "sat-sun": "18:00-00:00"}
    }))?;
    let store = StoreRepository::new(&pool).create(&store.validated()?).await?;

    let menu = MenuRepository::new(&pool);
    let addons = AddonRepository::new(&pool);
    let mut product_count = 0_usize;

    for seed in demo_menu() {
        let section: NewSection = serde_json::from_value(seed.section)?;
        let section = menu.create_section(store.id, &section.normalized()?).await?;

        for mut product in seed.products {
            product["sectionId"] = json!(section.id);
            let product: NewProduct = serde_json::from_value(product)?;
            let product = menu
                .create_product(store.id, &product.validated()?)
                .await?;
            product_count += 1;

            if section.name == "Pizzas" {
                seed_pizza_addons(&addons, &product).await?;
            }
        }
    }

    tracing::info!(
        company_id = %company.id,
        store_id = %store.id,
        products = product_count,
        "Demo data created; public menu at /api/menu/{DEMO_SLUG}"
    );
    Ok(())
}

async fn seed_pizza_addons(
    addons: &AddonRepository<'_>,
    product: &menuhub_server::models::menu::MenuProduct,
) -> Result<(), CommandError> {
    let crust: NewAddonGroup = serde_json::from_value(json!({
        "name": "Borda",
        "isRequired": true,
        "minSelections": 1,
        "maxSelections": 1
    }))?;
    let crust = addons.create_group(product.id, &crust.normalized()?).await?;
    for option in [
        json!({"name": "Tradicional"}),
        json!({"name": "Catupiry", "price": "8.00"}),
        json!({"name": "Cheddar", "price": "8.00"}),
    ] {
        let option: NewAddon = serde_json::from_value(option)?;
        addons.create_addon(crust.id, &option.normalized()?).await?;
    }

    let extras: NewAddonGroup = serde_json::from_value(json!({
        "name": "Adicionais",
        "maxSelections": 3
    }))?;
    let extras = addons
        .create_group(product.id, &extras.normalized()?)
        .await?;
    for option in [
        json!({"name": "Bacon", "price": "6.00"}),
        json!({"name": "Azeitona", "price": "3.00"}),
        json!({"name": "Cebola caramelizada", "price": "4.50"}),
    ] {
        let option: NewAddon = serde_json::from_value(option)?;
        addons.create_addon(extras.id, &option.normalized()?).await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_menu_records_validate() {
        for seed in demo_menu() {
            let section: NewSection = serde_json::from_value(seed.section).unwrap();
            section.normalized().unwrap();
            for mut product in seed.products {
                product["sectionId"] = json!(1);
                let product: NewProduct = serde_json::from_value(product).unwrap();
                product.validated().unwrap();
            }
        }
    }

    #[test]
    fn test_demo_slug_is_valid() {
        assert!(Slug::parse(DEMO_SLUG).is_ok());
    }
}
