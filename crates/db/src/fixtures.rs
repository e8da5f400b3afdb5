use tracing::info;

use catalog_core::domain::category::{CategoryId, NewCategory};
use catalog_core::domain::numeric::NumericInput;
use catalog_core::domain::product::NewProduct;

use crate::store::{CatalogStore, StoreError};

/// Demo catalog of a small music shop, used by the server at startup and by the CLI.
const SEED_CATEGORIES: &[SeedCategory] = &[
    SeedCategory { name: "Guitars", description: "Electric, acoustic and bass guitars" },
    SeedCategory { name: "Keyboards", description: "Pianos, synthesizers, MIDI keyboards" },
    SeedCategory { name: "Drums", description: "Drum kits and percussion" },
    SeedCategory { name: "Audio", description: "Microphones, headphones, audio interfaces" },
    SeedCategory { name: "Amplifiers", description: "Guitar and bass amplifiers" },
    SeedCategory { name: "Strings", description: "Violins, violas, cellos, ukuleles" },
    SeedCategory { name: "Winds", description: "Trumpets, saxophones, flutes" },
];

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category: 0,
        name: "Fender Stratocaster",
        description: "Classic electric guitar with three single-coil pickups",
        price: "89990",
        stock: 8,
        rating: "4.9",
        image: "/images/electric-guitar.jpg",
    },
    SeedProduct {
        category: 1,
        name: "Yamaha P-125",
        description: "Digital piano with 88 weighted keys",
        price: "65000",
        stock: 5,
        rating: "4.8",
        image: "/images/electric-piano.jpg",
    },
    SeedProduct {
        category: 2,
        name: "Tama Imperialstar",
        description: "Five-piece acoustic drum kit with cymbals",
        price: "120000",
        stock: 3,
        rating: "4.7",
        image: "/images/baraban.jpg",
    },
    SeedProduct {
        category: 1,
        name: "Korg Minilogue XD",
        description: "Four-voice analog polyphonic synthesizer",
        price: "78500",
        stock: 6,
        rating: "4.9",
        image: "/images/synthesizer.jpg",
    },
    SeedProduct {
        category: 0,
        name: "Ibanez SR300E",
        description: "Four-string bass guitar with active electronics",
        price: "42000",
        stock: 12,
        rating: "4.6",
        image: "/images/bas-guitar.jpg",
    },
    SeedProduct {
        category: 3,
        name: "Shure SM58",
        description: "Dynamic vocal microphone",
        price: "9500",
        stock: 25,
        rating: "5.0",
        image: "/images/microphone.jpg",
    },
    SeedProduct {
        category: 3,
        name: "Audio-Technica ATH-M50x",
        description: "Closed-back studio monitor headphones",
        price: "14500",
        stock: 30,
        rating: "4.8",
        image: "/images/headphones.jpg",
    },
    SeedProduct {
        category: 4,
        name: "Fender Champion 40",
        description: "40 W combo guitar amplifier with built-in effects",
        price: "28000",
        stock: 10,
        rating: "4.7",
        image: "/images/guitar-amplifier.jpg",
    },
    SeedProduct {
        category: 5,
        name: "Stentor Student II",
        description: "Full-size violin outfit with bow and case",
        price: "24500",
        stock: 6,
        rating: "4.4",
        image: "/images/violin.jpg",
    },
    SeedProduct {
        category: 6,
        name: "Bach TR300H2",
        description: "Student B-flat trumpet",
        price: "30900",
        stock: 4,
        rating: "4.9",
        image: "/images/flute.jpg",
    },
];

struct SeedCategory {
    name: &'static str,
    description: &'static str,
}

struct SeedProduct {
    category: usize,
    name: &'static str,
    description: &'static str,
    price: &'static str,
    stock: i64,
    rating: &'static str,
    image: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub categories_seeded: Vec<CategoryId>,
    pub products_seeded: usize,
}

/// Loads the demo catalog through the regular create operations, so every invariant the store
/// enforces also holds for seeded data.
pub async fn seed_demo_catalog(store: &CatalogStore) -> Result<SeedResult, StoreError> {
    let mut categories_seeded = Vec::with_capacity(SEED_CATEGORIES.len());
    for seed in SEED_CATEGORIES {
        let category = store
            .create_category(NewCategory::named(seed.name).with_description(seed.description))
            .await?;
        categories_seeded.push(category.id);
    }

    let mut products_seeded = 0;
    for seed in SEED_PRODUCTS {
        let Some(category_id) = categories_seeded.get(seed.category) else {
            continue;
        };
        store
            .create_product(NewProduct {
                description: Some(seed.description.to_owned()),
                stock: Some(NumericInput::from(seed.stock)),
                rating: Some(NumericInput::from(seed.rating)),
                image: Some(seed.image.to_owned()),
                ..NewProduct::new(seed.name, category_id, seed.price)
            })
            .await?;
        products_seeded += 1;
    }

    info!(
        event_name = "catalog.seed.loaded",
        categories = categories_seeded.len(),
        products = products_seeded,
        "demo catalog loaded"
    );
    Ok(SeedResult { categories_seeded, products_seeded })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use catalog_core::domain::category::CategoryId;
    use catalog_core::ids::SequentialIdGenerator;

    use super::{seed_demo_catalog, SEED_CATEGORIES, SEED_PRODUCTS};
    use crate::store::{CatalogCounts, CatalogStore};

    #[test]
    fn seed_products_point_at_known_categories() {
        assert!(SEED_PRODUCTS.iter().all(|product| product.category < SEED_CATEGORIES.len()));
    }

    #[tokio::test]
    async fn seeding_loads_every_record_with_integrity() {
        let store = CatalogStore::new(Arc::new(SequentialIdGenerator::default()));

        let result = seed_demo_catalog(&store).await.expect("seed");

        assert_eq!(result.categories_seeded.len(), 7);
        assert_eq!(result.products_seeded, 10);
        assert_eq!(store.counts().await, CatalogCounts { categories: 7, products: 10 });
        assert!(store.dangling_products().await.is_empty());
    }

    #[tokio::test]
    async fn seeded_guitars_metrics_match_their_products() {
        let store = CatalogStore::new(Arc::new(SequentialIdGenerator::default()));
        seed_demo_catalog(&store).await.expect("seed");

        let guitars = CategoryId("C1".to_string());
        let view = store.get_category_with_products(&guitars).await.expect("guitars");

        assert_eq!(view.category.name, "Guitars");
        assert_eq!(view.metrics.total_products, 2);
        assert_eq!(view.metrics.total_stock, 20);
        assert_eq!(view.metrics.avg_rating, Decimal::new(475, 2));
        assert_eq!(view.metrics.min_price, Decimal::new(42000, 0));
        assert_eq!(view.metrics.max_price, Decimal::new(89990, 0));
    }
}
