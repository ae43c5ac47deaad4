//! # Seed Cart
//!
//! Writes a sample cart into the configured database for development.
//!
//! ## Usage
//! ```bash
//! # Use the default config (cart.toml / MARKET_* env vars)
//! cargo run -p market-cart --bin seed
//!
//! # Specify database path
//! cargo run -p market-cart --bin seed -- --db ./data/market.db
//!
//! # Start from an empty cart
//! cargo run -p market-cart --bin seed -- --reset
//! ```

use std::env;
use std::path::PathBuf;

use market_cart::{init_tracing, AddRequest, CartConfig, CartStore};

/// Sample catalogue: (id, title, image, price)
const PRODUCTS: &[(&str, &str, &str, f64)] = &[
    (
        "1234",
        "Camiseta Hello World",
        "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-gomarketplace/camiseta-hello-world.png",
        120.0,
    ),
    (
        "5678",
        "Camiseta Ruby on Rails",
        "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-gomarketplace/camiseta-ruby-on-rails.png",
        120.0,
    ),
    (
        "9012",
        "Camiseta Node.js",
        "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-gomarketplace/camiseta-nodejs.png",
        110.0,
    ),
    (
        "3456",
        "Camiseta React Native",
        "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-gomarketplace/camiseta-react-native.png",
        90.0,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = CartConfig::load(None)?;
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--reset" => reset = true,
            _ => {}
        }
        i += 1;
    }

    println!("🛒 GoMarketplace Cart Seeder");
    println!("   Database: {}", config.database_path.display());
    println!("   Key:      {}", config.storage_key);
    println!();

    let store = CartStore::open(&config).await?;
    let hydration = store.hydrated().await;
    println!("  Hydration: {:?} ({} items)", hydration, store.products().len());

    if reset {
        store.clear();
    }

    for (index, (id, title, image_url, price)) in PRODUCTS.iter().enumerate() {
        let request = AddRequest::new(*id, *title, *image_url, *price);
        // One of the first, two of the second, ...
        for _ in 0..=index {
            store.add_to_cart(&request);
        }
    }

    store.flush().await?;

    println!();
    for item in store.products() {
        println!("  {:>3} × {} ({:.2})", item.quantity, item.title, item.price);
    }

    store.shutdown().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
