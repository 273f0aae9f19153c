//! Catalog server.
//!
//! ```text
//! catalog --bind 0.0.0.0:3000 --image-dir public/images --seed
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_catalog::config::Config;
use shop_catalog::{http, seed, Catalog, InMemoryDocumentStore, LocalFileStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    std::fs::create_dir_all(&config.image_dir).with_context(|| {
        format!("could not create image directory {}", config.image_dir.display())
    })?;

    let catalog = Catalog::new(
        InMemoryDocumentStore::new(),
        LocalFileStorage::new(),
        config.image_dir.clone(),
    );

    if config.seed {
        seed::populate(&catalog).context("could not seed the catalog")?;
    }

    http::serve(Arc::new(catalog), config.bind, config.max_upload)
        .await
        .context("server error")?;
    Ok(())
}
