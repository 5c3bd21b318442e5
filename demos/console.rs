//! Runs the notifier against the in-memory transport and prints what it sends.
//!
//! ```text
//! cargo run --example console
//! ```

use std::sync::Arc;
use std::time::Duration;

use emoji_notifier::{
    Asset, Config, LogWriter, MemoryDelivery, MemoryStore, Notifier, Subscribe,
    logging::{LoggingConfig, init_logging},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    let mut cfg = Config::with_token("demo-token");
    cfg.notify_window = Duration::from_secs(1);

    let delivery = Arc::new(MemoryDelivery::new());
    delivery.add_tenant("g1", "Demo Guild").await;
    delivery.add_tenant("g2", "Quiet Guild").await;
    delivery.add_destination("general").await;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let notifier = Notifier::builder(cfg)
        .with_subscribers(subs)
        .with_store(Arc::new(MemoryStore::new()))
        .build(delivery.clone())
        .await?;

    let existing = vec![Asset::new("100", "wave")];
    notifier.backfill("g1", existing.clone()).await?;
    notifier.backfill("g2", Vec::new()).await?;

    let router = notifier.commands();
    println!("> register: {}", router.handle("register", "g1", "general").await);
    println!("> register: {}", router.handle("register", "g2", "nowhere").await);

    let ingestor = notifier.ingestor();
    let mut listing = existing;
    listing.push(Asset::new("101", "partyparrot").animated());
    ingestor.observe("g1", listing.clone()).await?;
    listing.push(Asset::new("102", "shipit"));
    ingestor.observe("g1", listing).await?;
    ingestor.observe("g2", vec![Asset::new("200", "lost")]).await?;

    let report = notifier
        .run_until(tokio::time::sleep(Duration::from_millis(1500)))
        .await?;

    for (destination, summary) in delivery.sent().await {
        println!("\n#{destination} | {} | {}", summary.title, summary.footer);
        println!("{}", summary.description());
    }
    println!("\nknown assets in g1: {}", report.registry.len("g1"));
    Ok(())
}
