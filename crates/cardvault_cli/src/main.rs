//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `cardvault_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use cardvault_core::{compute_stats, CardRepository, MemoryStore};

fn main() {
    println!("cardvault_core version={}", cardvault_core::core_version());

    let mut repo = CardRepository::new(MemoryStore::new());
    match repo.create("Smoke", "data:image/png;base64,AAA") {
        Ok(card) => println!("created id={}", card.id),
        Err(err) => {
            eprintln!("create failed: {err}");
            std::process::exit(1);
        }
    }

    match repo.read_all() {
        Ok(cards) => {
            let stats = compute_stats(&cards);
            println!(
                "cards={} visible={} serialized_bytes={}",
                stats.card_count, stats.visible_count, stats.serialized_size
            );
        }
        Err(err) => {
            eprintln!("read failed: {err}");
            std::process::exit(1);
        }
    }
}
