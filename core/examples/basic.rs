//! Basic breaker group usage example

use adaptive_breaker::{BreakerGroup, CallError, DefaultClassifier};
use std::io;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Adaptive Breaker Basic Example ===\n");

    let group = BreakerGroup::builder()
        .on_open(|name| println!("🔴 Breaker '{}' is shedding load", name))
        .on_close(|name| println!("🟢 Breaker '{}' recovered", name))
        .build();

    let key = "http://payments:8080";

    // Simulate successful calls
    println!("--- Successful calls ---");
    for i in 1..=100 {
        let _ = group.call(key, move || Ok::<_, io::Error>(i), DefaultClassifier);
    }
    println!("Stats: {:?}\n", group.get(key).stats());

    // Simulate an outage
    println!("--- Downstream outage ---");
    let mut shed = 0;
    let mut failed = 0;
    for _ in 0..1000 {
        match group.call(
            key,
            || Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionRefused)),
            DefaultClassifier,
        ) {
            Ok(()) => {}
            Err(CallError::Unavailable(_)) => shed += 1,
            Err(CallError::Execution(_)) => failed += 1,
        }
    }
    println!("Sent and failed: {}, shed without sending: {}", failed, shed);
    println!("Stats: {:?}\n", group.get(key).stats());

    // Benign errors do not count against the breaker
    println!("--- Benign errors ---");
    let cache = "redis://cache:6379";
    for _ in 0..10 {
        let _ = group.call(
            cache,
            || Err::<String, _>(io::Error::from(io::ErrorKind::NotFound)),
            |err: Option<&io::Error>| err.is_none_or(|e| e.kind() == io::ErrorKind::NotFound),
        );
    }
    println!("Stats: {:?}", group.get(cache).stats());

    println!("\n--- All breakers ---");
    for (key, stats) in group.stats() {
        println!("{}: {} ({} attempts)", key, stats.state.as_str(), stats.total);
    }
}
