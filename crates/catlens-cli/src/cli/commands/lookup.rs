//! `catlens lookup <ids..>` – resolve ids and print their labels.

use anyhow::Result;
use catlens_core::background::Background;
use serde_json::Value;

pub async fn run_lookup(bg: &Background, ids: &[String]) -> Result<()> {
    let raw = Value::from(ids.to_vec());
    let outcome = bg.lookup(&raw).await?;
    for id in ids {
        let id = id.trim();
        match outcome.labels.get(id) {
            Some(label) => println!("{:<24} {}", id, label),
            None => println!("{:<24} -", id),
        }
    }
    if outcome.requested > 0 {
        println!(
            "Fetched {} of {} requested ids.",
            outcome.fetched.len(),
            outcome.requested
        );
    }
    Ok(())
}
