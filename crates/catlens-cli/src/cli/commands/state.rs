//! `catlens state` – settings summary, mapping count, badge.

use anyhow::Result;
use catlens_core::background::Background;
use catlens_core::config::CatlensConfig;

pub fn run_state(bg: &Background, cfg: &CatlensConfig) -> Result<()> {
    let state = bg.get_state()?;
    let s = &state.config;
    println!("{}", s.status_line(state.mappings.len()));
    println!("{:<16} {}", "app id", s.app_id);
    println!("{:<16} {}", "api key", s.masked_api_key());
    println!("{:<16} {}", "index", s.index_name);
    println!("{:<16} {}", "filter field", s.filter_field);
    println!("{:<16} {}", "category paths", s.category_paths);
    println!("{:<16} {}", "enabled", s.enabled);
    println!("{:<16} {}", "mappings", state.mappings.len());
    let badge = bg.badge();
    println!(
        "{:<16} {}",
        "badge",
        if badge.is_on() { badge.text.as_str() } else { "-" }
    );
    if let Ok(path) = cfg.resolved_storage_path() {
        println!("{:<16} {}", "storage", path.display());
    }
    Ok(())
}
