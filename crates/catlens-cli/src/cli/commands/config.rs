//! `catlens config` – print settings, or save the given fields.

use anyhow::Result;
use catlens_core::background::Background;
use catlens_core::settings::SettingsPatch;

pub fn run_config(bg: &Background, patch: &SettingsPatch) -> Result<()> {
    let settings = if patch.is_empty() {
        bg.get_state()?.config
    } else {
        let saved = bg.save_config(patch)?;
        println!("Config saved.");
        saved
    };
    let shown = serde_json::json!({
        "appId": settings.app_id,
        "apiKey": settings.masked_api_key(),
        "indexName": settings.index_name,
        "filterField": settings.filter_field,
        "categoryPaths": settings.category_paths,
        "enabled": settings.enabled,
    });
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
