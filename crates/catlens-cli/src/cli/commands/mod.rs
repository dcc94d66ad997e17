//! CLI command handlers, one file per command group.

mod config;
mod lookup;
mod mappings;
mod serve;
mod state;

pub use config::run_config;
pub use lookup::run_lookup;
pub use mappings::{run_clear, run_export, run_import, run_mappings_list, run_mappings_set};
pub use serve::run_serve;
pub use state::run_state;
