pub mod config;
pub mod logging;

pub mod background;
pub mod badge;
pub mod cache;
pub mod dom;
pub mod extract;
pub mod ident;
pub mod lookup;
pub mod native_messaging;
pub mod orchestrator;
pub mod query;
pub mod search;
pub mod settings;
pub mod store;
