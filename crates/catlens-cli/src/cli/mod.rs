//! CLI for the catlens background service.

mod commands;

use anyhow::Result;
use catlens_core::background::Background;
use catlens_core::config;
use catlens_core::settings::SettingsPatch;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{
    run_clear, run_config, run_export, run_import, run_lookup, run_mappings_list,
    run_mappings_set, run_serve, run_state,
};

/// Top-level CLI: inspect and drive the category label service.
#[derive(Debug, Parser)]
#[command(name = "catlens")]
#[command(about = "catlens: resolve category ids to readable labels", long_about = None)]
pub struct Cli {
    /// Use this config.toml instead of the XDG default.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show settings, mapping count, and badge.
    State,

    /// Show or update the extension settings.
    Config(ConfigArgs),

    /// Resolve ids through the search API (cached ids are not re-fetched).
    Lookup {
        /// Category ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Inspect or replace the mapping cache.
    Mappings {
        #[command(subcommand)]
        action: MappingsCommand,
    },

    /// Export the mapping cache as JSON (stdout if no file is given).
    Export {
        file: Option<PathBuf>,
    },

    /// Import a mapping file (merged unless --overwrite).
    Import {
        file: PathBuf,
        /// Replace the cache instead of merging into it.
        #[arg(long)]
        overwrite: bool,
    },

    /// Remove every cached mapping.
    Clear,

    /// Run as a native messaging host on stdin/stdout.
    Serve {
        /// Caller origin passed by the browser, e.g. chrome-extension://<id>/.
        #[arg(long)]
        origin: String,
    },
}

#[derive(Debug, Args, Default)]
pub struct ConfigArgs {
    #[arg(long)]
    pub app_id: Option<String>,
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub index_name: Option<String>,
    /// Comma-separated filter fields.
    #[arg(long)]
    pub filter_field: Option<String>,
    /// Comma-separated label paths, e.g. "categories,hierarchy.lvl0".
    #[arg(long)]
    pub category_paths: Option<String>,
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
}

impl ConfigArgs {
    pub fn to_patch(&self) -> SettingsPatch {
        let enabled = if self.enable {
            Some(true)
        } else if self.disable {
            Some(false)
        } else {
            None
        };
        SettingsPatch {
            app_id: self.app_id.clone(),
            api_key: self.api_key.clone(),
            index_name: self.index_name.clone(),
            filter_field: self.filter_field.clone(),
            category_paths: self.category_paths.clone(),
            enabled,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum MappingsCommand {
    /// Print every id and label.
    List,
    /// Replace the cache with the JSON object in FILE.
    Set { file: PathBuf },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config_path {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let bg = Background::from_config(&cfg)?;

        match cli.command {
            CliCommand::State => run_state(&bg, &cfg)?,
            CliCommand::Config(args) => run_config(&bg, &args.to_patch())?,
            CliCommand::Lookup { ids } => run_lookup(&bg, &ids).await?,
            CliCommand::Mappings { action } => match action {
                MappingsCommand::List => run_mappings_list(&bg)?,
                MappingsCommand::Set { file } => run_mappings_set(&bg, Path::new(&file))?,
            },
            CliCommand::Export { file } => run_export(&bg, file.as_deref())?,
            CliCommand::Import { file, overwrite } => run_import(&bg, &file, overwrite)?,
            CliCommand::Clear => run_clear(&bg)?,
            CliCommand::Serve { origin } => run_serve(&bg, &origin).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
