//! content-tree - command-line front end for the content tree.
//!
//! Every invocation restores the saved expansion state, loads the described
//! subtree from the repository, applies one event and prints the result:
//!
//! ```text
//! main() -> config -> ContentTree::new() -> mount() -> event -> render
//! ```

mod render;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use content_tree_config::ContentTreeConfig;
use content_tree_core::content_tree_types::{LocationPath, PathParseError, SubtreeEdit, find_item};
use content_tree_core::{ContentTree, FileStore, KeyValueStore, LoadMoreRequest, LocationLoader};
use content_tree_providers::RestLocationLoader;

#[derive(Parser)]
#[command(name = "content-tree", version)]
#[command(about = "Browse a content repository as an expandable tree")]
struct Cli {
    /// Config file (default: ~/.content-tree/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Current location as a slash-delimited path, e.g. /1/2/43/
    #[arg(long, global = true, value_parser = LocationPath::from_slashed)]
    current: Option<LocationPath>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tree
    Show,
    /// Expand an item, loading its first page of children if needed
    Expand {
        /// Location ids from the root item down, e.g. 2/43
        #[arg(value_parser = parse_item_path)]
        path: LocationPath,
    },
    /// Collapse an item
    Collapse {
        #[arg(value_parser = parse_item_path)]
        path: LocationPath,
    },
    /// Load the next page of an item's children
    More {
        #[arg(value_parser = parse_item_path)]
        path: LocationPath,
    },
    /// Forget all expansion state and reload from the root
    CollapseAll,
    /// Print the subtree descriptor the next load would request
    Subtree,
}

/// Accepts `2/43/51` as well as the comma-joined `2,43,51`.
fn parse_item_path(raw: &str) -> Result<LocationPath, PathParseError> {
    if raw.contains(',') {
        raw.parse()
    } else {
        LocationPath::from_slashed(raw)
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Stdout carries the rendered tree; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.content-tree/logs/content-tree.log
    if let Some(config_dir) = content_tree_config::config_dir() {
        candidates.push(config_dir.join("logs").join("content-tree.log"));
    }

    // Fallback: ./.content-tree/logs/content-tree.log
    candidates.push(
        PathBuf::from(".content-tree")
            .join("logs")
            .join("content-tree.log"),
    );

    candidates
}

fn load_config(path: Option<&Path>) -> Result<ContentTreeConfig> {
    let config = match path {
        Some(path) => ContentTreeConfig::load_from(path)?,
        None => ContentTreeConfig::load()?.unwrap_or_default(),
    };
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(cli.config.as_deref())?;
    let mut settings = config.tree_settings()?;
    if let Some(current) = cli.current {
        settings.current_location_path = current;
    }

    let storage_dir = config
        .storage_dir()
        .context("no home directory; set [storage] dir in the config")?;
    let loader = RestLocationLoader::new(config.base_url()?)?;
    let mut tree = ContentTree::new(
        settings,
        config.rest_info(),
        FileStore::new(storage_dir),
        loader,
    );

    if matches!(cli.command, Command::Subtree) {
        println!("{}", serde_json::to_string_pretty(tree.subtree())?);
        return Ok(());
    }

    tree.mount()
        .await
        .context("failed to load the content tree")?;
    apply(&mut tree, cli.command).await?;

    print!("{}", render::render(&tree.view()));
    Ok(())
}

async fn apply<S, L>(tree: &mut ContentTree<S, L>, command: Command) -> Result<()>
where
    S: KeyValueStore,
    L: LocationLoader,
{
    match command {
        Command::Show | Command::Subtree => {}
        Command::Expand { path } => {
            let item = find_item(tree.items(), path.as_slice())
                .ok_or_else(|| anyhow!("no loaded item at {path}"))?;
            if !item.is_container && item.is_leaf() {
                bail!("{} [{path}] has no children", item.name);
            }
            if item.is_leaf() {
                let request = LoadMoreRequest::next_page(
                    path.clone(),
                    item,
                    tree.settings().subitems_load_limit,
                );
                tree.load_more_subitems(request).await?;
            }
            report(&path, tree.after_item_toggle(&path, true)?);
        }
        Command::Collapse { path } => {
            report(&path, tree.after_item_toggle(&path, false)?);
        }
        Command::More { path } => {
            let item = find_item(tree.items(), path.as_slice())
                .ok_or_else(|| anyhow!("no loaded item at {path}"))?;
            if !item.has_more_subitems() {
                eprintln!("{} [{path}] has no more children to load", item.name);
                return Ok(());
            }
            let request =
                LoadMoreRequest::next_page(path.clone(), item, tree.settings().subitems_load_limit);
            report(&path, tree.load_more_subitems(request).await?);
        }
        Command::CollapseAll => tree.collapse_all().await?,
    }
    Ok(())
}

fn report(path: &LocationPath, edit: SubtreeEdit) {
    if !edit.is_applied() {
        eprintln!("No change at {path}: {edit:?}");
    }
}
