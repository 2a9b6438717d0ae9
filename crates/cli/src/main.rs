//! Paste Shop CLI - shopping lists and category palettes from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create a list and add items
//! paste-shop -u alice create-list "Weekly shop"
//! paste-shop -u alice add-item <LIST_ID> Milk -q 2 -c dairy
//!
//! # Show the list grouped by category
//! paste-shop -u alice show <LIST_ID>
//!
//! # Customize categories
//! paste-shop -u alice categories add "Snack Food" --color "#FFAA00"
//! ```
//!
//! # Commands
//!
//! - `lists`, `create-list`, `show` - Shopping lists
//! - `add-item`, `toggle`, `edit`, `delete-item`, `clear-done` - List items
//! - `categories` - Category palette management
//!
//! State is kept in a JSON file (`PASTE_SHOP_DATA_FILE`, default
//! `paste-shop.json`) between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use paste_shop_core::{CategoryId, ItemDraft, ItemId, ItemPatch, ListId, UserId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

use commands::Session;
use config::CliConfig;
use error::CliError;

#[derive(Parser)]
#[command(name = "paste-shop")]
#[command(author, version, about = "Paste Shop shopping list tools")]
struct Cli {
    /// User id to act as
    #[arg(short, long, env = "PASTE_SHOP_USER", default_value = "local", global = true)]
    user: String,

    /// Store file (overrides `PASTE_SHOP_DATA_FILE`)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show your shopping lists, newest first
    Lists,
    /// Create a shopping list
    CreateList {
        /// List name
        name: String,
    },
    /// Show a list's items grouped by category
    Show {
        /// List id
        list: String,
    },
    /// Add an item to a list
    AddItem {
        /// List id
        list: String,

        /// Item name
        name: String,

        /// Quantity (must be positive)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Category id (empty for uncategorized)
        #[arg(short, long, default_value = "")]
        category: String,
    },
    /// Mark an item done, or not done
    Toggle {
        /// List id
        list: String,
        /// Item id
        item: String,
    },
    /// Edit an item's name, quantity, or category
    Edit {
        /// List id
        list: String,

        /// Item id
        item: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New quantity
        #[arg(long, allow_negative_numbers = true)]
        quantity: Option<i64>,

        /// New category id
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an item
    DeleteItem {
        /// List id
        list: String,
        /// Item id
        item: String,
    },
    /// Remove every completed item from a list
    ClearDone {
        /// List id
        list: String,
    },
    /// Manage your category palette
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Show every category with its color
    List,
    /// Add a custom category
    Add {
        /// Display name; the id is derived from it
        name: String,

        /// Color as #RGB or #RRGGBB
        #[arg(long, default_value = "#CCCCCC")]
        color: String,
    },
    /// Change a category's color
    SetColor {
        /// Category id
        id: String,
        /// Color as #RGB or #RRGGBB
        color: String,
    },
    /// Restore a category's standard color
    ResetColor {
        /// Category id
        id: String,
    },
    /// Delete a custom category
    Delete {
        /// Category id
        id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before parsing so `PASTE_SHOP_USER` can come from it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = CliConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paste_shop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli, config: CliConfig) -> Result<(), CliError> {
    let path = cli.data_file.unwrap_or(config.data_file);
    let session = Session::open(&path, config.sync, UserId::new(cli.user))?;

    match cli.command {
        Commands::Lists => commands::lists::list_all(&session).await?,
        Commands::CreateList { name } => commands::lists::create(&session, &name).await?,
        Commands::Show { list } => commands::lists::show(&session, &ListId::new(list)).await?,
        Commands::AddItem {
            list,
            name,
            quantity,
            category,
        } => {
            let draft = ItemDraft::new(name, quantity, category);
            commands::items::add(&session, &ListId::new(list), draft).await?;
        }
        Commands::Toggle { list, item } => {
            commands::items::toggle(&session, &ListId::new(list), &ItemId::new(item)).await?;
        }
        Commands::Edit {
            list,
            item,
            name,
            quantity,
            category,
        } => {
            let patch = ItemPatch {
                name,
                quantity,
                category,
            };
            commands::items::edit(&session, &ListId::new(list), &ItemId::new(item), patch).await?;
        }
        Commands::DeleteItem { list, item } => {
            commands::items::delete(&session, &ListId::new(list), &ItemId::new(item)).await?;
        }
        Commands::ClearDone { list } => {
            commands::items::clear_done(&session, &ListId::new(list)).await?;
        }
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::categories::list(&session).await?,
            CategoryAction::Add { name, color } => {
                commands::categories::add(&session, &name, &color).await?;
            }
            CategoryAction::SetColor { id, color } => {
                commands::categories::set_color(&session, &CategoryId::new(id), &color).await?;
            }
            CategoryAction::ResetColor { id } => {
                commands::categories::reset_color(&session, &CategoryId::new(id)).await?;
            }
            CategoryAction::Delete { id } => {
                commands::categories::delete(&session, &CategoryId::new(id)).await?;
            }
        },
    }

    session.save()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_item() {
        let cli = Cli::try_parse_from([
            "paste-shop", "-u", "alice", "add-item", "l1", "Milk", "-q", "2", "-c", "dairy",
        ])
        .unwrap();
        assert_eq!(cli.user, "alice");
        assert!(matches!(
            cli.command,
            Commands::AddItem { quantity: 2, ref category, .. } if category == "dairy"
        ));
    }

    #[test]
    fn test_category_color_defaults_to_gray() {
        let cli = Cli::try_parse_from(["paste-shop", "categories", "add", "Snacks"]).unwrap();
        let Commands::Categories {
            action: CategoryAction::Add { color, .. },
        } = cli.command
        else {
            panic!("expected categories add");
        };
        assert_eq!(color, "#CCCCCC");
    }
}
