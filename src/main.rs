use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use recipe_wizard::config::AppConfig;
use recipe_wizard::core::logging::{self, print_info, print_success, print_warning};
use recipe_wizard::core::recipe::api::{load_tags, HttpRecipeApi};
use recipe_wizard::core::recipe::types::RecipeId;
use recipe_wizard::core::recipe::wizard::{DraftKey, DraftStore};
use recipe_wizard::database::Database;

#[derive(Parser)]
#[command(name = "recipe-wizard")]
#[command(about = "Recipe wizard draft maintenance")]
#[command(version)]
#[command(after_help = "Environment:\n  RUST_LOG   Log filter override (default: info)")]
struct Cli {
    /// Override the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and clean up stored wizard drafts
    Drafts {
        #[command(subcommand)]
        command: DraftsCommand,
    },
    /// List the tags offered by the recipe backend
    Tags,
}

#[derive(Subcommand)]
enum DraftsCommand {
    /// List live drafts, most recent first
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete expired or unreadable drafts
    Purge,
    /// Delete one draft by storage key or by recipe id
    Clear {
        #[arg(required_unless_present = "recipe")]
        key: Option<String>,
        #[arg(long, conflicts_with = "key")]
        recipe: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = logging::init();
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = Some(dir);
    }
    log::info!("{} v{} starting", recipe_wizard::NAME, recipe_wizard::VERSION);

    match cli.command {
        Commands::Drafts { command } => run_drafts(&config, command).await?,
        Commands::Tags => run_tags(&config).await?,
    }

    Ok(())
}

async fn run_drafts(
    config: &AppConfig,
    command: DraftsCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::new(&config.data_dir()).await?;
    let drafts = DraftStore::new(Arc::new(db), config.wizard.to_settings().draft_ttl);

    match command {
        DraftsCommand::List { json } => {
            let summaries = drafts.list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                print_info("No drafts stored");
            } else {
                for draft in summaries {
                    let title = if draft.title.trim().is_empty() {
                        "(untitled)"
                    } else {
                        draft.title.as_str()
                    };
                    println!(
                        "{:<40} step {} ({})  {}  saved {}",
                        draft.key,
                        draft.step.number(),
                        draft.step,
                        title,
                        draft.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
            }
        }
        DraftsCommand::Purge => {
            let purged = drafts.purge_expired().await;
            print_success(&format!("Purged {purged} stale draft(s)"));
        }
        DraftsCommand::Clear { key, recipe } => {
            let key = match (key, recipe) {
                (_, Some(id)) => DraftKey::for_recipe(&RecipeId::new(id)),
                (Some(raw), None) => DraftKey::from_raw(raw),
                (None, None) => return Err("a draft key or --recipe is required".into()),
            };
            if drafts.detect(&key).await.is_none() {
                print_warning(&format!("No live draft under {key}"));
            }
            drafts.clear(&key).await;
            print_success(&format!("Cleared {key}"));
        }
    }

    Ok(())
}

async fn run_tags(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpRecipeApi::new(
        config.api.base_url.clone(),
        config.api.auth_token.clone(),
        config.api.timeout(),
    )?;

    let tags = load_tags(&api).await;
    if tags.is_empty() {
        print_warning("No tags available");
    }
    for tag in tags {
        println!("{:<24} {}", tag.id, tag.name);
    }

    Ok(())
}
