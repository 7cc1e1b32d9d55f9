use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libfolio::logging::LoggingConfig;
use libfolio::service::FolioService;
use libfolio::{Config, EditOp, FolioError, MoveDirection, Props, StoreError};

#[derive(Parser, Debug)]
#[command(name = "folio-edit")]
#[command(version, about = "Edit the components of a CMS page")]
#[command(long_about = r#"Edit the components of a CMS page.

Every command opens the page, applies the edit and saves it. A failed edit
leaves the stored page untouched.

EXAMPLES:
    # Append a hero section
    folio-edit add home hero

    # Insert a gallery as the second component
    folio-edit add home gallery --index 1

    # Change some props (shallow merge)
    folio-edit set home hero-3f2a... --props '{"title": "Summer Deals"}'

    # Reorder and remove
    folio-edit move home hero-3f2a... down
    folio-edit remove home cta-91bc...

    # Rename a page
    folio-edit details home --title "Welcome"

    # Apply a batch of operations from a file or stdin
    folio-edit apply home --ops edits.json
    echo '[{"op": "add", "type": "text"}]' | folio-edit apply home

BATCH FORMAT:
    A JSON array of operations:
    {"op": "add", "type": "hero", "index": 0}
    {"op": "update_props", "component_id": "...", "props": {...}}
    {"op": "remove", "component_id": "..."}
    {"op": "move", "component_id": "...", "direction": "up"}

    Operations run in order. If one fails, nothing is saved.

EXIT CODES:
    0 - Success
    1 - Database or configuration error
    3 - Invalid input (bad index, bad JSON)
    4 - Page, component or component type not found
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a component from the catalog
    Add {
        /// Page id or slug
        page: String,

        /// Component type (see `folio-page catalog`)
        #[arg(value_name = "TYPE")]
        component_type: String,

        /// Position to insert at (defaults to the end)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Merge props into a component
    Set {
        /// Page id or slug
        page: String,

        /// Component id
        component: String,

        /// JSON object of props to merge
        #[arg(short, long)]
        props: String,
    },

    /// Remove a component
    Remove {
        /// Page id or slug
        page: String,

        /// Component id
        component: String,
    },

    /// Move a component one position up or down
    Move {
        /// Page id or slug
        page: String,

        /// Component id
        component: String,

        /// Direction: up or down
        direction: MoveDirection,
    },

    /// Change a page's title or description
    Details {
        /// Page id or slug
        page: String,

        #[arg(short, long)]
        title: Option<String>,

        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Apply a JSON batch of operations
    Apply {
        /// Page id or slug
        page: String,

        /// File with the operations (reads stdin when omitted or "-")
        #[arg(short, long)]
        ops: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Map an error chain to the documented exit codes
fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(folio) = error.downcast_ref::<FolioError>() {
        return folio.exit_code();
    }
    if let Some(store) = error.downcast_ref::<StoreError>() {
        return FolioError::Store(store.clone()).exit_code();
    }
    if error.downcast_ref::<serde_json::Error>().is_some() {
        return 3;
    }
    1
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?;
    LoggingConfig::from_section(config.logging.as_ref(), cli.verbose).init();

    let mut service = FolioService::from_config(config).await?;

    let (page, output) = match cli.command {
        Commands::Add {
            page,
            component_type,
            index,
        } => {
            open_page(&mut service, &page)?;
            let component = service.store_mut().add_component(&component_type, index)?;
            let id = component.id.clone();
            (page, id)
        }
        Commands::Set {
            page,
            component,
            props,
        } => {
            let props = parse_props(&props)?;
            open_page(&mut service, &page)?;
            service
                .store_mut()
                .update_component_props(&component, props)?;
            (page, format!("{} updated", component))
        }
        Commands::Remove { page, component } => {
            open_page(&mut service, &page)?;
            service.store_mut().remove_component(&component)?;
            (page, format!("{} removed", component))
        }
        Commands::Move {
            page,
            component,
            direction,
        } => {
            open_page(&mut service, &page)?;
            let moved = service.store_mut().move_component(&component, direction)?;
            if !moved {
                // nothing changed, so there is nothing to save
                println!("{} is already at the {} edge", component, direction);
                return Ok(());
            }
            (page, format!("{} moved {}", component, direction))
        }
        Commands::Details {
            page,
            title,
            description,
        } => {
            if title.is_none() && description.is_none() {
                bail!(FolioError::InvalidInput(
                    "Nothing to change: pass --title and/or --description".to_string()
                ));
            }
            open_page(&mut service, &page)?;
            service
                .store_mut()
                .update_page_details(title, description)?;
            (page, "details updated".to_string())
        }
        Commands::Apply { page, ops } => {
            let ops = read_ops(ops.as_deref())?;
            open_page(&mut service, &page)?;
            let outcomes = service.store_mut().apply_all(ops)?;
            let json = serde_json::to_string_pretty(&outcomes)
                .context("Failed to serialize results")?;
            (page, json)
        }
    };

    let saved = service
        .save_and_persist()
        .await
        .with_context(|| format!("Failed to save page '{}'", page))?;
    tracing::info!(
        "Saved page {} with {} components",
        saved.id,
        saved.components.len()
    );

    println!("{}", output);
    Ok(())
}

/// Select a page by id or slug
fn open_page(service: &mut FolioService, page: &str) -> Result<()> {
    let store = service.store_mut();
    let id = store
        .page(page)
        .or_else(|| store.find_by_slug(page))
        .map(|p| p.id.clone())
        .ok_or_else(|| FolioError::Store(StoreError::PageNotFound(page.to_string())))?;
    store.select_page(&id)?;
    Ok(())
}

fn parse_props(input: &str) -> Result<Props> {
    let value: serde_json::Value =
        serde_json::from_str(input).context("--props must be valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => bail!(FolioError::InvalidInput(format!(
            "--props must be a JSON object, got {}",
            other
        ))),
    }
}

fn read_ops(path: Option<&std::path::Path>) -> Result<Vec<EditOp>> {
    let input = match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read operations from {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read operations from stdin")?;
            buffer
        }
    };

    let ops: Vec<EditOp> =
        serde_json::from_str(&input).context("Operations must be a JSON array of edits")?;
    if ops.is_empty() {
        bail!(FolioError::InvalidInput("No operations given".to_string()));
    }
    Ok(ops)
}
