//! folio-page - Create, inspect and publish CMS pages

use clap::{Parser, Subcommand};
use libfolio::logging::LoggingConfig;
use libfolio::service::FolioService;
use libfolio::{CmsPage, ComponentCategory, Config, FolioError, PageStatus, PageTemplate, Result};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "folio-page")]
#[command(version)]
#[command(about = "Create, inspect and publish CMS pages")]
#[command(long_about = "\
folio-page - Create, inspect and publish CMS pages

COMMANDS:
    create      Create a draft page from a template
    list        List pages
    show        Show a page and its components
    publish     Publish a page (re-publishing refreshes its publish time)
    delete      Delete a page
    templates   List page templates
    catalog     List the component catalog
    stats       Count pages by status

USAGE EXAMPLES:
    folio-page create --title \"Summer Deals\" --slug summer-deals --template landing
    folio-page list --status draft
    folio-page show summer-deals --format json
    folio-page publish summer-deals

CONFIGURATION:
    Configuration file: ~/.config/folio/config.toml
    Override with FOLIO_CONFIG=/path/to/config.toml

EXIT CODES:
    0 - Success
    1 - Database or configuration error
    3 - Invalid input (bad slug, duplicate slug, etc.)
    4 - Page not found
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a draft page
    Create {
        /// Page title
        #[arg(short, long)]
        title: String,

        /// URL slug (lowercase letters, digits and hyphens)
        #[arg(short, long)]
        slug: String,

        /// Template: blank, landing or about (defaults to the configured template)
        #[arg(long)]
        template: Option<String>,

        /// Optional page description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List pages
    List {
        /// Only show pages with this status (draft or published)
        #[arg(long)]
        status: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        #[arg(value_parser = ["text", "json"])]
        format: String,
    },

    /// Show a page
    Show {
        /// Page id or slug
        page: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        #[arg(value_parser = ["text", "json"])]
        format: String,
    },

    /// Publish a page
    Publish {
        /// Page id or slug
        page: String,
    },

    /// Delete a page
    Delete {
        /// Page id or slug
        page: String,
    },

    /// List page templates
    Templates,

    /// List the component catalog
    Catalog {
        /// Only show one category (layout, content, media, form)
        #[arg(short, long)]
        category: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        #[arg(value_parser = ["text", "json"])]
        format: String,
    },

    /// Count pages by status
    Stats,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };
    LoggingConfig::from_section(config.logging.as_ref(), cli.verbose).init();

    if let Err(e) = run(cli, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut service = FolioService::from_config(config).await?;
    tracing::debug!("Loaded {} pages", service.store().pages().len());

    match cli.command {
        Commands::Create {
            title,
            slug,
            template,
            description,
        } => cmd_create(&mut service, &title, &slug, template.as_deref(), description).await,
        Commands::List { status, format } => cmd_list(&service, status.as_deref(), &format),
        Commands::Show { page, format } => cmd_show(&service, &page, &format),
        Commands::Publish { page } => cmd_publish(&mut service, &page).await,
        Commands::Delete { page } => cmd_delete(&mut service, &page).await,
        Commands::Templates => {
            cmd_templates();
            Ok(())
        }
        Commands::Catalog { category, format } => {
            cmd_catalog(&service, category.as_deref(), &format)
        }
        Commands::Stats => cmd_stats(&service).await,
    }
}

/// Resolve a page argument that may be either an id or a slug
fn resolve_page_id(service: &FolioService, page: &str) -> Result<String> {
    let store = service.store();
    store
        .page(page)
        .or_else(|| store.find_by_slug(page))
        .map(|p| p.id.clone())
        .ok_or_else(|| libfolio::StoreError::PageNotFound(page.to_string()).into())
}

async fn cmd_create(
    service: &mut FolioService,
    title: &str,
    slug: &str,
    template: Option<&str>,
    description: Option<String>,
) -> Result<()> {
    let template = match template {
        Some(name) => PageTemplate::from_name(name),
        None => service.config().editor.template(),
    };

    let id = service.store_mut().create_new_page(title, slug, template)?;

    if description.is_some() {
        let store = service.store_mut();
        store.select_page(&id)?;
        store.update_page_details(None, description)?;
        store.save_page()?;
        store.clear_selection();
    }

    service.store().persist_page(&id).await?;
    println!("{}", id);
    Ok(())
}

fn cmd_list(service: &FolioService, status: Option<&str>, format: &str) -> Result<()> {
    let status = status
        .map(|s| s.parse::<PageStatus>().map_err(FolioError::InvalidInput))
        .transpose()?;

    let pages: Vec<&CmsPage> = service
        .store()
        .pages()
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect();

    if format == "json" {
        return print_json(&pages);
    }

    for page in pages {
        println!(
            "{} | {} | {} | {} | {} components",
            page.id,
            page.slug,
            page.status,
            page.title,
            page.components.len()
        );
    }
    Ok(())
}

fn cmd_show(service: &FolioService, page: &str, format: &str) -> Result<()> {
    let id = resolve_page_id(service, page)?;
    let page = service
        .store()
        .page(&id)
        .ok_or_else(|| libfolio::StoreError::PageNotFound(id.clone()))?;

    if format == "json" {
        return print_json(page);
    }

    println!("{} ({})", page.title, page.id);
    println!("  slug:      {}", page.slug);
    println!("  status:    {}", page.status);
    if let Some(description) = &page.description {
        println!("  about:     {}", description);
    }
    println!("  created:   {}", format_time(&page.created_at));
    println!("  updated:   {}", format_time(&page.updated_at));
    if let Some(published_at) = &page.published_at {
        println!("  published: {}", format_time(published_at));
    }
    println!("  components:");
    for (index, component) in page.components.iter().enumerate() {
        println!(
            "    {}. {} [{}]",
            index + 1,
            component.id,
            component.component_type
        );
    }
    Ok(())
}

async fn cmd_publish(service: &mut FolioService, page: &str) -> Result<()> {
    let id = resolve_page_id(service, page)?;
    let page = service.publish_and_persist(&id).await?;

    let published_at = page
        .published_at
        .as_ref()
        .map(format_time)
        .unwrap_or_default();
    println!("{} published at {}", page.id, published_at);
    Ok(())
}

async fn cmd_delete(service: &mut FolioService, page: &str) -> Result<()> {
    let id = resolve_page_id(service, page)?;
    let page = service.delete_and_persist(&id).await?;
    println!("{} deleted", page.id);
    Ok(())
}

fn cmd_templates() {
    for template in PageTemplate::all() {
        println!("{:<8} {}", template.name(), template.description());
    }
}

fn cmd_catalog(service: &FolioService, category: Option<&str>, format: &str) -> Result<()> {
    let catalog = service.store().catalog();

    let category = match category {
        Some(name) => Some(
            ComponentCategory::all()
                .into_iter()
                .find(|c| c.as_str() == name.to_lowercase())
                .ok_or_else(|| {
                    FolioError::InvalidInput(format!(
                        "Invalid category '{}'. Valid options: layout, content, media, form",
                        name
                    ))
                })?,
        ),
        None => None,
    };

    let definitions: Vec<_> = match category {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.list().iter().collect(),
    };

    if format == "json" {
        return print_json(&definitions);
    }

    for definition in definitions {
        println!(
            "{:<14} {:<8} {}",
            definition.id,
            definition.category.as_str(),
            definition.name
        );
    }
    Ok(())
}

async fn cmd_stats(service: &FolioService) -> Result<()> {
    let db = service.database();
    let drafts = db.count_by_status(PageStatus::Draft).await?;
    let published = db.count_by_status(PageStatus::Published).await?;

    println!("draft:     {}", drafts);
    println!("published: {}", published);
    println!("total:     {}", drafts + published);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| FolioError::InvalidInput(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn format_time(time: &chrono::DateTime<chrono::Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
