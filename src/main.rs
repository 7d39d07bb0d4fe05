mod cli;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GlobalOpts, SelectCommands};
use property_admin::api::ListParams;
use property_admin::bulk::{export_properties, export_selected, CsvImporter};
use property_admin::models::labels::state_label;
use property_admin::models::permissions::Permissions;
use property_admin::models::BulkResult;
use property_admin::selection::{FileStorage, MemoryStorage};
use property_admin::transfer::{error_report_csv, template_csv};
use property_admin::{PropertyStore, SelectionTracker, SiteConfig, WpRestClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so CSV written to stdout stays clean
    let default_level = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let global = cli.global;

    match cli.command {
        Commands::Template { output } => {
            let template = template_csv();
            match output {
                Some(path) => {
                    tokio::fs::write(&path, template)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Template written to {}", path.display());
                }
                None => print!("{}", template),
            }
            Ok(())
        }
        Commands::Import {
            file,
            errors_report,
        } => {
            let mut store = open_store(&global, ListParams::default())?;
            let mut importer = CsvImporter::new();
            importer
                .select_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let cancel = CancellationToken::new();
            let watcher = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Cancelling import after the current row...");
                    watcher.cancel();
                }
            });

            let outcome = importer
                .run(&mut store, &cancel, |p| {
                    eprint!(
                        "\r[{}/{}] {} created, {} errors",
                        p.current, p.total, p.success, p.errors
                    );
                })
                .await
                .context("Import aborted")?;
            eprintln!();

            println!("{}", outcome.notification());
            for e in &outcome.errors {
                println!(
                    "  row {} ({}) [{}] {}: {}",
                    e.row,
                    e.title,
                    e.category.as_str(),
                    if e.field.is_empty() { "-" } else { e.field.as_str() },
                    e.message
                );
            }
            if let Some(path) = errors_report {
                if !outcome.errors.is_empty() {
                    tokio::fs::write(&path, error_report_csv(&outcome.errors)).await?;
                    info!("Error report written to {}", path.display());
                }
            }
            Ok(())
        }
        Commands::Export {
            filters,
            dir,
            selected,
            page,
        } => {
            let params = list_params(&global, page, filters.into_filters());
            let mut store = open_store(&global, params.clone())?;
            let today = Local::now().date_naive();

            let file = if selected {
                let selection = SelectionTracker::new(FileStorage::for_session(&global.session));
                store.load_properties(None).await?;
                export_selected(store.records(), &selection, store.permissions(), today)?
            } else {
                export_properties(store.api(), &params, store.permissions(), today).await?
            };
            let path = file.write_to(&dir).await?;
            println!("Exported {} properties to {}", file.count, path.display());
            Ok(())
        }
        Commands::List {
            filters,
            page,
            sort_by,
            order,
        } => {
            let mut params = list_params(&global, page, filters.into_filters());
            params.orderby = sort_by.into();
            params.order = order.into();
            let mut store = open_store(&global, params)?;
            let mut selection = SelectionTracker::new(FileStorage::for_session(&global.session));
            store.load_and_sync(&mut selection).await?;

            for p in store.records() {
                println!(
                    "{} {:>6}  {:<40} {:<11} {:<20} {}",
                    if selection.is_selected(p.id) { "*" } else { " " },
                    p.id,
                    p.title,
                    p.status.label(),
                    state_label(&p.state).unwrap_or(p.state.as_str()),
                    p.patent
                );
            }
            println!(
                "Page {} of {} ({} properties)",
                store.params().page,
                store.total_pages().max(1),
                store.total()
            );
            Ok(())
        }
        Commands::BulkStatus { status, ids, page } => {
            let (mut store, mut selection) = bulk_context(&global, page, ids).await?;
            let result = store.bulk_update_status(&mut selection, status).await?;
            report_bulk("Status change", &result);
            Ok(())
        }
        Commands::BulkPatent { patent, ids, page } => {
            let (mut store, mut selection) = bulk_context(&global, page, ids).await?;
            let result = store.bulk_update_patent(&mut selection, &patent).await?;
            report_bulk("Patent change", &result);
            Ok(())
        }
        Commands::BulkDelete { ids, page } => {
            let (mut store, mut selection) = bulk_context(&global, page, ids).await?;
            let result = store.bulk_delete(&mut selection).await?;
            report_bulk("Delete", &result);
            Ok(())
        }
        Commands::Select(cmd) => {
            let mut selection = SelectionTracker::new(FileStorage::for_session(&global.session));
            match cmd {
                SelectCommands::Add { ids } => ids.into_iter().for_each(|id| selection.select(id)),
                SelectCommands::Remove { ids } => {
                    ids.into_iter().for_each(|id| selection.deselect(id))
                }
                SelectCommands::Toggle { ids } => ids.into_iter().for_each(|id| {
                    selection.toggle(id);
                }),
                SelectCommands::Set { ids } => selection.select_all(ids),
                SelectCommands::Clear => selection.clear(),
                SelectCommands::Show => {}
            }
            let ids = selection.ids();
            if ids.is_empty() {
                println!("No properties selected");
            } else {
                println!("{} selected: {:?}", ids.len(), ids);
            }
            Ok(())
        }
        Commands::Patents => {
            let mut store = open_store(&global, ListParams::default())?;
            for patent in store.fetch_patents().await? {
                println!("{}", patent);
            }
            Ok(())
        }
        Commands::Sheets { ids, output } => {
            let mut store = open_store(&global, ListParams::default())?;
            let ids = if ids.is_empty() {
                SelectionTracker::new(FileStorage::for_session(&global.session)).ids()
            } else {
                ids
            };
            let bytes = store.download_sheets(&ids).await?;
            tokio::fs::write(&output, bytes).await?;
            println!("Saved {} technical sheets to {}", ids.len(), output.display());
            Ok(())
        }
        Commands::Upload { file } => {
            let mut store = open_store(&global, ListParams::default())?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            let id = store.upload_attachment(&name, bytes).await?;
            println!("Uploaded {} as attachment {}", name, id);
            Ok(())
        }
    }
}

fn site_config(global: &GlobalOpts) -> Result<SiteConfig> {
    SiteConfig::from_parts(global.api_url.clone(), global.nonce.clone(), global.per_page)
        .context("WordPress configuration is not available")
}

fn open_store(global: &GlobalOpts, params: ListParams) -> Result<PropertyStore<WpRestClient>> {
    let config = site_config(global)?;
    let mut params = params;
    if global.per_page.is_none() {
        params.per_page = config.per_page;
    }
    let client = WpRestClient::new(config).context("Failed to create HTTP client")?;
    let permissions = Permissions::new(global.user_id, global.role);
    Ok(PropertyStore::with_params(client, permissions, params))
}

fn list_params(
    global: &GlobalOpts,
    page: u32,
    filters: property_admin::api::Filters,
) -> ListParams {
    let mut params = ListParams {
        page: page.max(1),
        filters,
        ..ListParams::default()
    };
    if let Some(per_page) = global.per_page.filter(|n| *n > 0) {
        params.per_page = per_page;
    }
    params
}

/// Store loaded at `page`, plus the selection to act on: explicit ids, or
/// the persisted session selection when none are given. Either is pruned to
/// the loaded page.
async fn bulk_context(
    global: &GlobalOpts,
    page: u32,
    ids: Vec<i64>,
) -> Result<(PropertyStore<WpRestClient>, SelectionTracker)> {
    let mut store = open_store(global, list_params(global, page, Default::default()))?;

    let mut selection = if ids.is_empty() {
        SelectionTracker::new(FileStorage::for_session(&global.session))
    } else {
        let mut explicit = SelectionTracker::new(MemoryStorage::new());
        explicit.select_all(ids);
        explicit
    };
    store.load_and_sync(&mut selection).await?;
    if selection.is_empty() {
        bail!("No selected properties on page {}: pass ids or use `select add`", page.max(1));
    }
    Ok((store, selection))
}

fn report_bulk(action: &str, result: &BulkResult) {
    println!("{}", result.summary(action));
    for (id, reason) in &result.failed {
        println!("  {}: {}", id, reason);
    }
}
