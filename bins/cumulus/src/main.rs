//! Cumulus drive client.
//!
//! Runs one drive operation against the configured database and blob store.
//!
//! Usage: cumulus <owner-id> <command> [args]

mod command;

use std::sync::Arc;

use anyhow::{Context, Result};
use cumulus_core::drive::{DriveConfig, DriveService, FileNode, UploadRequest};
use cumulus_core::storage::{StorageConfig, StorageService};
use cumulus_db::FileRepository;
use cumulus_shared::AppConfig;
use cumulus_shared::types::PageRequest;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use command::{Command, Invocation, USAGE};

type Drive = DriveService<FileRepository, StorageService>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cumulus=info,cumulus_core=info,cumulus_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let invocation = Invocation::parse(std::env::args().skip(1))
        .map_err(|e| anyhow::anyhow!("{e:#}\n\n{USAGE}"))?;

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = cumulus_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let storage = StorageService::from_config(StorageConfig::from_settings(&config.storage))?;
    info!(provider = config.storage.provider.name(), "Storage configured");

    let drive = DriveService::new(
        Arc::new(FileRepository::new(db)),
        Arc::new(storage),
        DriveConfig::from_settings(&config.drive, &config.storage)?,
    );

    run(&drive, invocation).await
}

async fn run(drive: &Drive, Invocation { owner, command }: Invocation) -> Result<()> {
    match command {
        Command::List { folder, sort } => {
            let mut request = PageRequest::new(1, 100);
            loop {
                let page = drive.list(owner, folder, request, &sort).await?;
                print_nodes(&page.data);
                if u64::from(request.page) >= page.meta.total_pages {
                    break;
                }
                request.page += 1;
            }
        }
        Command::Find { keyword, sort } => {
            let page = drive
                .search(owner, &keyword, PageRequest::new(1, 100), &sort)
                .await?;
            print_nodes(&page.data);
            println!("{} match(es)", page.meta.total);
        }
        Command::Mkdir { name, parent } => {
            let folder = drive.create_folder(owner, &name, parent).await?;
            println!("{}", folder.id);
        }
        Command::Put { path, parent } => {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("no usable file name in {}", path.display()))?
                .to_string();
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            let size = file.metadata().await?.len();

            let mut request = UploadRequest::new(owner, filename).with_size_hint(size);
            if let Some(parent) = parent {
                request = request.in_folder(parent);
            }
            let node = drive.upload(request, file).await?;
            println!("{}", node.id);
        }
        Command::Get { id, path } => {
            let (node, content) = drive.download(owner, id).await?;
            tokio::fs::write(&path, &content)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{} bytes -> {}", node.size, path.display());
        }
        Command::Move { target, ids } => {
            let moved = drive.batch_move(owner, &ids, target).await?;
            print_nodes(&moved);
        }
        Command::Rename { id, name } => {
            let node = drive.rename(owner, id, &name).await?;
            print_nodes(std::slice::from_ref(&node));
        }
        Command::Remove { id } => {
            let summary = drive.delete(owner, id).await?;
            println!(
                "removed {} node(s), {} blob(s)",
                summary.nodes_removed, summary.blobs_removed
            );
        }
        Command::Path { id } => {
            println!("{}", drive.display_path(owner, id).await?);
        }
        Command::Url { id } => {
            let url = drive.file_url(owner, id).await?;
            println!("{} {} (expires {})", url.method, url.url, url.expires_at);
        }
    }
    Ok(())
}

fn print_nodes(nodes: &[FileNode]) {
    for node in nodes {
        let kind = if node.is_directory { "d" } else { "-" };
        println!("{kind} {} {:>12} {}", node.id, node.size, node.name);
    }
}
