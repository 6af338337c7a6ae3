//! todosync - device-side todo list with server sync.
//!
//! # Usage
//!
//! ```text
//! todosync list [--mine]
//! todosync add <title> <content>
//! todosync edit <id> <title> <content>
//! todosync delete <id>
//! todosync push
//! todosync pull
//! todosync whoami
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use todosync_device::{DeviceConfig, SqliteStore, SyncClient, TodoService};
use todosync_engine::{Record, RecordId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "todosync",
    version,
    about = "Device-scoped todo list that syncs through a server",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List todos on this device.
    List {
        /// Only show todos created on this device.
        #[arg(long)]
        mine: bool,
    },

    /// Add a todo.
    Add { title: String, content: String },

    /// Edit one of this device's todos.
    Edit {
        id: RecordId,
        title: String,
        content: String,
    },

    /// Delete one of this device's todos.
    Delete { id: RecordId },

    /// Upload this device's todos to the server.
    Push,

    /// Download the server's todos and merge them locally.
    Pull,

    /// Print this device's owner id.
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, listings to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todosync_device=info,todosync_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = DeviceConfig::from_env()?;
    let owner = config.owner_id()?;

    if let Commands::Whoami = cli.command {
        println!("{}", owner);
        return Ok(());
    }

    let store = SqliteStore::connect(&config.database_url)
        .await
        .with_context(|| format!("could not open {}", config.database_url))?;
    store.bootstrap().await.context("could not create tables")?;

    let remote = SyncClient::new(&config.server_url)?;
    let service = TodoService::new(store, remote, owner);

    match cli.command {
        Commands::List { mine } => {
            let todos = if mine {
                service.my_todos().await?
            } else {
                service.all_todos().await?
            };
            print_todos(&service, &todos);
        }
        Commands::Add { title, content } => {
            let record = service.add(&title, &content).await?;
            println!("Added todo {}", record.id);
        }
        Commands::Edit { id, title, content } => {
            service
                .edit(id, &title, &content)
                .await
                .with_context(|| format!("failed to update todo {id}"))?;
            println!("Updated todo {}", id);
        }
        Commands::Delete { id } => {
            service
                .remove(id)
                .await
                .with_context(|| format!("failed to delete todo {id}"))?;
            println!("Deleted todo {}", id);
        }
        Commands::Push => {
            let count = service.push().await.context("sync failed")?;
            println!("Pushed {} todos", count);
        }
        Commands::Pull => {
            let report = service.pull().await.context("pull failed")?;
            println!(
                "Pulled: {} inserted, {} updated, {} deleted, {} skipped, {} failed",
                report.inserted, report.updated, report.deleted, report.skipped, report.failed
            );
        }
        Commands::Whoami => {}
    }

    Ok(())
}

fn print_todos(service: &TodoService<SqliteStore>, todos: &[Record]) {
    if todos.is_empty() {
        println!("No todos.");
        return;
    }
    for todo in todos {
        // '*' marks todos this device may edit or delete
        let marker = if service.can_modify(todo) { '*' } else { ' ' };
        println!(
            "{} {:>4}  {:<24}  {}  [{}]",
            marker, todo.id, todo.title, todo.content, todo.owner
        );
    }
}
