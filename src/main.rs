//! rclang client - Entry Point
//!
//! Sets up logging, parses arguments, launches the language server and runs
//! one client action against it with a terminal host.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::try_join_all;
use lsp_types::{TextDocumentIdentifier, TextDocumentPositionParams};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rclang_client::config::{self, SETTINGS_FILE, Settings};
use rclang_client::extension::{EditorCommand, Extension};
use rclang_client::host::TerminalHost;
use rclang_client::lsp::LspClient;
use rclang_client::lsp::types::to_lsp_position;
use rclang_client::tree_view::TreeViews;

/// Language client for the rclang language server.
#[derive(Parser, Debug)]
#[command(name = "rclang-client")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workspace root directory.
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Settings file; defaults to `<workspace>/.rclang.json`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default settings file into the current directory.
    Config,
    /// Render the IR preview of a file.
    Preview {
        /// Source file to preview.
        file: PathBuf,
        /// Write the HTML here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print a tree view.
    Tree {
        /// View id, e.g. `rcAst`.
        view_id: String,
        /// How many levels to expand.
        #[arg(short, long, default_value_t = 3)]
        depth: usize,
    },
    /// Reveal the tree node at a position (1-indexed).
    Reveal {
        /// Source file.
        file: PathBuf,
        /// Line number.
        line: u32,
        /// Column number.
        column: u32,
    },
    /// Stay connected and act on server pushes until interrupted.
    Run,
}

impl Args {
    /// Parses the log level string into a tracing Level.
    fn parse_log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => anyhow::bail!("invalid log level: {}", other),
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.workspace.join(SETTINGS_FILE))
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(level: Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rclang_client={level},rclang_server={level},async_lsp={level}"
        ))
    });

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    Ok(())
}

/// Prints `view_id`'s tree, fetching each level's children concurrently.
async fn print_tree(
    views: &TreeViews<LspClient, TerminalHost>,
    view_id: &str,
    max_depth: usize,
) -> Result<()> {
    let mut level: Vec<(usize, String)> = views
        .get_children(view_id, None)
        .await?
        .into_iter()
        .map(|uri| (0, uri))
        .collect();

    // Depth-first output order, breadth-first fetching
    let mut lines = Vec::new();
    let mut depth = 0;
    while !level.is_empty() {
        let fetch = depth + 1 < max_depth;
        let children = try_join_all(level.iter().map(|(_, uri)| async move {
            if fetch {
                views.get_children(view_id, Some(uri.as_str())).await
            } else {
                Ok(Vec::new())
            }
        }))
        .await?;

        let mut next = Vec::new();
        for ((parent_index, uri), kids) in level.into_iter().zip(children) {
            let label = views
                .node(view_id, &uri)
                .await
                .map_or_else(|| uri.clone(), |node| node.label);
            lines.push((parent_index, depth, label));
            let index = lines.len() - 1;
            next.extend(kids.into_iter().map(|kid| (index, kid)));
        }
        level = next;
        depth += 1;
    }

    print_subtree(&lines, None, 0);
    Ok(())
}

fn print_subtree(lines: &[(usize, usize, String)], parent: Option<usize>, depth: usize) {
    for (index, (parent_index, line_depth, label)) in lines.iter().enumerate() {
        let is_child = match parent {
            None => *line_depth == 0,
            Some(p) => *line_depth == depth && *parent_index == p,
        };
        if is_child {
            println!("{}{label}", "  ".repeat(depth));
            print_subtree(lines, Some(index), depth + 1);
        }
    }
}

/// Main entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args.parse_log_level()?;
    init_tracing(log_level)?;

    if matches!(args.command, Command::Config) {
        return config::configure();
    }

    let workspace = args.workspace.canonicalize().context(format!(
        "failed to canonicalize workspace path: {}",
        args.workspace.display()
    ))?;
    let settings = Settings::load(&args.settings_path())?;

    info!(
        workspace = %workspace.display(),
        server = %settings.server.command,
        "starting rclang client"
    );

    let client = Arc::new(
        settings
            .client_builder(&workspace)
            .build()
            .await
            .context("failed to start LSP client")?,
    );
    let events = client
        .take_events()
        .await
        .context("server event stream already taken")?;

    let mut host = TerminalHost::new();
    if let Command::Preview { out: Some(out), .. } = &args.command {
        host = host.with_preview_output(out);
    }
    let extension = Extension::activate(Arc::clone(&client), Arc::new(host), &settings);

    match args.command {
        // Handled before connecting
        Command::Config => {}
        Command::Preview { file, .. } => {
            client.did_open(&file).await?;
            extension
                .execute_command(EditorCommand::StartIrPreview { path: file })
                .await?;
        }
        Command::Tree { view_id, depth } => {
            print_tree(extension.tree_views(), &view_id, depth).await?;
        }
        Command::Reveal { file, line, column } => {
            let uri = client.did_open(&file).await?;
            let params = TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: to_lsp_position(line, column)?,
            };
            if extension.tree_views().reveal(params).await?.is_none() {
                println!("no tree node at {}:{line}:{column}", file.display());
            }
        }
        Command::Run => {
            info!("waiting for server pushes, press Ctrl-C to stop");
            tokio::select! {
                () = extension.run_events(events) => {}
                result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl-C")?,
            }
        }
    }

    extension.deactivate().await;
    client.shutdown().await?;
    info!("rclang client shut down gracefully");

    Ok(())
}
