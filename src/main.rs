//! # askcorp CLI
//!
//! Terminal client for the document question-answering service: upload
//! PDFs, track their indexing status, and ask questions answered with
//! citations.
//!
//! ## Usage
//!
//! ```bash
//! askcorp --config ./askcorp.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askcorp settings` | Show endpoints, model and model badge |
//! | `askcorp settings set` | Update one or more settings |
//! | `askcorp upload <PATH>...` | Upload PDF files |
//! | `askcorp docs` | List uploaded documents, newest first |
//! | `askcorp ask "<question>"` | Ask one question |
//! | `askcorp chat` | Interactive chat session |
//! | `askcorp completions <SHELL>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! askcorp settings set --presign-url https://rag.example.com/presign \
//!     --query-url https://rag.example.com/query
//! askcorp upload ./policies/*.pdf
//! askcorp ask "What does the travel policy cover?"
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askcorp::app::App;
use askcorp::chat::{self, SubmitOutcome};
use askcorp::config;
use askcorp::models::DocStatus;
use askcorp::progress::FeedbackMode;
use askcorp::render;
use askcorp::settings::Settings;
use askcorp::storage::SqliteStore;
use askcorp::upload::{self, PickedFile, UploadReport};

/// askcorp: upload documents and ask questions about them.
///
/// Settings and the document list are kept in a local SQLite file (see
/// `[storage]` in the config file).
#[derive(Parser)]
#[command(
    name = "askcorp",
    about = "Upload PDF documents and ask questions answered with citations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). A missing file means defaults.
    #[arg(long, global = true, default_value = "./askcorp.toml")]
    config: PathBuf,

    /// Notification and progress output on stderr.
    ///
    /// Defaults to `human` when stderr is a terminal, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    feedback: Option<FeedbackMode>,

    /// Log pipeline activity (equivalent to `RUST_LOG=askcorp=info`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change endpoint and model settings.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Upload PDF files.
    ///
    /// Non-PDF files are skipped. The command waits until uploaded
    /// documents have moved to `indexed` before exiting.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List uploaded documents, newest first.
    Docs {
        /// Print an HTML fragment instead of a table.
        #[arg(long)]
        html: bool,
    },

    /// Ask a single question.
    Ask {
        question: String,

        /// Print the answer as an HTML fragment.
        #[arg(long)]
        html: bool,
    },

    /// Interactive chat. `/docs`, `/settings` and `/quit` are available.
    Chat,

    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Update settings. Fields not given keep their current value.
    Set {
        #[arg(long)]
        query_url: Option<String>,

        #[arg(long)]
        presign_url: Option<String>,

        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "askcorp=info"
    } else {
        "askcorp=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "askcorp", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    let feedback = cli.feedback.unwrap_or_else(FeedbackMode::default_for_tty);
    let store = Arc::new(SqliteStore::open(&cfg).await?);
    let app = App::start(cfg, store.clone(), feedback).await?;

    let ok = match cli.command {
        Commands::Settings { action } => match action {
            None => {
                print_settings(&app.settings());
                true
            }
            Some(SettingsAction::Set {
                query_url,
                presign_url,
                model,
            }) => {
                let mut form = app.open_settings();
                if let Some(v) = query_url {
                    form.query_url = v;
                }
                if let Some(v) = presign_url {
                    form.presign_url = v;
                }
                if let Some(v) = model {
                    form.model = v;
                }
                let saved = app.save_settings(form).await?;
                println!("Settings saved.");
                print_settings(&saved);
                true
            }
        },
        Commands::Upload { paths } => run_upload(&app, &paths).await?,
        Commands::Docs { html } => {
            let view = app.document_view().await;
            if html {
                println!("{}", render::documents_html(&view));
            } else {
                print!("{}", render::documents_text(&view));
            }
            true
        }
        Commands::Ask { question, html } => run_ask(&app, &question, html).await,
        Commands::Chat => {
            run_chat(&app).await?;
            true
        }
        Commands::Completions { .. } => true,
    };

    app.settle().await;
    store.close().await;

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn print_settings(settings: &Settings) {
    let show = |v: &str| {
        if v.is_empty() {
            "(not set)".to_string()
        } else {
            v.to_string()
        }
    };
    println!("query_url:   {}", show(&settings.query_url));
    println!("presign_url: {}", show(&settings.presign_url));
    println!("model:       {}", settings.model);
    println!("badge:       {}", settings.model_badge());
}

fn print_configuration_hint() {
    eprintln!(
        "Run `askcorp settings set --query-url <URL> --presign-url <URL>` to configure endpoints."
    );
}

async fn run_upload(app: &App, paths: &[PathBuf]) -> Result<bool> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match PickedFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                eprintln!("Error: cannot read {}: {}", path.display(), e);
                return Ok(false);
            }
        }
    }

    match upload::handle_files(app, files).await {
        UploadReport::NoPdfFiles { rejected } => {
            eprintln!("Error: Only PDF files are supported (skipped: {})", rejected.join(", "));
            Ok(false)
        }
        UploadReport::NeedsConfiguration => {
            eprintln!("Error: no presign endpoint configured.");
            print_configuration_hint();
            Ok(false)
        }
        report @ UploadReport::Completed { .. } => {
            let ok = report.is_success();
            if let UploadReport::Completed { uploaded, rejected } = &report {
                for name in rejected {
                    println!("skipped  {}", name);
                }
                for result in uploaded {
                    match &result.error {
                        None => println!("{:<9}{}  ({})", "uploaded", result.name, result.id),
                        Some(e) => println!("{:<9}{}  {}", "failed", result.name, e),
                    }
                }
                let pending = uploaded
                    .iter()
                    .filter(|u| u.status == DocStatus::Processing)
                    .count();
                if pending > 0 {
                    eprintln!("Waiting for {} document(s) to finish indexing...", pending);
                }
            }
            Ok(ok)
        }
    }
}

async fn run_ask(app: &App, question: &str, html: bool) -> bool {
    match chat::submit_query(app, question).await {
        SubmitOutcome::Answered(entry) => {
            if html {
                println!("{}", render::entry_html(&entry));
            } else {
                print!("{}", render::entry_text(&entry));
            }
            true
        }
        SubmitOutcome::Failed(entry) => {
            if html {
                println!("{}", render::entry_html(&entry));
            } else {
                eprint!("{}", render::entry_text(&entry));
            }
            false
        }
        SubmitOutcome::NeedsConfiguration => {
            eprintln!("Error: no query endpoint configured.");
            print_configuration_hint();
            false
        }
        SubmitOutcome::Ignored(_) => {
            eprintln!("Error: question is empty.");
            false
        }
    }
}

async fn run_chat(app: &App) -> Result<()> {
    println!(
        "askcorp chat ({}). Type a question, /docs, /settings or /quit.",
        app.model_badge()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/docs" => print!("{}", render::documents_text(&app.document_view().await)),
            "/settings" => print_settings(&app.settings()),
            input => {
                if !input.is_empty() && app.can_submit() {
                    eprintln!("{}", render::THINKING);
                }
                match chat::submit_query(app, input).await {
                    SubmitOutcome::Answered(entry) => print!("{}", render::entry_text(&entry)),
                    SubmitOutcome::Failed(entry) => print!("{}", render::entry_text(&entry)),
                    SubmitOutcome::NeedsConfiguration => {
                        app.close_settings();
                        print_configuration_hint();
                    }
                    SubmitOutcome::Ignored(_) => {}
                }
            }
        }
    }
    Ok(())
}
