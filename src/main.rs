mod api_client; mod app; mod chips; mod config; mod dashboard; mod fetcher; mod history; mod logging; mod stats; mod storage; mod suggest; mod ui;

use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::info;

use api_client::{HttpApi, WordApi};
use app::{AutocompleteApp, UiEvent};
use config::Config;
use history::HistoryStore;
use storage::LocalStorage;

#[derive(Parser)]
#[command(name = "wordchips", version, about = "Autocomplete chips and word-frequency leaderboards")]
struct Cli {
    /// Backend base URL (overrides config and WORDCHIPS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Type with suggestion chips (default)
    Type,
    /// Show the top words per script
    Dashboard {
        /// Print the tables and exit instead of opening the TUI
        #[arg(long)]
        once: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let _log_guard = logging::init_tracing(&config.log_dir)?;

    let rt = Arc::new(Runtime::new()?);
    let http = HttpApi::new(&config.api_url, config.request_timeout()).context("failed to build HTTP client")?;
    info!(api = %http.base_url(), "wordchips starting");
    let api: Arc<dyn WordApi> = Arc::new(http);

    match cli.command.unwrap_or(Command::Type) {
        Command::Type => {
            let (tx, rx) = mpsc::channel::<UiEvent>();
            let history = HistoryStore::new(LocalStorage::open(config.storage_path.clone()), config.history_cap);
            let app = AutocompleteApp::new(api, history, rt.handle().clone(), config.debounce(), config.max_chips, tx);
            ui::run_loop(app, rx)
        }
        Command::Dashboard { once: true } => {
            let boards = rt.block_on(stats::load_leaderboards(api.as_ref(), config.leaderboard_size));
            println!("{}", dashboard::print_once(&boards));
            Ok(())
        }
        Command::Dashboard { once: false } => {
            let (tx, rx) = mpsc::channel();
            let top_n = config.leaderboard_size;
            rt.spawn(async move {
                let boards = stats::load_leaderboards(api.as_ref(), top_n).await;
                let _ = tx.send(boards);
            });
            dashboard::run_dashboard(rx)
        }
    }
}
