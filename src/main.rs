use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

use ayurbot_chat::client::HttpChatBackend;
use ayurbot_chat::config::WidgetConfig;
use ayurbot_chat::context_store::FileContextStore;
use ayurbot_chat::error::Result;
use ayurbot_chat::panel_fsm::PanelAction;
use ayurbot_chat::terminal::{self, TerminalSurface};
use ayurbot_chat::widget::ChatWidget;
use ayurbot_chat::{logging, runtime_paths};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("AYURBOT_GIT_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "ayurbot-chat")]
#[command(about = "Terminal front end for the AyurBot chat widget")]
#[command(version = VERSION)]
struct Cli {
    /// Config file; defaults to config.json under the app data dir.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "AYURBOT_SERVER")]
    server: Option<String>,

    /// Local storage file holding the stored result blob.
    #[arg(long, env = "AYURBOT_STORAGE")]
    storage: Option<PathBuf>,

    #[arg(long)]
    context_key: Option<String>,

    /// Start with the panel expanded.
    #[arg(long, default_value_t = false)]
    open: bool,

    #[arg(long, default_value_t = false)]
    no_color: bool,
}

fn resolve_config(cli: &Cli) -> Result<WidgetConfig> {
    let mut config = match &cli.config {
        Some(path) => WidgetConfig::load(path)?,
        None => WidgetConfig::load_or_default(&runtime_paths::default_config_path())?,
    };
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(storage) = &cli.storage {
        config.storage_path = Some(storage.clone());
    }
    if let Some(key) = &cli.context_key {
        config.context_key = key.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing("ayurbot_chat");
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let storage_path = config.resolved_storage_path();
    tracing::info!(
        chat_url = %config.chat_url(),
        storage = %storage_path.display(),
        "starting chat widget"
    );

    let stdout = std::io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let mut widget = ChatWidget::new(
        &config,
        TerminalSurface::new(stdout, color),
        Arc::new(HttpChatBackend::from_config(&config)),
        Arc::new(FileContextStore::new(storage_path)),
    );
    if cli.open {
        widget.dispatch(PanelAction::ToggleOpen);
    }
    eprintln!("Commands: /open toggles the panel, /max toggles size, /quit exits.");

    terminal::run(&mut widget, BufReader::new(tokio::io::stdin())).await
}
