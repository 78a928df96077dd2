use callpad::config::Config;
use callpad::domain::device::DeviceOptions;
use callpad::domain::settings::SettingsStore;
use callpad::infrastructure::provider::LoopbackProvider;
use callpad::infrastructure::settings::TomlFileSettingsStore;
use callpad::infrastructure::token::HttpTokenProvider;
use callpad::interface::console::{parse_command, ConsoleCommand, HELP};
use callpad::interface::{ConsolePresenter, Popup, PopupCommand};
use callpad::CallSessionController;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    // Initialize tracing; stdout belongs to the popup view
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting callpad");
    info!("Configuration loaded: {:?}", config);

    let settings: Arc<dyn SettingsStore> =
        Arc::new(TomlFileSettingsStore::new(&config.popup.settings_path));
    let tokens = Arc::new(HttpTokenProvider::new(config.popup.token_timeout())?);
    let provider = LoopbackProvider::new().with_auto_answer(config.loopback.auto_answer);

    let controller = CallSessionController::new(
        tokens,
        Arc::new(provider.clone()),
        DeviceOptions {
            debug: config.popup.debug_provider,
        },
    );
    let mut popup = Popup::load(controller, settings, Box::new(ConsolePresenter::stdout())).await;

    let (tx, rx) = mpsc::channel(16);
    let input = tokio::spawn(read_console(provider, tx));

    popup.run(rx).await;
    input.await?;

    info!("Shutting down");
    Ok(())
}

/// Turn stdin lines into popup commands; `sim` lines drive the loopback
/// provider directly.
async fn read_console(provider: LoopbackProvider, commands: mpsc::Sender<PopupCommand>) {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(ConsoleCommand::Help)) => println!("{}", HELP),
            Ok(Some(ConsoleCommand::Simulate(simulation))) => simulation.apply(&provider),
            Ok(Some(ConsoleCommand::Popup(command))) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Err(e) => println!("{}", e),
        }
    }
}
