/// gram terminal client - main entry point
use gram_core::Config;
use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod cli_app;
mod tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let args: Vec<String> = env::args().collect();
    let (config, command) = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Full-screen views own the terminal, so their logs go to a file
    let full_screen = matches!(
        command.first().map(|s| s.as_str()),
        Some("stories") | Some("compose")
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if full_screen {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join("gram.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(log))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    cli_app::run(config, command).await
}
