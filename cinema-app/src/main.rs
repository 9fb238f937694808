use anyhow::Context;
use cinema_app::notifications::NotificationKind;
use cinema_app::{App, Cli};
use cinema_store::app_config::Config;
use cinema_store::RootStore;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinema_app=info,cinema_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir)
        .with_context(|| format!("Failed to load config from {}", cli.config_dir.display()))?;
    tracing::debug!(base_url = %config.api.base_url, "Config loaded");

    let root = RootStore::from_config(&config).context("Failed to build backend client")?;
    let app = App::new(Arc::new(root), cli.json);

    let mut stdout = std::io::stdout();
    let result = app.run(cli.command, &mut stdout).await;

    for notification in app.drain_notifications() {
        let label = match notification.kind {
            NotificationKind::Success => "OK",
            NotificationKind::Info => "INFO",
            NotificationKind::Warning => "WARN",
            NotificationKind::Error => "ERROR",
        };
        eprintln!("[{}] {}", label, notification.message);
    }
    if app.needs_login() {
        eprintln!("Сессия истекла, войдите снова: cinema login <имя>");
    }

    result.map_err(anyhow::Error::from)
}
