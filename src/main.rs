use engine::{Game, GameConfig};
use tracing_subscriber::EnvFilter;

mod ui;

fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，避免和棋盘输出混在一起
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig {
        allow_self_check: std::env::var("CHESS_ALLOW_SELF_CHECK")
            .map(|v| is_enabled(&v))
            .unwrap_or(false),
    };
    tracing::info!(?config, "starting game");

    let game = Game::with_config(config);
    ui::ui(game)?;
    Ok(())
}

fn is_enabled(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
