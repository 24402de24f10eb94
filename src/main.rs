use anyhow::Context;
use std::sync::Arc;

use weather_bg_picker::app::App;
use weather_bg_picker::config::Config;
use weather_bg_picker::pipeline::fs_ops::ensure_dir;
use weather_bg_picker::{UnsplashClient, logging};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    ensure_dir(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let (tx, rx) = crossbeam_channel::unbounded();
    logging::init(tx.clone(), config.log_level_filter())?;

    let picker = ratatui_image::picker::Picker::from_query_stdio().unwrap_or_else(|e| {
        eprintln!("Failed to query terminal ({}), using fallback", e);
        ratatui_image::picker::Picker::from_fontsize((8, 16))
    });

    let source = Arc::new(UnsplashClient::new(&config));
    let mut app = App::new(config, picker, source, tx, rx)?;
    app.run()
}
