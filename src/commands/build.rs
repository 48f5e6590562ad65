//! Build the static site

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::Vellum;

/// Build the site once
pub fn run(vellum: &Vellum) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(vellum)?;
    generator.generate()?;

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch for file changes and rebuild
pub async fn watch(vellum: &Vellum) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    if vellum.content_dir.exists() {
        watcher.watch(vellum.content_dir.as_ref(), notify::RecursiveMode::Recursive)?;
    }
    if vellum.static_dir.exists() {
        watcher.watch(vellum.static_dir.as_ref(), notify::RecursiveMode::Recursive)?;
    }
    let config_path = vellum.base_dir.join(crate::CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(config_path.as_ref(), notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Debounce: only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, rebuilding...");
                    if let Err(e) = run(vellum) {
                        tracing::error!("Build failed: {}", e);
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Continue waiting
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
