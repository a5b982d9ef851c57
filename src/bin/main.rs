use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flipbook::{core::config::Config, Studio};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt};

fn main() {
    if let Err(e) = run_demo() {
        eprintln!("Demo session failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Runs a headless editing session: draws a small three-frame bouncing
/// dot animation, previews one playback cycle and exports the result as
/// GIF plus a PNG preview of the first frame.
#[tracing::instrument(level = "info")]
fn run_demo() -> Result<()> {
    setup_logging().context("Failed to set up logging for demo session")?;

    let config_path = Path::new("./flipbook.toml");
    let config = if config_path.is_file() {
        Config::load(config_path).context("Failed to load config")?
    } else {
        Config::default()
    };

    info!("Starting flipbook demo session.");

    let mut studio = Studio::new(config).context("Failed to create studio session")?;

    draw_bouncing_dot(&mut studio).context("Failed to draw demo animation")?;
    preview_playback(&mut studio).context("Failed to preview playback")?;
    let exported = export(&studio).context("Failed to export demo animation")?;

    info!("Demo animation exported to {}", exported.display());
    Ok(())
}

/// Three frames of a dot falling toward a ground line, drawn through the
/// same pointer events a host would deliver.
#[tracing::instrument(level = "debug", skip(studio))]
fn draw_bouncing_dot(studio: &mut Studio) -> Result<()> {
    studio.set_brush_size(4)?;

    let drops = [(128.0, 96.0), (256.0, 224.0), (384.0, 336.0)];
    for (index, (x, y)) in drops.into_iter().enumerate() {
        studio.select_frame(index)?;

        studio.pointer_down(x, y)?;
        studio.pointer_up();

        // Ground line shared by every frame.
        studio.pointer_down(32.0, 352.0)?;
        studio.pointer_move(480.0, 352.0)?;
        studio.pointer_up();
    }

    studio.select_frame(0)?;
    Ok(())
}

/// Steps the player through one full cycle at the configured frame rate.
#[tracing::instrument(level = "debug", skip(studio))]
fn preview_playback(studio: &mut Studio) -> Result<()> {
    studio.start_playback()?;
    for _ in 0..studio.editor.frame_count() {
        if let Some(interval) = studio.player.interval() {
            std::thread::sleep(interval);
        }
        studio.tick()?;
    }
    studio.stop_playback()?;
    Ok(())
}

#[tracing::instrument(level = "debug", skip(studio))]
fn export(studio: &Studio) -> Result<PathBuf> {
    let out_dir = Path::new("./out");
    std::fs::create_dir_all(out_dir).context("Failed to create output directory")?;

    let file_stem = &studio.config().export.file_stem;
    let gif_path = out_dir.join(format!("{file_stem}.gif"));
    let png_path = out_dir.join(format!("{file_stem}-preview.png"));

    let mut on_progress = |fraction: f32| {
        info!("Export progress: {:.0}%", fraction * 100.0);
    };
    studio
        .export_gif(Some(&gif_path), Some(&mut on_progress))
        .with_context(|| format!("Failed to write '{}'", gif_path.display()))?;
    studio
        .export_frame(0, Some(&png_path))
        .with_context(|| format!("Failed to write '{}'", png_path.display()))?;

    Ok(gif_path)
}

#[tracing::instrument(level = "debug")]
fn setup_logging() -> Result<()> {
    // Try to set up file logging, fall back to stdout-only if it fails
    if let Err(e) = try_setup_file_logging() {
        eprintln!(
            "Warning: Could not set up file logging ({}), using stdout only",
            e
        );
        setup_stdout_logging()?;
    }

    Ok(())
}

#[tracing::instrument(level = "debug")]
fn setup_stdout_logging() -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_thread_names(true)
            .with_ansi(true),
    );

    tracing::subscriber::set_global_default(subscriber)
        .with_context(|| "Failed to set up stdout logging")?;

    Ok(())
}

#[tracing::instrument(level = "debug")]
fn try_setup_file_logging() -> Result<()> {
    let file_appender = tracing_appender::rolling::daily("./logs", "flipbook.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Store the guard to prevent it from being dropped
    std::mem::forget(_guard);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_thread_names(true)
                .with_ansi(true),
        )
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_thread_names(true)
                .with_line_number(true)
                .fmt_fields(fmt::format::PrettyFields::new())
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .with_context(|| "Failed to set up file logging")?;

    Ok(())
}
