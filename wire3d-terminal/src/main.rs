/// wire3d Terminal Demo - wireframe scenes in the terminal
///
/// Controls:
///   - WASD / Arrow Keys: Rotate
///   - O: Toggle orthographic / perspective
///   - Mouse click: Fire (shooter demo)
///   - Q/ESC: Quit
use clap::Parser;
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wire3d_terminal::{AppConfig, TerminalApp};

fn main() -> io::Result<()> {
    let config = AppConfig::parse();

    // Logs go to stderr so they can be redirected away from the alternate screen
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    tracing::info!(demo = ?config.demo, ortho = config.ortho, "starting terminal renderer");

    let mut app = TerminalApp::new(&config)?;
    app.run()
}
