//! Main application entry point.

use linkboard_app::{SessionError, SessionScript, replay};
use linkboard_core::EditorConfig;

fn main() {
    env_logger::init();
    log::info!("Starting Linkboard");

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("linkboard: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), SessionError> {
    let mut args = std::env::args().skip(1);
    let session_path = args
        .next()
        .ok_or_else(|| SessionError::Usage("linkboard <session.json> [config.json]".to_string()))?;

    let config = match args.next() {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let script = SessionScript::load(&session_path)?;
    let document = replay(&script, config)?;
    println!("{}", document.to_json()?);
    Ok(())
}
