use std::path::PathBuf;

use tombdelve::{GameConfig, GameState, Session, scripted_input::ScriptedInput};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SAVE: &str = "tombdelve-save.json";

/// Replays a key script against a new game, prints the message log and saves
/// the final state.
///
/// Usage: `tombdelve <script> [config.json] [save.json]`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let script_path = args
        .next()
        .ok_or("usage: tombdelve <script> [config.json] [save.json]")?;
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let save_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE));

    let mut script = ScriptedInput::from_file(&script_path)?;
    info!(script = %script_path, keys = script.len(), "script loaded");

    let mut session = Session::new(config)?;
    while let Some(key) = script.next_key() {
        key.apply(&mut session)?;
        if session.state() == GameState::GameOver {
            info!(turn = session.turn(), "player died");
            break;
        }
    }

    for message in session.messages() {
        println!("{}", message.full_text());
    }
    if let Some((hp, max_hp)) = session.player_hp() {
        println!(
            "Floor {} | HP {hp}/{max_hp} | Turn {} | {:?}",
            session.floor().0,
            session.turn(),
            session.state()
        );
    }

    session.save_to(&save_path)?;
    Ok(())
}
