//! Input command mapping
//!
//! Keyboard and touch both reduce to the same payload-free command set, so
//! phase gating lives in one place ([`crate::sim::GameState::apply`]) and
//! every input source gets identical rules.

/// A discrete player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Jump,
    Slide,
    TogglePause,
    Start,
    Restart,
}

/// Map a DOM `KeyboardEvent.key` value to a command
///
/// Bindings: arrows or WASD to steer, Space/Up/W to jump, Down/S to slide,
/// P or Escape to pause, Enter to start, R to restart after a crash.
pub fn command_for_key(key: &str) -> Option<Command> {
    Some(match key {
        "ArrowLeft" | "a" | "A" => Command::MoveLeft,
        "ArrowRight" | "d" | "D" => Command::MoveRight,
        "ArrowUp" | "w" | "W" | " " => Command::Jump,
        "ArrowDown" | "s" | "S" => Command::Slide,
        "Escape" | "p" | "P" => Command::TogglePause,
        "Enter" => Command::Start,
        "r" | "R" => Command::Restart,
        _ => return None,
    })
}
