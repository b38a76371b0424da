use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    actions::Command,
    ecs::components::LevelUpChoice,
    error::GameError,
    session::{Session, TurnOutcome},
};

/// One keypress worth of player intent, resolved against the session when
/// it is replayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptedKey {
    Bump { dx: i32, dy: i32 },
    Wait,
    PickUp,
    Descend,
    /// Zero-based inventory slot.
    Use(usize),
    Drop(usize),
    Equip(usize),
    LevelUp(LevelUpChoice),
}

pub struct ScriptedInput {
    script_commands: Vec<ScriptedKey>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        Ok(Self::parse(&lines.join("\n")))
    }

    pub fn parse(text: &str) -> Self {
        let mut script_commands = Vec::new();

        for line in text.lines() {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }

            let mut chars = trimmed_line.chars().filter(|c| !c.is_whitespace());
            while let Some(c) = chars.next() {
                let key = match c {
                    'd' => chars.next().and_then(slot_of).map(ScriptedKey::Drop),
                    'e' => chars.next().and_then(slot_of).map(ScriptedKey::Equip),
                    other => char_to_key(other),
                };
                match key {
                    Some(key) => script_commands.push(key),
                    None => tracing::warn!(key = %c, "unknown key in script"),
                }
            }
        }

        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn next_key(&mut self) -> Option<ScriptedKey> {
        let key = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.script_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script_commands.is_empty()
    }
}

impl ScriptedKey {
    pub fn apply(self, session: &mut Session) -> Result<TurnOutcome, GameError> {
        let command = match self {
            ScriptedKey::Bump { dx, dy } => Command::bump(dx, dy),
            ScriptedKey::Wait => Command::Wait,
            ScriptedKey::PickUp => Command::PickUp,
            ScriptedKey::Descend => Command::DescendStairs,
            ScriptedKey::LevelUp(choice) => return session.choose_level_up(choice),
            ScriptedKey::Use(slot) | ScriptedKey::Drop(slot) | ScriptedKey::Equip(slot) => {
                let Some(item) = session.inventory_item(slot) else {
                    tracing::warn!(slot = slot + 1, "script refers to an empty slot");
                    return Ok(TurnOutcome::Ignored);
                };
                match self {
                    ScriptedKey::Drop(_) => Command::Drop { item },
                    ScriptedKey::Equip(_) => Command::Equip { item },
                    _ => Command::UseItem { item, target: None },
                }
            }
        };
        session.handle_command(command)
    }
}

fn slot_of(c: char) -> Option<usize> {
    match c.to_digit(10)? {
        0 => None,
        digit => Some(digit as usize - 1),
    }
}

fn char_to_key(c: char) -> Option<ScriptedKey> {
    let bump = |dx, dy| Some(ScriptedKey::Bump { dx, dy });
    match c {
        'h' => bump(-1, 0),
        'j' => bump(0, 1),
        'k' => bump(0, -1),
        'l' => bump(1, 0),
        'y' => bump(-1, -1),
        'u' => bump(1, -1),
        'b' => bump(-1, 1),
        'n' => bump(1, 1),
        '.' => Some(ScriptedKey::Wait),
        'g' => Some(ScriptedKey::PickUp),
        '>' => Some(ScriptedKey::Descend),
        'c' => Some(ScriptedKey::LevelUp(LevelUpChoice::Constitution)),
        's' => Some(ScriptedKey::LevelUp(LevelUpChoice::Strength)),
        'a' => Some(ScriptedKey::LevelUp(LevelUpChoice::Agility)),
        digit => slot_of(digit).map(ScriptedKey::Use),
    }
}
