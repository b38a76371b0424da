use bracket_color::prelude::RGB;
use serde::{Deserialize, Serialize};

/// Message colours, as `(r, g, b)` like the `bracket-color` named constants.
pub mod palette {
    pub const WHITE: (u8, u8, u8) = (255, 255, 255);
    pub const PLAYER_ATK: (u8, u8, u8) = (224, 224, 224);
    pub const ENEMY_ATK: (u8, u8, u8) = (255, 192, 192);
    pub const PLAYER_DIE: (u8, u8, u8) = (255, 48, 48);
    pub const ENEMY_DIE: (u8, u8, u8) = (255, 160, 48);
    pub const STATUS_EFFECT_APPLIED: (u8, u8, u8) = (63, 255, 63);
    pub const HEALTH_RECOVERED: (u8, u8, u8) = (0, 255, 0);
    pub const DESCEND: (u8, u8, u8) = (159, 63, 255);
    pub const IMPOSSIBLE: (u8, u8, u8) = (128, 128, 128);
    pub const ERROR: (u8, u8, u8) = (255, 64, 64);
    pub const WELCOME_TEXT: (u8, u8, u8) = (32, 160, 255);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: RGB,
    pub count: u32,
}

impl Message {
    /// Text with a repeat counter once the message has stacked.
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.text, self.count)
        } else {
            self.text.clone()
        }
    }
}

/// Everything the simulation has told the player, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl MessageLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn from_messages(messages: Vec<Message>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        let skip = messages.len().saturating_sub(log.capacity);
        log.messages = messages.into_iter().skip(skip).collect();
        log
    }

    /// Appends a message, stacking it onto the previous one if the text repeats.
    pub fn push<S: Into<String>>(&mut self, text: S, color: (u8, u8, u8)) {
        let text = text.into();
        tracing::debug!(target: "tombdelve::messages", "{text}");
        if let Some(last) = self.messages.last_mut() {
            if last.text == text {
                last.count += 1;
                return;
            }
        }
        self.messages.push(Message {
            text,
            color: RGB::named(color),
            count: 1,
        });
        if self.messages.len() > self.capacity {
            let overflow = self.messages.len() - self.capacity;
            self.messages.drain(..overflow);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_stack_with_a_counter() {
        let mut log = MessageLog::default();
        log.push("The Orc attacks Player for 2 hit points.", palette::ENEMY_ATK);
        log.push("The Orc attacks Player for 2 hit points.", palette::ENEMY_ATK);
        log.push("The Orc attacks Player for 2 hit points.", palette::ENEMY_ATK);
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.messages()[0].full_text(),
            "The Orc attacks Player for 2 hit points. (x3)"
        );
    }

    #[test]
    fn different_text_breaks_the_stack() {
        let mut log = MessageLog::default();
        log.push("a", palette::WHITE);
        log.push("b", palette::WHITE);
        log.push("a", palette::WHITE);
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().map(Message::full_text).as_deref(), Some("a"));
    }

    #[test]
    fn history_is_capped() {
        let mut log = MessageLog::with_capacity(3);
        for index in 0..5 {
            log.push(format!("message {index}"), palette::WHITE);
        }
        let texts: Vec<&str> = log.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["message 2", "message 3", "message 4"]);
    }
}
