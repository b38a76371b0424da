use bracket_color::prelude::RGB;

use crate::ecs::components::Ai;

/// Stat block for anything that fights: the player and every monster.
#[derive(Clone, Debug)]
pub struct ActorTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
    pub inventory_capacity: usize,
    pub level_up_base: i32,
    pub xp_given: i32,
    pub ai: Ai,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MonsterKind {
    Orc,
    Troll,
}

impl MonsterKind {
    pub fn template(self) -> ActorTemplate {
        match self {
            MonsterKind::Orc => {
                ActorTemplate::monster("Orc", 'o', RGB::from_u8(63, 127, 63), 10, 3, 0, 35)
            }
            MonsterKind::Troll => {
                ActorTemplate::monster("Troll", 'T', RGB::from_u8(0, 127, 0), 16, 4, 1, 100)
            }
        }
    }
}

impl ActorTemplate {
    pub fn player() -> Self {
        Self {
            name: "Player",
            glyph: '@',
            color: RGB::from_u8(255, 255, 255),
            hp: 30,
            power: 2,
            defense: 1,
            inventory_capacity: 26,
            level_up_base: 200,
            xp_given: 0,
            ai: Ai::Idle,
        }
    }

    fn monster(
        name: &'static str,
        glyph: char,
        color: RGB,
        hp: i32,
        power: i32,
        defense: i32,
        xp_given: i32,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            hp,
            power,
            defense,
            inventory_capacity: 0,
            level_up_base: 0,
            xp_given,
            ai: Ai::hostile(),
        }
    }
}
