pub mod items;
pub mod monsters;
pub mod spawn_tables;

use items::ItemKind;

pub const WELCOME_MESSAGE: &str = "Hello and welcome, adventurer, to yet another dungeon!";

/// Gear a new player starts with, equipped.
pub fn starting_gear() -> Vec<ItemKind> {
    vec![ItemKind::Dagger, ItemKind::LeatherArmor]
}
