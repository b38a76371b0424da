use bracket_color::prelude::RGB;

use crate::ecs::components::{Consumable, EquipSlot, Equippable};

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub consumable: Option<Consumable>,
    pub equippable: Option<Equippable>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    HealthPotion,
    ConfusionScroll,
    FireballScroll,
    LightningScroll,
    Dagger,
    Sword,
    LeatherArmor,
    ChainMail,
}

impl ItemKind {
    pub fn template(self) -> ItemTemplate {
        match self {
            ItemKind::HealthPotion => ItemTemplate::consumable(
                "Health Potion",
                '!',
                RGB::from_u8(127, 0, 255),
                Consumable::Healing { amount: 4 },
            ),
            ItemKind::ConfusionScroll => ItemTemplate::consumable(
                "Confusion Scroll",
                '~',
                RGB::from_u8(207, 63, 255),
                Consumable::Confusion { turns: 10 },
            ),
            ItemKind::FireballScroll => ItemTemplate::consumable(
                "Fireball Scroll",
                '~',
                RGB::from_u8(255, 0, 0),
                Consumable::Fireball {
                    damage: 12,
                    radius: 3,
                },
            ),
            ItemKind::LightningScroll => ItemTemplate::consumable(
                "Lightning Scroll",
                '~',
                RGB::from_u8(255, 255, 0),
                Consumable::Lightning {
                    damage: 20,
                    max_range: 5,
                },
            ),
            ItemKind::Dagger => ItemTemplate::gear("Dagger", '/', EquipSlot::Weapon, 2, 0),
            ItemKind::Sword => ItemTemplate::gear("Sword", '/', EquipSlot::Weapon, 4, 0),
            ItemKind::LeatherArmor => {
                ItemTemplate::gear("Leather Armor", '[', EquipSlot::Armor, 0, 1)
            }
            ItemKind::ChainMail => ItemTemplate::gear("Chain Mail", '[', EquipSlot::Armor, 0, 3),
        }
    }
}

impl ItemTemplate {
    pub const fn consumable(
        name: &'static str,
        glyph: char,
        color: RGB,
        effect: Consumable,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            consumable: Some(effect),
            equippable: None,
        }
    }

    fn gear(
        name: &'static str,
        glyph: char,
        slot: EquipSlot,
        power_bonus: i32,
        defense_bonus: i32,
    ) -> Self {
        Self {
            name,
            glyph,
            color: RGB::from_u8(0, 191, 255),
            consumable: None,
            equippable: Some(Equippable {
                slot,
                power_bonus,
                defense_bonus,
            }),
        }
    }
}
