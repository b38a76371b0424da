use bracket_geometry::prelude::{DistanceAlg, Point};
use specs::Entity;

use super::actor_point;
use crate::{
    ecs::{
        components::{Ai, Consumable},
        resources::palette,
    },
    error::ActionFailure,
    session::Session,
};

pub(super) fn pick_up(session: &mut Session, actor: Entity) -> Result<(), ActionFailure> {
    let here = actor_point(session, actor)?;
    let item = session
        .ecs
        .items_at(here)
        .first()
        .copied()
        .ok_or(ActionFailure::NothingToPickUp)?;
    let full = session
        .ecs
        .inventory(actor)
        .is_none_or(|inventory| inventory.is_full());
    if full {
        return Err(ActionFailure::InventoryFull);
    }

    session.ecs.transfer_to_inventory(actor, item);
    let name = session.ecs.name(item);
    session
        .ecs
        .message(format!("You picked up the {name}!"), palette::WHITE);
    Ok(())
}

pub(super) fn drop_item(session: &mut Session, actor: Entity, item: Entity) -> Result<(), ActionFailure> {
    if !session.ecs.holds(actor, item) {
        return Err(ActionFailure::NotCarried);
    }
    let here = actor_point(session, actor)?;
    let name = session.ecs.name(item);
    let equipped = session
        .ecs
        .equipment(actor)
        .is_some_and(|gear| gear.slot_of(item).is_some());
    if equipped {
        session
            .ecs
            .message(format!("You remove the {name}."), palette::WHITE);
    }
    session.ecs.transfer_to_floor(actor, item, here);
    session
        .ecs
        .message(format!("You dropped the {name}."), palette::WHITE);
    Ok(())
}

pub(super) fn toggle_equip(session: &mut Session, actor: Entity, item: Entity) -> Result<(), ActionFailure> {
    if !session.ecs.holds(actor, item) {
        return Err(ActionFailure::NotCarried);
    }
    let equippable = session
        .ecs
        .equippable(item)
        .ok_or(ActionFailure::NotEquippable)?;
    let mut gear = session
        .ecs
        .equipment(actor)
        .ok_or(ActionFailure::NotEquippable)?;

    if gear.slot_of(item).is_some() {
        gear.set_slot(equippable.slot, None);
        let name = session.ecs.name(item);
        session
            .ecs
            .message(format!("You remove the {name}."), palette::WHITE);
    } else {
        if let Some(previous) = gear.slot(equippable.slot) {
            let name = session.ecs.name(previous);
            session
                .ecs
                .message(format!("You remove the {name}."), palette::WHITE);
        }
        gear.set_slot(equippable.slot, Some(item));
        let name = session.ecs.name(item);
        session
            .ecs
            .message(format!("You equip the {name}."), palette::WHITE);
    }
    session.ecs.set_equipment(actor, gear);
    Ok(())
}

pub(super) fn use_item(
    session: &mut Session,
    user: Entity,
    item: Entity,
    target: Option<Point>,
) -> Result<(), ActionFailure> {
    if !session.ecs.holds(user, item) {
        return Err(ActionFailure::NotCarried);
    }
    let effect = session.ecs.consumable(item).ok_or(ActionFailure::NotUsable)?;
    let origin = actor_point(session, user)?;
    let target = target.unwrap_or(origin);
    let item_name = session.ecs.name(item);

    match effect {
        Consumable::Healing { amount } => heal(session, user, &item_name, amount)?,
        Consumable::Confusion { turns } => confuse(session, user, target, turns)?,
        Consumable::Fireball { damage, radius } => fireball(session, target, damage, radius)?,
        Consumable::Lightning { damage, max_range } => {
            lightning(session, user, origin, damage, max_range)?
        }
    }

    session.ecs.consume_item(user, item);
    Ok(())
}

fn heal(session: &mut Session, user: Entity, item_name: &str, amount: i32) -> Result<(), ActionFailure> {
    let stats = session.ecs.stats(user).ok_or(ActionFailure::CannotAct)?;
    if stats.missing_hp() <= 0 {
        return Err(ActionFailure::AlreadyFullHealth);
    }
    let recovered = session.ecs.heal(user, amount);
    session.ecs.message(
        format!("You consume the {item_name}, and recover {recovered} HP!"),
        palette::HEALTH_RECOVERED,
    );
    Ok(())
}

fn confuse(session: &mut Session, user: Entity, target: Point, turns: i32) -> Result<(), ActionFailure> {
    if !session.map.is_visible(target) {
        return Err(ActionFailure::TargetNotVisible);
    }
    let victim = session
        .ecs
        .actor_at(target)
        .ok_or(ActionFailure::NoTargetSelected)?;
    if victim == user {
        return Err(ActionFailure::CannotTargetSelf);
    }
    let previous = session.ecs.ai(victim).ok_or(ActionFailure::NoTargetSelected)?;

    let name = session.ecs.name(victim);
    session.ecs.message(
        format!("The eyes of the {name} look vacant, as it starts to stumble around!"),
        palette::STATUS_EFFECT_APPLIED,
    );
    session.ecs.set_ai(
        victim,
        Ai::Confused {
            turns_remaining: turns,
            previous: Box::new(previous),
        },
    );
    Ok(())
}

fn fireball(session: &mut Session, target: Point, damage: i32, radius: i32) -> Result<(), ActionFailure> {
    if !session.map.is_visible(target) {
        return Err(ActionFailure::TargetNotVisible);
    }
    let caught: Vec<Entity> = session
        .ecs
        .living_actors()
        .into_iter()
        .filter(|(_, point)| DistanceAlg::Pythagoras.distance2d(*point, target) <= radius as f32)
        .map(|(entity, _)| entity)
        .collect();
    if caught.is_empty() {
        return Err(ActionFailure::NoTargetsInRadius);
    }

    for victim in caught {
        let name = session.ecs.name(victim);
        session.ecs.message(
            format!("The {name} is engulfed in a fiery explosion, taking {damage} damage!"),
            palette::PLAYER_ATK,
        );
        session.ecs.take_damage(victim, damage);
    }
    Ok(())
}

fn lightning(
    session: &mut Session,
    user: Entity,
    origin: Point,
    damage: i32,
    max_range: i32,
) -> Result<(), ActionFailure> {
    let mut closest: Option<(Entity, f32)> = None;
    for (candidate, point) in session.ecs.living_actors() {
        if candidate == user || !session.map.is_visible(point) {
            continue;
        }
        let distance = DistanceAlg::Pythagoras.distance2d(origin, point);
        if distance > max_range as f32 {
            continue;
        }
        if closest.is_none_or(|(_, best)| distance < best) {
            closest = Some((candidate, distance));
        }
    }
    let (victim, _) = closest.ok_or(ActionFailure::NoTargetInRange)?;

    let name = session.ecs.name(victim);
    session.ecs.message(
        format!("A lightning bolt strikes the {name} with a loud thunder, for {damage} damage!"),
        palette::PLAYER_ATK,
    );
    session.ecs.take_damage(victim, damage);
    Ok(())
}
