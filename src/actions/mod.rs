//! Validated game commands.
//!
//! Every command either succeeds and mutates the session, or returns an
//! [`ActionFailure`] having changed nothing.

mod items;

use bracket_geometry::prelude::Point;
use specs::Entity;

use crate::{ecs::resources::palette, error::ActionFailure, session::Session};

/// One discrete thing an actor can attempt on its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Wait,
    Move { dx: i32, dy: i32 },
    /// Attack whoever stands there, otherwise step there.
    Bump { dx: i32, dy: i32 },
    Melee { dx: i32, dy: i32 },
    PickUp,
    Drop { item: Entity },
    /// `target` defaults to the user's own tile.
    UseItem { item: Entity, target: Option<Point> },
    Equip { item: Entity },
    DescendStairs,
}

impl Command {
    pub const fn bump(dx: i32, dy: i32) -> Self {
        Command::Bump { dx, dy }
    }
}

pub fn execute(session: &mut Session, actor: Entity, command: &Command) -> Result<(), ActionFailure> {
    if !session.ecs.is_alive(actor) {
        return Err(ActionFailure::CannotAct);
    }
    match *command {
        Command::Wait => Ok(()),
        Command::Move { dx, dy } => move_by(session, actor, dx, dy),
        Command::Bump { dx, dy } => bump(session, actor, dx, dy),
        Command::Melee { dx, dy } => melee(session, actor, dx, dy),
        Command::PickUp => items::pick_up(session, actor),
        Command::Drop { item } => items::drop_item(session, actor, item),
        Command::UseItem { item, target } => items::use_item(session, actor, item, target),
        Command::Equip { item } => items::toggle_equip(session, actor, item),
        Command::DescendStairs => descend(session, actor),
    }
}

fn actor_point(session: &Session, actor: Entity) -> Result<Point, ActionFailure> {
    session.ecs.position(actor).ok_or(ActionFailure::CannotAct)
}

fn destination(session: &Session, actor: Entity, dx: i32, dy: i32) -> Result<Point, ActionFailure> {
    let origin = actor_point(session, actor)?;
    Ok(Point::new(origin.x + dx, origin.y + dy))
}

fn move_by(session: &mut Session, actor: Entity, dx: i32, dy: i32) -> Result<(), ActionFailure> {
    let dest = destination(session, actor, dx, dy)?;
    if !session.map.is_walkable(dest) || session.ecs.blocking_entity_at(dest).is_some() {
        return Err(ActionFailure::Blocked);
    }
    session.ecs.set_position(actor, dest);
    Ok(())
}

fn bump(session: &mut Session, actor: Entity, dx: i32, dy: i32) -> Result<(), ActionFailure> {
    let dest = destination(session, actor, dx, dy)?;
    match session.ecs.actor_at(dest) {
        Some(target) if target != actor => melee(session, actor, dx, dy),
        _ => move_by(session, actor, dx, dy),
    }
}

fn melee(session: &mut Session, actor: Entity, dx: i32, dy: i32) -> Result<(), ActionFailure> {
    let dest = destination(session, actor, dx, dy)?;
    let target = session
        .ecs
        .actor_at(dest)
        .filter(|target| *target != actor)
        .ok_or(ActionFailure::NothingToAttack)?;

    let damage = session.ecs.effective_power(actor) - session.ecs.effective_defense(target);
    let description = format!(
        "{} attacks {}",
        capitalize(&session.ecs.name(actor)),
        session.ecs.name(target)
    );
    let color = if session.ecs.is_player(actor) {
        palette::PLAYER_ATK
    } else {
        palette::ENEMY_ATK
    };

    if damage > 0 {
        session
            .ecs
            .message(format!("{description} for {damage} hit points."), color);
        session.ecs.take_damage(target, damage);
    } else {
        session
            .ecs
            .message(format!("{description} but does no damage."), color);
    }
    Ok(())
}

fn descend(session: &mut Session, actor: Entity) -> Result<(), ActionFailure> {
    let here = actor_point(session, actor)?;
    if session.map.downstairs() != Some(here) {
        return Err(ActionFailure::NoStairsHere);
    }
    session.descend();
    session
        .ecs
        .message("You descend the staircase.", palette::DESCEND);
    Ok(())
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::capitalize;

    #[test]
    fn capitalize_only_touches_the_first_letter() {
        assert_eq!(capitalize("remains of Orc"), "Remains of Orc");
        assert_eq!(capitalize("Troll"), "Troll");
        assert_eq!(capitalize(""), "");
    }
}
