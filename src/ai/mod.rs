pub mod pathfinding;

use bracket_geometry::prelude::Point;
use specs::Entity;

use crate::{
    actions::{self, Command},
    ecs::{components::Ai, resources::palette},
    error::ActionFailure,
    session::Session,
};

const STUMBLE_DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Gives every living non-player actor one decision. A failed action only
/// forfeits that actor's turn.
pub fn take_enemy_turns(session: &mut Session) {
    let player = session.ecs.player();
    let actors: Vec<Entity> = session
        .ecs
        .living_actors()
        .into_iter()
        .map(|(entity, _)| entity)
        .filter(|entity| *entity != player)
        .collect();

    for actor in actors {
        if !session.ecs.is_alive(actor) {
            continue;
        }
        if let Err(failure) = act(session, actor) {
            tracing::trace!(entity = actor.id(), %failure, "ai action discarded");
        }
    }
}

/// Runs a single decision for `actor` according to its current behaviour.
pub fn act(session: &mut Session, actor: Entity) -> Result<(), ActionFailure> {
    match session.ecs.ai(actor).ok_or(ActionFailure::CannotAct)? {
        Ai::Idle => actions::execute(session, actor, &Command::Wait),
        Ai::Hostile { path } => hostile(session, actor, path),
        Ai::Confused {
            turns_remaining,
            previous,
        } => confused(session, actor, turns_remaining, *previous),
    }
}

fn hostile(session: &mut Session, actor: Entity, mut path: Vec<Point>) -> Result<(), ActionFailure> {
    let here = session.ecs.position(actor).ok_or(ActionFailure::CannotAct)?;
    let Some(player_point) = session.ecs.player_point() else {
        return actions::execute(session, actor, &Command::Wait);
    };

    // Sight is symmetric: standing in the player's view means seeing the player.
    if session.map.is_visible(here) {
        let dx = player_point.x - here.x;
        let dy = player_point.y - here.y;
        if dx.abs().max(dy.abs()) <= 1 {
            return actions::execute(session, actor, &Command::Melee { dx, dy });
        }
        path = pathfinding::path_to(
            &session.map,
            &session.ecs.blocker_points(),
            here,
            player_point,
        );
    }

    // A route the actor has been pushed off is stale.
    if path
        .first()
        .is_some_and(|next| (next.x - here.x).abs().max((next.y - here.y).abs()) > 1)
    {
        path.clear();
    }

    if path.is_empty() {
        session.ecs.set_ai(actor, Ai::Hostile { path });
        return actions::execute(session, actor, &Command::Wait);
    }
    let next = path.remove(0);
    session.ecs.set_ai(actor, Ai::Hostile { path });
    actions::execute(
        session,
        actor,
        &Command::Move {
            dx: next.x - here.x,
            dy: next.y - here.y,
        },
    )
}

fn confused(
    session: &mut Session,
    actor: Entity,
    turns_remaining: i32,
    previous: Ai,
) -> Result<(), ActionFailure> {
    let remaining = turns_remaining - 1;
    if remaining <= 0 {
        let previous = match previous {
            Ai::Hostile { .. } => Ai::hostile(),
            other => other,
        };
        session.ecs.set_ai(actor, previous);
        let name = session.ecs.name(actor);
        session
            .ecs
            .message(format!("The {name} is no longer confused."), palette::WHITE);
        return Ok(());
    }

    session.ecs.set_ai(
        actor,
        Ai::Confused {
            turns_remaining: remaining,
            previous: Box::new(previous),
        },
    );
    let roll = session.ecs.rng().range(0, STUMBLE_DIRECTIONS.len() as i32) as usize;
    let (dx, dy) = STUMBLE_DIRECTIONS[roll];
    actions::execute(session, actor, &Command::Bump { dx, dy })
}
