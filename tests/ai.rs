use bracket_geometry::prelude::Point;
use tombdelve::{
    Command, Session,
    ai::{self, pathfinding},
    data::monsters::MonsterKind,
    ecs::components::Ai,
    map::{GameMap, Tile},
};

fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

fn no_longer_confused(session: &Session) -> usize {
    session
        .messages()
        .iter()
        .filter(|m| m.text == "The Orc is no longer confused.")
        .map(|m| m.count as usize)
        .sum()
}

#[test]
fn adjacent_hostiles_attack() {
    let mut session = Session::sandbox(GameMap::open_room(20, 10), Point::new(2, 2), 5);
    session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(3, 3));

    session.handle_command(Command::Wait).unwrap();

    assert_eq!(session.player_hp(), Some((28, 30)));
    let texts: Vec<String> = session.messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["Orc attacks Player for 2 hit points."]);
}

#[test]
fn visible_hostiles_close_in() {
    let mut session = Session::sandbox(GameMap::open_room(20, 10), Point::new(2, 2), 5);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(8, 6));
    let player_point = Point::new(2, 2);

    let mut last = chebyshev(Point::new(8, 6), player_point);
    for _ in 0..4 {
        session.handle_command(Command::Wait).unwrap();
        let now = chebyshev(session.ecs().position(orc).unwrap(), player_point);
        assert_eq!(now, last - 1);
        last = now;
    }
    assert_eq!(last, 2);
}

#[test]
fn unseen_hostiles_without_a_route_stay_put() {
    let mut map = GameMap::open_room(20, 10);
    for y in 0..10 {
        map.set_tile(Point::new(10, y), Tile::wall());
    }
    let mut session = Session::sandbox(map, Point::new(2, 2), 5);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(15, 5));

    for _ in 0..3 {
        session.handle_command(Command::Wait).unwrap();
    }
    assert_eq!(session.ecs().position(orc), Some(Point::new(15, 5)));
}

#[test]
fn remembered_routes_are_followed_out_of_sight() {
    let mut map = GameMap::open_room(30, 10);
    for y in 0..10 {
        map.set_tile(Point::new(12, y), Tile::wall());
    }
    map.set_tile(Point::new(12, 5), Tile::floor());
    let mut session = Session::sandbox(map, Point::new(2, 2), 5);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(20, 5));
    assert!(!session.map().is_visible(Point::new(20, 5)));

    let remembered = vec![Point::new(19, 5), Point::new(18, 5), Point::new(17, 5)];
    session
        .ecs_mut()
        .set_ai(orc, Ai::Hostile { path: remembered });

    session.handle_command(Command::Wait).unwrap();
    assert_eq!(session.ecs().position(orc), Some(Point::new(19, 5)));
    session.handle_command(Command::Wait).unwrap();
    assert_eq!(session.ecs().position(orc), Some(Point::new(18, 5)));
    assert_eq!(
        session.ecs().ai(orc),
        Some(Ai::Hostile {
            path: vec![Point::new(17, 5)]
        })
    );
}

#[test]
fn confusion_wears_off_after_exactly_its_duration() {
    let mut session = Session::sandbox(GameMap::open_room(30, 12), Point::new(2, 2), 11);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(20, 8));
    session.ecs_mut().set_ai(
        orc,
        Ai::Confused {
            turns_remaining: 3,
            previous: Box::new(Ai::hostile()),
        },
    );

    for _ in 0..2 {
        ai::act(&mut session, orc).ok();
        assert!(matches!(session.ecs().ai(orc), Some(Ai::Confused { .. })));
        assert_eq!(no_longer_confused(&session), 0);
    }

    let before = session.ecs().position(orc);
    ai::act(&mut session, orc).unwrap();
    assert_eq!(session.ecs().ai(orc), Some(Ai::hostile()));
    assert_eq!(session.ecs().position(orc), before);
    assert_eq!(no_longer_confused(&session), 1);
}

#[test]
fn confused_stumbling_stays_within_one_step() {
    let mut session = Session::sandbox(GameMap::open_room(30, 12), Point::new(2, 2), 17);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(20, 6));
    session.ecs_mut().set_ai(
        orc,
        Ai::Confused {
            turns_remaining: 20,
            previous: Box::new(Ai::hostile()),
        },
    );

    let mut here = Point::new(20, 6);
    for _ in 0..10 {
        ai::act(&mut session, orc).ok();
        let now = session.ecs().position(orc).unwrap();
        assert!(chebyshev(here, now) <= 1);
        assert!(session.map().is_walkable(now));
        here = now;
    }
}

#[test]
fn one_stuck_actor_does_not_stop_the_others() {
    let mut map = GameMap::open_room(20, 10);
    // A one-tile cell for the first orc.
    for (x, y) in [(14, 1), (14, 2), (15, 2), (16, 2), (16, 1)] {
        map.set_tile(Point::new(x, y), Tile::wall());
    }
    let mut session = Session::sandbox(map, Point::new(2, 5), 3);
    let stuck = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(15, 1));
    session.ecs_mut().set_ai(
        stuck,
        Ai::Confused {
            turns_remaining: 50,
            previous: Box::new(Ai::hostile()),
        },
    );
    let runner = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(8, 5));

    for _ in 0..3 {
        session.handle_command(Command::Wait).unwrap();
    }

    assert_eq!(session.ecs().position(stuck), Some(Point::new(15, 1)));
    assert_eq!(session.ecs().position(runner), Some(Point::new(5, 5)));
}

#[test]
fn path_to_self_is_empty_everywhere() {
    let map = GameMap::open_room(12, 9);
    for point in map.walkable_points() {
        assert!(pathfinding::path_to(&map, &[], point, point).is_empty());
    }
}

#[test]
fn isolated_tiles_cannot_be_reached() {
    let mut map = GameMap::open_room(15, 9);
    for (x, y) in [(9, 3), (10, 3), (11, 3), (9, 4), (11, 4), (9, 5), (10, 5), (11, 5)] {
        map.set_tile(Point::new(x, y), Tile::wall());
    }
    assert!(map.is_walkable(Point::new(10, 4)));
    assert!(pathfinding::path_to(&map, &[], Point::new(2, 2), Point::new(10, 4)).is_empty());
    assert!(pathfinding::path_to(&map, &[], Point::new(10, 4), Point::new(2, 2)).is_empty());
}

#[test]
fn paths_are_contiguous_walkable_steps() {
    let mut map = GameMap::open_room(20, 12);
    for y in 0..9 {
        map.set_tile(Point::new(10, y), Tile::wall());
    }
    let start = Point::new(2, 2);
    let goal = Point::new(17, 2);
    let path = pathfinding::path_to(&map, &[], start, goal);

    assert_eq!(path.last(), Some(&goal));
    assert!(!path.contains(&start));
    let mut previous = start;
    for step in &path {
        assert_eq!(chebyshev(previous, *step), 1);
        assert!(map.is_walkable(*step));
        previous = *step;
    }
}

#[test]
fn stale_routes_are_dropped_instead_of_jumped() {
    let mut session = Session::sandbox(GameMap::open_room(30, 10), Point::new(2, 2), 5);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(20, 5));
    assert!(!session.map().is_visible(Point::new(20, 5)));
    session.ecs_mut().set_ai(
        orc,
        Ai::Hostile {
            path: vec![Point::new(15, 2), Point::new(14, 2)],
        },
    );

    session.handle_command(Command::Wait).unwrap();

    assert_eq!(session.ecs().position(orc), Some(Point::new(20, 5)));
    assert_eq!(session.ecs().ai(orc), Some(Ai::hostile()));
}

#[test]
fn recovering_from_confusion_never_jumps() {
    let mut session = Session::sandbox(GameMap::open_room(30, 10), Point::new(2, 2), 23);
    let orc = session
        .ecs_mut()
        .spawn_actor(&MonsterKind::Orc.template(), Point::new(20, 5));
    let route = vec![Point::new(19, 5), Point::new(18, 5), Point::new(17, 5)];
    session.ecs_mut().set_ai(
        orc,
        Ai::Confused {
            turns_remaining: 4,
            previous: Box::new(Ai::Hostile { path: route }),
        },
    );

    let mut here = Point::new(20, 5);
    for _ in 0..8 {
        session.handle_command(Command::Wait).unwrap();
        let now = session.ecs().position(orc).unwrap();
        assert!(chebyshev(here, now) <= 1, "{here:?} -> {now:?}");
        here = now;
    }
    assert!(!matches!(session.ecs().ai(orc), Some(Ai::Confused { .. })));
}
