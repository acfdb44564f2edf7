//! # Navigation
//!
//! Shortest paths over the level grid for click-to-move and autopilot.
//! Movement is 4-directional with uniform cost.

use crate::{Position, World};
use pathfinding::prelude::astar;

/// Whether the pathfinder may route through `position` on the way to `goal`.
///
/// Live monsters block every tile except the goal itself, so a monster can be
/// targeted directly. Closed doors are passable; walking into one opens it.
pub fn is_passable(world: &World, position: Position, goal: Position) -> bool {
    world.is_walkable(position) && (position == goal || world.monster_at(position).is_none())
}

/// Finds a shortest path from `start` to `goal`, both ends included.
///
/// # Examples
///
/// ```
/// use delve::{find_path, AsciiLevels, LevelGenerator, NoLoot, Position, World};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let layout = AsciiLevels::new(vec!["#####\n#@.>#\n#####".to_string()])
///     .generate(1, &mut rng)
///     .unwrap();
/// let world = World::install(layout, 1, &NoLoot, &mut rng).unwrap();
///
/// let path = find_path(&world, Position::new(1, 1), Position::new(3, 1)).unwrap();
/// assert_eq!(path.len(), 3);
/// ```
pub fn find_path(world: &World, start: Position, goal: Position) -> Option<Vec<Position>> {
    if !world.is_walkable(goal) {
        return None;
    }
    astar(
        &start,
        |&position| {
            position
                .cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| is_passable(world, next, goal))
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |&position| position.manhattan_distance(goal),
        |&position| position == goal,
    )
    .map(|(path, _cost)| path)
}

/// The tile to step onto next when heading for `goal`.
pub fn next_step(world: &World, start: Position, goal: Position) -> Option<Position> {
    find_path(world, start, goal).and_then(|path| path.get(1).copied())
}
