//! # ASCII Level Sets
//!
//! Replays hand-drawn maps as level layouts. One character per tile:
//!
//! | glyph | tile |
//! |-------|------|
//! | `#` | wall |
//! | `.` | floor |
//! | `+` | closed door |
//! | `>` | stairway |
//! | `@` | player start |
//! | `s` `k` `f` | snake, skeleton, fairy on floor |
//! | `?` | random creature for the depth |
//! | space | nothing |
//!
//! A level set cycles: depth `d` uses map `(d - 1) % maps.len()`.

use crate::generation::{pick_species, LevelGenerator};
use crate::{GameError, GameResult, LevelLayout, MonsterPlacement, Position, Species};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Separator line between maps in a level-set file.
pub const MAP_SEPARATOR: &str = "---";

const BUILTIN_MAPS: [&str; 3] = [
    "############\n\
     #@...#.....#\n\
     #....+..s..#\n\
     #....#.....#\n\
     ##+###.....#\n\
     #....#..>..#\n\
     #.k..+.....#\n\
     ############",
    "##########\n\
     #>.......#\n\
     #...f....#\n\
     ####+#####\n\
     #........#\n\
     #..?..s..#\n\
     #.......@#\n\
     ##########",
    "   #####\n   \
        #.>.#\n   \
        #.?.#\n\
     ####+####\n\
     #@......#\n\
     #########",
];

/// Level generator backed by a list of ASCII maps.
#[derive(Debug, Clone)]
pub struct AsciiLevels {
    maps: Vec<String>,
}

impl AsciiLevels {
    pub fn new(maps: Vec<String>) -> Self {
        Self { maps }
    }

    /// The maps shipped with the binary.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_MAPS.iter().map(|map| map.to_string()).collect())
    }

    /// Splits a level-set text on `---` lines. Blank lines around each map are ignored.
    pub fn parse_set(text: &str) -> GameResult<Self> {
        let mut maps = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines() {
            if line.trim() == MAP_SEPARATOR {
                maps.push(current.join("\n"));
                current.clear();
            } else {
                current.push(line.trim_end_matches('\r'));
            }
        }
        maps.push(current.join("\n"));

        let maps: Vec<String> = maps
            .into_iter()
            .map(|map| map.trim_matches('\n').to_string())
            .filter(|map| !map.trim().is_empty())
            .collect();
        if maps.is_empty() {
            return Err(GameError::InvalidLevel("level set contains no maps".to_string()));
        }

        // Every map is checked now rather than on the descent that first uses it
        let mut rng = StdRng::seed_from_u64(0);
        for (index, map) in maps.iter().enumerate() {
            parse_map(map, 1, &mut rng)
                .and_then(|layout| layout.validate())
                .map_err(|err| match err {
                    GameError::MapParse { line, message } => GameError::MapParse {
                        line,
                        message: format!("map {}: {}", index + 1, message),
                    },
                    other => other,
                })?;
        }
        Ok(Self::new(maps))
    }

    /// Loads a level set from a text file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_set(&text)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map used for `depth`.
    pub fn map_for_depth(&self, depth: u32) -> Option<&str> {
        if self.maps.is_empty() {
            return None;
        }
        let index = (depth.max(1) - 1) as usize % self.maps.len();
        Some(&self.maps[index])
    }
}

impl LevelGenerator for AsciiLevels {
    fn generate(&self, depth: u32, rng: &mut StdRng) -> GameResult<LevelLayout> {
        let map = self
            .map_for_depth(depth)
            .ok_or_else(|| GameError::InvalidLevel("no maps to generate from".to_string()))?;
        let layout = parse_map(map, depth, rng)?;
        debug!(
            "depth {}: {} floor tiles, {} doors, {} monsters",
            depth,
            layout.floor.len(),
            layout.doors.len(),
            layout.monsters.len()
        );
        Ok(layout)
    }

    fn generator_type(&self) -> &'static str {
        "ascii"
    }
}

/// Parses a single map. `?` tiles draw a species for `depth` from `rng`.
pub fn parse_map(map: &str, depth: u32, rng: &mut StdRng) -> GameResult<LevelLayout> {
    let mut layout = LevelLayout::default();
    let mut start = None;
    let mut stairs = None;

    for (y, line) in map.lines().enumerate() {
        let line_number = y + 1;
        for (x, glyph) in line.trim_end_matches('\r').chars().enumerate() {
            let position = Position::new(x as i32, y as i32);
            let mut species = None;
            match glyph {
                ' ' => continue,
                '#' => {
                    layout.walls.insert(position);
                    continue;
                }
                '.' => {}
                '+' => layout.doors.push(position),
                '>' => {
                    if stairs.replace(position).is_some() {
                        return Err(parse_error(line_number, "more than one stairway"));
                    }
                }
                '@' => {
                    if start.replace(position).is_some() {
                        return Err(parse_error(line_number, "more than one player start"));
                    }
                }
                '?' => species = Some(pick_species(depth, rng)),
                other => match Species::from_glyph(other) {
                    Some(found) => species = Some(found),
                    None => {
                        return Err(parse_error(
                            line_number,
                            &format!("unknown glyph '{}' at column {}", other, x + 1),
                        ))
                    }
                },
            }
            layout.floor.insert(position);
            if let Some(species) = species {
                layout.monsters.push(MonsterPlacement { species, position });
            }
        }
    }

    let last_line = map.lines().count().max(1);
    layout.player_start = start.ok_or_else(|| parse_error(last_line, "map has no player start"))?;
    layout.stairs = stairs.ok_or_else(|| parse_error(last_line, "map has no stairway"))?;
    Ok(layout)
}

fn parse_error(line: usize, message: &str) -> GameError {
    GameError::MapParse {
        line,
        message: message.to_string(),
    }
}
