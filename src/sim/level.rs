/// Level loader.
///
/// ## Sources (priority order):
///   1. `level_file` from config.toml
///   2. Built-in embedded level
///
/// ## Level format (`.txt`):
///   Line 1 (optional): `## Level Name`
///   Optional: `@ <tile> x,y x,y ...`: pixel-exact placements off the grid
///   Lines: map rows, one character per 64×64 cell
///
/// ## Tile legend:
///   '#' = Block     '$' = Coin
///   'E' = Enemy     'P' = Player spawn
///   anything else = Empty
///
/// World width = longest row × 64, height = rows × 64.
/// The core never sees this format: it only receives `LevelDef` placements.

use std::fmt;
use std::path::Path;

use crate::domain::bbox::{BoundingBox, TILE_SIZE};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlacementKind {
    Block,
    Coin,
    Enemy,
    PlayerSpawn,
}

impl PlacementKind {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(PlacementKind::Block),
            '$' => Some(PlacementKind::Coin),
            'E' => Some(PlacementKind::Enemy),
            'P' => Some(PlacementKind::PlayerSpawn),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub kind: PlacementKind,
}

/// Validated level content, in pixels.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub placements: Vec<Placement>,
}

impl LevelDef {
    pub fn player_spawn(&self) -> Option<(i32, i32)> {
        self.placements.iter()
            .find(|p| p.kind == PlacementKind::PlayerSpawn)
            .map(|p| (p.x, p.y))
    }
}

#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Empty,
    NoPlayerSpawn,
    MultiplePlayerSpawns(usize),
    BadMetadata { line: usize, text: String },
    OutOfBounds { kind: PlacementKind, x: i32, y: i32 },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "could not read level: {e}"),
            LevelError::Empty => write!(f, "level has no map rows"),
            LevelError::NoPlayerSpawn => write!(f, "level has no player spawn ('P')"),
            LevelError::MultiplePlayerSpawns(n) => write!(f, "level has {n} player spawns, expected 1"),
            LevelError::BadMetadata { line, text } => write!(f, "line {line}: bad placement metadata `{text}`"),
            LevelError::OutOfBounds { kind, x, y } => write!(f, "{kind:?} at ({x}, {y}) lies outside the world"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the configured level file, or the built-in level when none is set.
pub fn load_level(path: Option<&Path>) -> Result<LevelDef, LevelError> {
    let def = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)?;
            parse_level(&content)?
        }
        None => embedded_level()?,
    };
    log::info!(
        "Loaded level \"{}\" ({}x{} px, {} placements)",
        def.name, def.width, def.height, def.placements.len(),
    );
    Ok(def)
}

/// Parse and validate a level from text content.
pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows: Vec<&str> = vec![];
    let mut extra = vec![];

    for (i, line) in content.lines().enumerate() {
        if let Some(title) = name_line(i, line) {
            name = title.to_string();
        } else if let Some(rest) = line.strip_prefix("@ ") {
            extra.extend(parse_metadata(rest).ok_or_else(|| LevelError::BadMetadata {
                line: i + 1,
                text: line.to_string(),
            })?);
        } else {
            rows.push(line);
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return Err(LevelError::Empty);
    }

    let columns = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let mut placements = vec![];
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            if let Some(kind) = PlacementKind::from_char(ch) {
                placements.push(Placement {
                    x: x as i32 * TILE_SIZE,
                    y: y as i32 * TILE_SIZE,
                    kind,
                });
            }
        }
    }
    placements.extend(extra);

    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }

    let def = LevelDef {
        name,
        width: columns as i32 * TILE_SIZE,
        height: rows.len() as i32 * TILE_SIZE,
        placements,
    };
    validate(&def)?;
    Ok(def)
}

/// Reject geometry the simulation assumes never happens.
pub fn validate(def: &LevelDef) -> Result<(), LevelError> {
    if def.width <= 0 || def.height <= 0 {
        return Err(LevelError::Empty);
    }

    let spawns = def.placements.iter().filter(|p| p.kind == PlacementKind::PlayerSpawn).count();
    match spawns {
        0 => return Err(LevelError::NoPlayerSpawn),
        1 => {}
        n => return Err(LevelError::MultiplePlayerSpawns(n)),
    }

    // Compare origins against width - 64 so huge coordinates can't overflow.
    let max_x = def.width - BoundingBox::WIDTH;
    let max_y = def.height - BoundingBox::HEIGHT;
    for p in &def.placements {
        if p.x < 0 || p.y < 0 || p.x > max_x || p.y > max_y {
            return Err(LevelError::OutOfBounds { kind: p.kind, x: p.x, y: p.y });
        }
    }

    Ok(())
}

/// `<tile> x,y x,y ...` → placements. None on any malformed token.
fn parse_metadata(rest: &str) -> Option<Vec<Placement>> {
    let mut parts = rest.split_whitespace();
    let mut tile = parts.next()?.chars();
    let kind = PlacementKind::from_char(tile.next()?)?;
    if tile.next().is_some() {
        return None;
    }

    let mut out = vec![];
    for pair in parts {
        let (x, y) = pair.split_once(',')?;
        out.push(Placement {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
            kind,
        });
    }
    if out.is_empty() { None } else { Some(out) }
}

/// `## Level Name` on the first line only. The title must hold a letter or
/// digit that isn't a tile symbol, so `## E #` stays a map row.
fn name_line(index: usize, line: &str) -> Option<&str> {
    if index != 0 {
        return None;
    }
    let title = line.strip_prefix("## ")?.trim();
    title.chars()
        .any(|c| c.is_alphanumeric() && PlacementKind::from_char(c).is_none())
        .then_some(title)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

/// 1920×640 world: a full-width ground row, two floating ledges,
/// two coins, one enemy, and an off-grid player spawn.
const EMBEDDED: &[&str] = &[
    "## Level 1 - First Steps",
    "@ P 500,512",
    "",
    "",
    "",
    "",
    "          E",
    "    $  ##",
    "            $",
    "   ###",
    "",
    "##############################",
];

pub fn embedded_level() -> Result<LevelDef, LevelError> {
    parse_level(&EMBEDDED.join("\n"))
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_at(def: &LevelDef, kind: PlacementKind) -> Vec<(i32, i32)> {
        def.placements.iter().filter(|p| p.kind == kind).map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn embedded_level_matches_classic_layout() {
        let def = embedded_level().unwrap();
        assert_eq!(def.name, "Level 1 - First Steps");
        assert_eq!((def.width, def.height), (1920, 640));
        assert_eq!(def.player_spawn(), Some((500, 512)));

        let blocks = kinds_at(&def, PlacementKind::Block);
        assert_eq!(blocks.len(), 30 + 3 + 2);
        assert!(blocks.contains(&(0, 576)));
        assert!(blocks.contains(&(1856, 576)));
        for &b in &[(192, 448), (256, 448), (320, 448), (448, 320), (512, 320)] {
            assert!(blocks.contains(&b), "missing block {b:?}");
        }

        let mut coins = kinds_at(&def, PlacementKind::Coin);
        coins.sort();
        assert_eq!(coins, vec![(256, 320), (768, 384)]);
        assert_eq!(kinds_at(&def, PlacementKind::Enemy), vec![(640, 256)]);
    }

    #[test]
    fn grid_cells_scale_to_pixels() {
        let def = parse_level("P\n #\n  $").unwrap();
        assert_eq!(def.name, "Unnamed Level");
        assert_eq!((def.width, def.height), (192, 192));
        assert_eq!(kinds_at(&def, PlacementKind::Block), vec![(64, 64)]);
        assert_eq!(kinds_at(&def, PlacementKind::Coin), vec![(128, 128)]);
    }

    #[test]
    fn block_row_is_not_a_name_line() {
        let def = parse_level("######\nP").unwrap();
        assert_eq!(def.name, "Unnamed Level");
        assert_eq!(kinds_at(&def, PlacementKind::Block).len(), 6);
    }

    #[test]
    fn first_row_with_symbols_stays_on_the_map() {
        let def = parse_level("#E  #\n# P #\n#####").unwrap();
        assert_eq!(def.name, "Unnamed Level");
        assert_eq!(def.height, 192);
        assert_eq!(kinds_at(&def, PlacementKind::Enemy), vec![(64, 0)]);
        assert_eq!(def.player_spawn(), Some((128, 64)));

        let def = parse_level("## E #\n P").unwrap();
        assert_eq!(def.name, "Unnamed Level");
        assert_eq!(kinds_at(&def, PlacementKind::Enemy), vec![(192, 0)]);
    }

    #[test]
    fn name_only_read_from_first_line() {
        let def = parse_level("## Caves 2\nP\n#").unwrap();
        assert_eq!(def.name, "Caves 2");
        assert_eq!(def.height, 128);

        let def = parse_level("P\n## Caves\n#").unwrap();
        assert_eq!(def.name, "Unnamed Level");
        assert_eq!(def.height, 192);
    }

    #[test]
    fn trailing_blank_rows_are_dropped() {
        let def = parse_level("P\n#\n\n   \n").unwrap();
        assert_eq!(def.height, 128);
    }

    #[test]
    fn metadata_places_off_grid() {
        let def = parse_level("@ $ 10,20 30,40\n@ P 1,1\n   \n  #").unwrap();
        assert_eq!(kinds_at(&def, PlacementKind::Coin), vec![(10, 20), (30, 40)]);
        assert_eq!(def.player_spawn(), Some((1, 1)));
    }

    #[test]
    fn bad_metadata_is_rejected() {
        for bad in ["@ P", "@ P 1;2", "@ PP 1,2", "@ ? 1,2", "@ P x,2"] {
            let text = format!("{bad}\nP");
            match parse_level(&text) {
                Err(LevelError::BadMetadata { line: 1, .. }) => {}
                other => panic!("{bad}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn empty_level_is_rejected() {
        assert!(matches!(parse_level(""), Err(LevelError::Empty)));
        assert!(matches!(parse_level("## Just A Name\n\n"), Err(LevelError::Empty)));
    }

    #[test]
    fn spawn_count_is_checked() {
        assert!(matches!(parse_level("###"), Err(LevelError::NoPlayerSpawn)));
        assert!(matches!(parse_level("P P"), Err(LevelError::MultiplePlayerSpawns(2))));
    }

    #[test]
    fn placement_outside_world_is_rejected() {
        let err = parse_level("P\n@ $ 40,0").unwrap_err();
        assert!(matches!(err, LevelError::OutOfBounds { kind: PlacementKind::Coin, x: 40, y: 0 }));
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn extreme_coordinates_are_out_of_bounds() {
        for meta in ["@ $ 2147483647,0", "@ $ 0,2147483647", "@ E -2147483648,0"] {
            let text = format!("P\n{meta}");
            match parse_level(&text) {
                Err(LevelError::OutOfBounds { .. }) => {}
                other => panic!("{meta}: unexpected {other:?}"),
            }
        }
        // The last cell that still fits is accepted.
        assert!(parse_level("P \n@ $ 64,0").is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_level(Some(Path::new("/definitely/not/here.txt"))).unwrap_err();
        assert!(matches!(err, LevelError::Io(_)));
    }
}
