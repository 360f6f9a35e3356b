use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Action, Orientation, Percepts, Position,
    config::WorldConfig,
    map::{Dimensions, Grid, GridError},
};

pub const ACTION_REWARD: i32 = -1;
pub const SHOOT_REWARD: i32 = -10;
pub const DEATH_REWARD: i32 = -1000;
pub const GOLD_REWARD: i32 = 1000;

/// Represents errors that can occur while building a world.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("World dimensions must be non-zero, got {width}x{height}")]
    EmptyWorld { width: usize, height: usize },
    #[error("Pit probability must be within [0, 1], got {0}")]
    InvalidPitProbability(f64),
    #[error("Map string is empty.")]
    EmptyMap,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown map code '{token}' at position ({x}, {y}).")]
    UnknownToken { token: String, x: usize, y: usize },
    #[error("Multiple '{0}' cells found.")]
    Duplicate(&'static str),
    #[error("No start position ('ST') found in map.")]
    MissingStart,
    #[error("Start position must be at (0, 0), found ({x}, {y}).")]
    StartNotHome { x: usize, y: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Represents the static type of a cell in the cave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Floor,
    Pit,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    FellInPit,
    EatenByWumpus,
    EscapedWithGold,
    EscapedWithoutGold,
}

/// Represents the outcome of processing an agent's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub percepts: Percepts,
    pub reward: i32,
    pub done: bool,
    pub end: Option<EpisodeEnd>,
}

/// Holds the state of the explorer within the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerState {
    pub position: Position,
    pub orientation: Orientation,
    pub alive: bool,
    pub has_gold: bool,
    pub has_arrow: bool,
    pub exited: bool,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            position: Position::HOME,
            orientation: Orientation::East,
            alive: true,
            has_gold: false,
            has_arrow: true,
            exited: false,
        }
    }
}

/// Where the hazards and the gold are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub terrain: Grid<CellType>,
    pub wumpus: Option<Position>,
    pub gold: Option<Position>,
}

/// How `reset` obtains the next layout.
#[derive(Debug, Clone)]
enum LayoutSource {
    Random { pit_probability: f64, rng: StdRng },
    Fixed(Layout),
}

/// The Wumpus World simulator.
///
/// The agent never sees this directly; it only gets the [`Percepts`] returned by
/// [`WumpusWorld::reset`] and [`WumpusWorld::step`].
#[derive(Debug, Clone)]
pub struct WumpusWorld {
    source: LayoutSource,
    layout: Layout,
    explorer: ExplorerState,
    wumpus_alive: bool,
    score: i32,
    steps: usize,
    bump: bool,
    scream: bool,
}

impl WumpusWorld {
    /// Creates a randomly generated world.
    pub fn random(config: &WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let placeholder = Layout {
            terrain: Grid::new(config.width, config.height),
            wumpus: None,
            gold: None,
        };
        let mut world = Self::with_source(
            LayoutSource::Random {
                pit_probability: config.pit_probability,
                rng,
            },
            placeholder,
        );
        world.reset();
        Ok(world)
    }

    /// Creates a world that always resets to `layout`.
    pub fn from_layout(layout: Layout) -> Self {
        Self::with_source(LayoutSource::Fixed(layout.clone()), layout)
    }

    fn with_source(source: LayoutSource, layout: Layout) -> Self {
        Self {
            source,
            layout,
            explorer: ExplorerState::default(),
            wumpus_alive: true,
            score: 0,
            steps: 0,
            bump: false,
            scream: false,
        }
    }

    /// Starts a new episode and returns the initial percepts.
    ///
    /// Random worlds draw a fresh layout; fixed worlds are restored.
    pub fn reset(&mut self) -> Percepts {
        self.layout = match &mut self.source {
            LayoutSource::Random {
                pit_probability,
                rng,
            } => generate_layout(self.layout.terrain.dimensions(), *pit_probability, rng),
            LayoutSource::Fixed(layout) => layout.clone(),
        };
        self.explorer = ExplorerState::default();
        self.wumpus_alive = self.layout.wumpus.is_some();
        self.score = 0;
        self.steps = 0;
        self.bump = false;
        self.scream = false;
        self.percepts()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.layout.terrain.dimensions()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn explorer(&self) -> &ExplorerState {
        &self.explorer
    }

    pub fn wumpus_alive(&self) -> bool {
        self.wumpus_alive
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        !self.explorer.alive || self.explorer.exited
    }

    fn is_pit(&self, position: Position) -> bool {
        self.layout.terrain.get(position) == Some(&CellType::Pit)
    }

    /// Percepts for the explorer's current cell. Reading them clears bump and scream.
    pub fn percepts(&mut self) -> Percepts {
        let here = self.explorer.position;
        let dims = self.dimensions();
        let breeze = dims.neighbors(here).any(|cell| self.is_pit(cell));
        let stench = self.wumpus_alive
            && self
                .layout
                .wumpus
                .is_some_and(|wumpus| dims.neighbors(here).any(|cell| cell == wumpus));
        let glitter = !self.explorer.has_gold && self.layout.gold == Some(here);

        let percepts = Percepts {
            breeze,
            glitter,
            bump: self.bump,
            stench,
            scream: self.scream,
        };
        self.bump = false;
        self.scream = false;
        percepts
    }

    /// Processes a single action for the explorer.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        if self.is_done() {
            return StepOutcome {
                percepts: self.percepts(),
                reward: 0,
                done: true,
                end: None,
            };
        }

        self.steps += 1;
        let mut reward = ACTION_REWARD;
        match action {
            Action::Forward => self.move_forward(),
            Action::TurnLeft => self.explorer.orientation = self.explorer.orientation.turn_left(),
            Action::TurnRight => {
                self.explorer.orientation = self.explorer.orientation.turn_right()
            }
            Action::Grab => self.grab(),
            Action::Shoot => {
                reward = SHOOT_REWARD;
                self.shoot();
            }
            Action::Climb => {
                if self.explorer.position == Position::HOME {
                    self.explorer.exited = true;
                }
            }
        }

        let mut end = None;
        let here = self.explorer.position;
        if self.is_pit(here) {
            self.explorer.alive = false;
            reward += DEATH_REWARD;
            end = Some(EpisodeEnd::FellInPit);
        } else if self.wumpus_alive && self.layout.wumpus == Some(here) {
            self.explorer.alive = false;
            reward += DEATH_REWARD;
            end = Some(EpisodeEnd::EatenByWumpus);
        }

        if self.explorer.exited {
            if self.explorer.has_gold {
                reward += GOLD_REWARD;
                end = Some(EpisodeEnd::EscapedWithGold);
            } else {
                end = Some(EpisodeEnd::EscapedWithoutGold);
            }
        }

        self.score += reward;
        StepOutcome {
            percepts: self.percepts(),
            reward,
            done: self.is_done(),
            end,
        }
    }

    fn move_forward(&mut self) {
        match self
            .dimensions()
            .forward(self.explorer.position, self.explorer.orientation)
        {
            Some(next) => self.explorer.position = next,
            None => self.bump = true,
        }
    }

    fn grab(&mut self) {
        if !self.explorer.has_gold && self.layout.gold == Some(self.explorer.position) {
            self.explorer.has_gold = true;
            self.layout.gold = None;
        }
    }

    /// The arrow flies straight until it hits the wumpus or leaves the cave.
    fn shoot(&mut self) {
        if !self.explorer.has_arrow {
            return;
        }
        self.explorer.has_arrow = false;

        let dims = self.dimensions();
        let mut cell = self.explorer.position;
        while let Some(next) = dims.forward(cell, self.explorer.orientation) {
            if self.wumpus_alive && self.layout.wumpus == Some(next) {
                self.wumpus_alive = false;
                self.scream = true;
                return;
            }
            cell = next;
        }
    }
}

/// Each non-home cell is a pit with probability `pit_probability`; the wumpus
/// goes on a non-pit cell and the gold on any non-home cell.
fn generate_layout(dimensions: Dimensions, pit_probability: f64, rng: &mut StdRng) -> Layout {
    let mut terrain = Grid::new(dimensions.width, dimensions.height);
    let cells: Vec<Position> = dimensions
        .positions()
        .filter(|cell| *cell != Position::HOME)
        .collect();

    for cell in &cells {
        if rng.random_bool(pit_probability) {
            if let Some(slot) = terrain.get_mut(*cell) {
                *slot = CellType::Pit;
            }
        }
    }

    let open: Vec<Position> = cells
        .iter()
        .copied()
        .filter(|cell| terrain[*cell] == CellType::Floor)
        .collect();
    let wumpus = open.choose(rng).copied();
    let gold = cells.choose(rng).copied();

    Layout {
        terrain,
        wumpus,
        gold,
    }
}

/// Loads a world from a string representation of a map.
///
/// One row per line, whitespace-separated tokens: `ST` start (must be the
/// top-left cell), `BL` blank, `PT` pit, `WU` wumpus, `GO` gold.
pub fn load_world_from_string(map_string: &str) -> Result<WumpusWorld, WorldError> {
    let lines: Vec<&str> = map_string.trim().lines().collect();
    if lines.is_empty() {
        return Err(WorldError::EmptyMap);
    }

    let height = lines.len();
    let mut width = 0;
    let mut parsed_rows: Vec<Vec<&str>> = Vec::with_capacity(height);

    for (y, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if y == 0 {
            width = tokens.len();
        } else if tokens.len() != width {
            return Err(WorldError::InconsistentWidth {
                row: y,
                expected: width,
                found: tokens.len(),
            });
        }
        parsed_rows.push(tokens);
    }
    if width == 0 {
        return Err(WorldError::EmptyWorld { width, height });
    }

    let mut terrain = Grid::new(width, height);
    let mut start = None;
    let mut wumpus = None;
    let mut gold = None;

    for (y, row_tokens) in parsed_rows.iter().enumerate() {
        for (x, token) in row_tokens.iter().enumerate() {
            let pos = Position { x, y };
            match *token {
                "ST" => place(&mut start, pos, "ST")?,
                "BL" => {}
                "PT" => terrain.set(pos, CellType::Pit)?,
                "WU" => place(&mut wumpus, pos, "WU")?,
                "GO" => place(&mut gold, pos, "GO")?,
                unknown => {
                    return Err(WorldError::UnknownToken {
                        token: unknown.to_string(),
                        x,
                        y,
                    });
                }
            }
        }
    }

    match start {
        None => return Err(WorldError::MissingStart),
        Some(pos) if pos != Position::HOME => {
            return Err(WorldError::StartNotHome { x: pos.x, y: pos.y });
        }
        Some(_) => {}
    }

    Ok(WumpusWorld::from_layout(Layout {
        terrain,
        wumpus,
        gold,
    }))
}

fn place(slot: &mut Option<Position>, pos: Position, code: &'static str) -> Result<(), WorldError> {
    if slot.is_some() {
        return Err(WorldError::Duplicate(code));
    }
    *slot = Some(pos);
    Ok(())
}

/// Text rendering: one token per cell, the explorer shown by its heading.
impl fmt::Display for WumpusWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.dimensions().width;
        for (pos, cell) in self.layout.terrain.enumerate() {
            let token = if pos == self.explorer.position {
                match self.explorer.orientation {
                    Orientation::North => "^",
                    Orientation::East => ">",
                    Orientation::South => "v",
                    Orientation::West => "<",
                }
            } else if *cell == CellType::Pit {
                "P"
            } else if self.layout.wumpus == Some(pos) {
                if self.wumpus_alive { "W" } else { "w" }
            } else if self.layout.gold == Some(pos) {
                "G"
            } else {
                "."
            };
            if pos.x > 0 {
                write!(f, " ")?;
            }
            write!(f, "{token}")?;
            if pos.x + 1 == width {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
