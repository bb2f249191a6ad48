//! Steer a robot through a generated maze with turn and step commands.
//!
//! The maze is a pure function of the attempt seed. Generating it is the most
//! expensive thing any challenge does, so [`RobotChallenge`] keeps the most
//! recent mazes in a small [`MazeCache`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use challenge_core::{ActionMetadata, Challenge, ChallengeMetadata, DigestStream, digest_hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rooms per side. The grid has a wall between and around every room.
pub const MAZE_SIZE: usize = 16;
const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Every ordering of the four directions.
const DIRECTION_ORDERS: [[u8; 4]; 24] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 2, 3, 1],
    [0, 3, 1, 2],
    [0, 3, 2, 1],
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [1, 2, 0, 3],
    [1, 2, 3, 0],
    [1, 3, 0, 2],
    [1, 3, 2, 0],
    [2, 0, 1, 3],
    [2, 0, 3, 1],
    [2, 1, 0, 3],
    [2, 1, 3, 0],
    [2, 3, 0, 1],
    [2, 3, 1, 0],
    [3, 0, 1, 2],
    [3, 0, 2, 1],
    [3, 1, 0, 2],
    [3, 1, 2, 0],
    [3, 2, 0, 1],
    [3, 2, 1, 0],
];

/// Grid position as `(row, column)`.
pub type Cell = (i64, i64);

/// Heading: 0 right, 1 down, 2 left, 3 up.
pub type Direction = u8;

/// Cell one step from `cell` towards `direction`.
pub fn travel((row, column): Cell, direction: Direction) -> Cell {
    match direction % 4 {
        0 => (row, column + 1),
        1 => (row + 1, column),
        2 => (row, column - 1),
        _ => (row - 1, column),
    }
}

pub fn turn_left(direction: Direction) -> Direction {
    (direction + 3) % 4
}

pub fn turn_right(direction: Direction) -> Direction {
    (direction + 1) % 4
}

/// Walls and passages of a generated maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    columns: usize,
    walls: Vec<bool>,
}

impl Maze {
    /// Carves a perfect maze of `size` by `size` rooms with a depth-first walk
    /// driven by `seed`. The entrance is at `(0, 1)` and the exit at the
    /// bottom edge, one column from the right.
    pub fn generate(seed: &str, size: usize) -> Self {
        let span = 2 * size + 1;
        let mut maze = Self {
            rows: span,
            columns: span,
            walls: vec![true; span * span],
        };
        for row in 0..size {
            for column in 0..size {
                maze.open(2 * row + 1, 2 * column + 1);
            }
        }

        let mut rng = DigestStream::new(seed);
        let mut order = || DIRECTION_ORDERS[rng.next_below(DIRECTION_ORDERS.len() as u32) as usize];

        let mut visited = vec![false; span * span];
        visited[span + 1] = true;
        // Each frame: room, its direction order, next direction to try.
        let mut stack = vec![((1usize, 1usize), order(), 0usize)];

        while let Some(top) = stack.last_mut() {
            let ((row, column), directions, tried) = *top;
            if tried == directions.len() {
                stack.pop();
                continue;
            }
            top.2 += 1;

            let next = match directions[tried] {
                0 => (row, column + 2),
                1 => (row + 2, column),
                2 if column >= 2 => (row, column - 2),
                3 if row >= 2 => (row - 2, column),
                _ => continue,
            };
            if next.0 >= span || next.1 >= span || visited[next.0 * span + next.1] {
                continue;
            }
            visited[next.0 * span + next.1] = true;
            maze.open((row + next.0) / 2, (column + next.1) / 2);
            stack.push((next, order(), 0));
        }

        maze.open(0, 1);
        let (exit_row, exit_column) = maze.exit();
        maze.open(exit_row as usize, exit_column as usize);
        maze
    }

    fn open(&mut self, row: usize, column: usize) {
        self.walls[row * self.columns + column] = false;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn entrance(&self) -> Cell {
        (0, 1)
    }

    pub fn exit(&self) -> Cell {
        (self.rows as i64 - 1, self.columns as i64 - 2)
    }

    /// Whether `cell` is a wall, or `None` when it lies outside the grid.
    pub fn wall_at(&self, (row, column): Cell) -> Option<bool> {
        let row = usize::try_from(row).ok().filter(|&row| row < self.rows)?;
        let column = usize::try_from(column).ok().filter(|&column| column < self.columns)?;
        Some(self.walls[row * self.columns + column])
    }

    pub fn is_passage(&self, cell: Cell) -> bool {
        self.wall_at(cell) == Some(false)
    }
}

/// The most recently used mazes, keyed by seed.
#[derive(Debug)]
pub struct MazeCache {
    capacity: usize,
    entries: Mutex<VecDeque<(String, Arc<Maze>)>>,
}

impl MazeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maze for `seed`, generated on a miss. The least recently used entry is
    /// evicted once the cache is full.
    pub fn get(&self, seed: &str) -> Arc<Maze> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(position) = entries.iter().position(|(key, _)| key == seed) {
            if let Some(entry) = entries.remove(position) {
                let maze = Arc::clone(&entry.1);
                entries.push_front(entry);
                return maze;
            }
        }

        let maze = Arc::new(Maze::generate(seed, MAZE_SIZE));
        entries.push_front((seed.to_owned(), Arc::clone(&maze)));
        entries.truncate(self.capacity);
        maze
    }

    pub fn cached(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for MazeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub seed: String,
    pub cell: Cell,
    pub direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum RobotAction {
    #[serde(rename = "r")]
    #[strum(serialize = "r")]
    TurnRight(Value),

    #[serde(rename = "l")]
    #[strum(serialize = "l")]
    TurnLeft(Value),

    #[serde(rename = "f")]
    #[strum(serialize = "f")]
    Forward(Value),
}

#[derive(Debug, Default)]
pub struct RobotChallenge {
    mazes: MazeCache,
}

impl RobotChallenge {
    pub fn with_cache(mazes: MazeCache) -> Self {
        Self { mazes }
    }

    pub fn maze(&self, state: &RobotState) -> Arc<Maze> {
        self.mazes.get(&state.seed)
    }
}

impl Challenge for RobotChallenge {
    type State = RobotState;
    type Action = RobotAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(120)
    }

    fn initialize(&self, metadata: &ChallengeMetadata) -> RobotState {
        RobotState {
            seed: digest_hex(format!(
                "{}-{}-{}",
                metadata.seed, metadata.attempt_id, metadata.start_time
            )),
            cell: (0, 1),
            direction: 1,
        }
    }

    fn apply(&self, draft: &mut RobotState, action: RobotAction, _metadata: ActionMetadata) {
        match action {
            RobotAction::TurnRight(_) => draft.direction = turn_right(draft.direction),
            RobotAction::TurnLeft(_) => draft.direction = turn_left(draft.direction),
            RobotAction::Forward(_) => draft.cell = travel(draft.cell, draft.direction),
        }
    }

    fn is_completed(&self, state: &RobotState) -> bool {
        state.cell == self.maze(state).exit()
    }

    fn failure_reason(&self, state: &RobotState) -> Option<String> {
        match self.maze(state).wall_at(state.cell) {
            None => Some("You went out of bounds!".to_owned()),
            Some(true) => Some("You hit a wall!".to_owned()),
            Some(false) => None,
        }
    }
}
