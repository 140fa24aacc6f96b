//! Snake: grid movement, growth and self-collision

use std::collections::VecDeque;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::engine::{Contact, EndReason, Engine, Outcome};
use crate::consts::SNAKE_INTERVAL_MS;

/// A grid cell, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Snake tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeTuning {
    pub cols: i32,
    pub rows: i32,
    /// Body length at start, laid out left of the head
    pub initial_length: usize,
    /// Score per food eaten
    pub food_points: u64,
    /// Fixed first food cell (otherwise random)
    pub opening_food: Option<Cell>,
}

impl Default for SnakeTuning {
    fn default() -> Self {
        Self {
            cols: 20,
            rows: 20,
            initial_length: 3,
            food_points: 10,
            opening_food: None,
        }
    }
}

impl SnakeTuning {
    fn is_valid(&self) -> bool {
        self.cols > 0
            && self.rows > 0
            && self.initial_length >= 1
            && (self.cols / 2) as usize >= self.initial_length - 1
            && (self.cols as i64 * self.rows as i64) > self.initial_length as i64
    }
}

/// Snake entity state
#[derive(Debug, Clone)]
pub struct Snake {
    tuning: SnakeTuning,
    /// Head first
    body: VecDeque<Cell>,
    heading: Direction,
    /// Latest direction intent, consumed by the next tick
    pending: Option<Direction>,
    food: Cell,
    score: u64,
}

/// Renderer view of a snake game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeSnapshot {
    pub cols: i32,
    pub rows: i32,
    pub body: Vec<Cell>,
    pub food: Cell,
    pub heading: Direction,
    pub score: u64,
}

impl Snake {
    /// Build a snake game. Entities are laid out by `Engine::reset`.
    pub fn new(tuning: SnakeTuning) -> Self {
        let tuning = if tuning.is_valid() {
            tuning
        } else {
            log::warn!("Invalid snake grid {tuning:?}, using defaults");
            SnakeTuning::default()
        };
        Self {
            tuning,
            body: VecDeque::new(),
            heading: Direction::Right,
            pending: None,
            food: Cell::new(0, 0),
            score: 0,
        }
    }

    pub fn tuning(&self) -> &SnakeTuning {
        &self.tuning
    }

    pub fn body(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.tuning.cols).contains(&cell.x) && (0..self.tuning.rows).contains(&cell.y)
    }

    /// Pick a uniformly random cell not covered by the body
    fn random_free_cell(&self, rng: &mut Pcg32) -> Option<Cell> {
        let free: Vec<Cell> = (0..self.tuning.rows)
            .flat_map(|y| (0..self.tuning.cols).map(move |x| Cell::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[rng.random_range(0..free.len())])
    }
}

impl Default for Snake {
    fn default() -> Self {
        Self::new(SnakeTuning::default())
    }
}

impl Engine for Snake {
    type Command = Direction;
    type Snapshot = SnakeSnapshot;

    const GAME_ID: &'static str = "snake";
    const BASE_INTERVAL_MS: f64 = SNAKE_INTERVAL_MS;

    fn command(&mut self, direction: Direction) {
        self.pending = Some(direction);
    }

    fn tick(&mut self, rng: &mut Pcg32, out: &mut Vec<Outcome>) {
        if let Some(direction) = self.pending.take() {
            // Reversing straight into the neck is ignored
            if direction != self.heading.opposite() {
                self.heading = direction;
            }
        }

        let next = self.head().step(self.heading);
        if !self.in_bounds(next) {
            out.push(Outcome::Terminated {
                reason: EndReason::Wall,
                final_score: self.score,
            });
            return;
        }

        let grows = next == self.food;
        // The tail vacates this tick unless we grow, so it isn't an obstacle
        let obstacles = if grows {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        if self.body.iter().take(obstacles).any(|&cell| cell == next) {
            out.push(Outcome::Terminated {
                reason: EndReason::Collision,
                final_score: self.score,
            });
            return;
        }

        self.body.push_front(next);
        if !grows {
            self.body.pop_back();
            return;
        }

        self.score += self.tuning.food_points;
        out.push(Outcome::Contact(Contact::Food));
        out.push(Outcome::Scored {
            side: None,
            score: self.score,
            delta: self.tuning.food_points,
        });

        match self.random_free_cell(rng) {
            Some(cell) => self.food = cell,
            None => out.push(Outcome::Terminated {
                reason: EndReason::Filled,
                final_score: self.score,
            }),
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        let head = Cell::new(self.tuning.cols / 2, self.tuning.rows / 2);
        self.body = (0..self.tuning.initial_length as i32)
            .map(|i| Cell::new(head.x - i, head.y))
            .collect();
        self.heading = Direction::Right;
        self.pending = None;
        self.score = 0;

        let opening = self
            .tuning
            .opening_food
            .filter(|cell| self.in_bounds(*cell) && !self.body.contains(cell));
        // Valid tuning always leaves at least one free cell
        self.food = opening
            .or_else(|| self.random_free_cell(rng))
            .unwrap_or(head);
    }

    fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            cols: self.tuning.cols,
            rows: self.tuning.rows,
            body: self.body.iter().copied().collect(),
            food: self.food,
            heading: self.heading,
            score: self.score,
        }
    }

    fn score(&self) -> u64 {
        self.score
    }
}
