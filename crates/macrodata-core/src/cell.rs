//! Animated digit cells and the grid that owns them.

use alloc::vec::Vec;

use log::info;
use rand::Rng;

pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 1.5;
const INITIAL_SCALE: f32 = 0.7;

const FOCUSED_RADIUS_SQ: u32 = 361; // 1.9^2, scaled by 100
const NEAR_RADIUS_SQ: u32 = 625; // 2.5^2, scaled by 100

/// Grid coordinate; `col` runs along the wide axis.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct GridPos {
    pub col: u8,
    pub row: u8,
}

impl GridPos {
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Squared euclidean distance in grid units.
    pub const fn distance_sq(self, other: GridPos) -> u32 {
        let dc = self.col.abs_diff(other.col) as u32;
        let dr = self.row.abs_diff(other.row) as u32;
        dc * dc + dr * dr
    }
}

/// Distance band of a cell relative to the focus location.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Proximity {
    Focused,
    Near,
    Far,
}

impl Proximity {
    pub const fn classify(distance_sq: u32) -> Self {
        let scaled = distance_sq * 100;
        if scaled <= FOCUSED_RADIUS_SQ {
            Self::Focused
        } else if scaled <= NEAR_RADIUS_SQ {
            Self::Near
        } else {
            Self::Far
        }
    }

    pub const fn target_scale(self) -> f32 {
        match self {
            Self::Focused => 1.5,
            Self::Near => 0.9,
            Self::Far => 0.7,
        }
    }

    pub const fn step(self) -> f32 {
        match self {
            Self::Focused => 0.08,
            Self::Near | Self::Far => 0.05,
        }
    }

    pub const fn shakes(self) -> bool {
        !matches!(self, Self::Far)
    }
}

/// Shared per-frame inputs to [`MatrixCell::tick`].
#[derive(Clone, Copy, Debug)]
pub struct TickContext {
    pub focus: GridPos,
    pub collect: bool,
    pub collect_frame_limit: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    Idle,
    InFlight,
    /// The collect trigger consumed this cell.
    Collected,
    /// A finished flight was replaced by a fresh digit.
    Respawned,
}

#[derive(Clone, Debug)]
pub struct MatrixCell {
    pos: GridPos,
    digit: u8,
    scale: f32,
    jitter: (i8, i8),
    shaking: bool,
    collecting: bool,
    collect_frames: u8,
}

impl MatrixCell {
    pub fn new<R: Rng + ?Sized>(pos: GridPos, rng: &mut R) -> Self {
        Self::with_digit(pos, rng.random_range(0..10))
    }

    pub fn with_digit(pos: GridPos, digit: u8) -> Self {
        Self {
            pos,
            digit: digit % 10,
            scale: INITIAL_SCALE,
            jitter: (0, 0),
            shaking: false,
            collecting: false,
            collect_frames: 0,
        }
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub fn digit(&self) -> u8 {
        self.digit
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn jitter(&self) -> (i8, i8) {
        self.jitter
    }

    pub fn is_shaking(&self) -> bool {
        self.shaking
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    pub fn collect_frames(&self) -> u8 {
        self.collect_frames
    }

    /// Advances the cell by one frame.
    pub fn tick<R: Rng + ?Sized>(&mut self, ctx: &TickContext, rng: &mut R) -> TickOutcome {
        let mut respawned = false;
        if self.collecting {
            if self.collect_frames < ctx.collect_frame_limit {
                self.collect_frames += 1;
                return TickOutcome::InFlight;
            }

            self.scale = MIN_SCALE;
            self.digit = rng.random_range(0..10);
            self.collect_frames = 0;
            self.collecting = false;
            respawned = true;
        }

        let proximity = Proximity::classify(self.pos.distance_sq(ctx.focus));
        self.shaking = proximity.shakes();
        self.update_scale(proximity.target_scale(), proximity.step());

        if proximity == Proximity::Focused && ctx.collect {
            self.collecting = true;
            self.shaking = false;
            self.jitter = (0, 0);
            info!(
                "collect: number={} at=({},{})",
                self.digit, self.pos.col, self.pos.row
            );
            return TickOutcome::Collected;
        }

        self.jitter = if self.shaking {
            (rng.random_range(-1..=1), rng.random_range(-1..=1))
        } else {
            (0, 0)
        };

        if respawned {
            TickOutcome::Respawned
        } else {
            TickOutcome::Idle
        }
    }

    /// Moves `scale` toward `target` by at most `step`.
    pub fn update_scale(&mut self, target: f32, step: f32) {
        if self.scale < target {
            self.scale = (self.scale + step).min(target);
        } else if self.scale > target {
            self.scale = (self.scale - step).max(target);
        }
    }

    /// Fraction of the collect flight completed, while one is drawn.
    pub fn flight_progress(&self, collect_frame_limit: u8) -> Option<f32> {
        if self.collecting && self.collect_frames > 0 && collect_frame_limit > 0 {
            Some(self.collect_frames as f32 / collect_frame_limit as f32)
        } else {
            None
        }
    }

    /// Canvas position for this frame given the slot origin and flight destination.
    pub fn draw_position(
        &self,
        origin: (i32, i32),
        destination: (i32, i32),
        collect_frame_limit: u8,
    ) -> (i32, i32) {
        let x = origin.0 + self.jitter.0 as i32;
        let y = origin.1 + self.jitter.1 as i32;
        match self.flight_progress(collect_frame_limit) {
            Some(progress) => (
                (x as f32 + (destination.0 - x) as f32 * progress) as i32,
                (y as f32 + (destination.1 - y) as f32 * progress) as i32,
            ),
            None => (x, y),
        }
    }
}

/// Fixed grid of cells stored row-major.
#[derive(Clone, Debug)]
pub struct MatrixGrid {
    columns: u8,
    rows: u8,
    cells: Vec<MatrixCell>,
}

impl MatrixGrid {
    pub fn new<R: Rng + ?Sized>(columns: u8, rows: u8, rng: &mut R) -> Self {
        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for col in 0..columns {
                cells.push(MatrixCell::new(GridPos::new(col, row), rng));
            }
        }

        Self {
            columns,
            rows,
            cells,
        }
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, pos: GridPos) -> Option<&MatrixCell> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    pub fn cell_mut(&mut self, pos: GridPos) -> Option<&mut MatrixCell> {
        self.index_of(pos).map(|index| &mut self.cells[index])
    }

    pub fn cells(&self) -> &[MatrixCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [MatrixCell] {
        &mut self.cells
    }

    fn index_of(&self, pos: GridPos) -> Option<usize> {
        if pos.col < self.columns && pos.row < self.rows {
            Some(pos.row as usize * self.columns as usize + pos.col as usize)
        } else {
            None
        }
    }
}
