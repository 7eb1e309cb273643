//! Wandering focus point that drives cell proximity.

use log::info;
use rand::Rng;

use crate::cell::GridPos;

#[derive(Clone, Debug)]
pub struct FocusController {
    columns: u8,
    rows: u8,
    location: GridPos,
    /// Re-rolled on every randomization. Scaling does not consult it.
    active: bool,
    randomizations: u32,
}

impl FocusController {
    pub fn new<R: Rng + ?Sized>(columns: u8, rows: u8, rng: &mut R) -> Self {
        let mut focus = Self {
            columns: columns.max(1),
            rows: rows.max(1),
            location: GridPos::default(),
            active: true,
            randomizations: 0,
        };
        focus.reseed(rng);
        focus
    }

    pub fn location(&self) -> GridPos {
        self.location
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of periodic randomizations since construction.
    pub fn randomizations(&self) -> u32 {
        self.randomizations
    }

    pub fn set_location(&mut self, location: GridPos) {
        self.location = GridPos::new(
            location.col.min(self.columns - 1),
            location.row.min(self.rows - 1),
        );
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.reseed(rng);
        self.randomizations = self.randomizations.saturating_add(1);
        info!(
            "focus: randomized active={} location=({},{})",
            self.active, self.location.col, self.location.row
        );
    }

    fn reseed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.location = GridPos::new(
            rng.random_range(0..self.columns),
            rng.random_range(0..self.rows),
        );
        let roll: u8 = rng.random_range(0..=10);
        self.active = if roll > 3 { rng.random_bool(0.5) } else { true };
    }
}
