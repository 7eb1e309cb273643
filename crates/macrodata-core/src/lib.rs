#![cfg_attr(not(test), no_std)]

//! Board-agnostic animation core for the digit-matrix screensaver.
//!
//! Everything here is host-testable: the firmware only supplies a [`board::Board`],
//! an [`audio::AudioSink`], glyph rasterizers and a random source.

extern crate alloc;

pub mod animation;
pub mod assets;
pub mod audio;
pub mod board;
pub mod cell;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod focus;
pub mod glyph;
pub mod image;
pub mod input;
pub mod startup;

pub use config::EngineConfig;
pub use engine::MatrixEngine;
