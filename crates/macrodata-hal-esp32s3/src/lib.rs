#![cfg_attr(not(test), no_std)]

//! Board glue for the ESP32-S3 Whisplay wiring, generic over `embedded-hal`.

pub mod input;
pub mod platform;
