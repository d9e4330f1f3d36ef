//! Core types and logic for queue-clicker.
//!
//! This crate watches a stream of screen frames for a "join queue" style
//! button, confirms it by reading its label, and clicks it once. Screen
//! capture, text recognition and pointer input are traits here; the CLI
//! crate supplies the real backends.
//!
//! # Modules
//!
//! - [`config`]: tunables for every stage, with serde defaults
//! - [`frame`]: captured frames and the [`frame::FrameSource`] capability
//! - [`detect`]: color mask, contour extraction and geometric filtering
//! - [`verify`]: keyword confirmation through a [`verify::TextRecognizer`]
//! - [`mapper`]: frame pixels to pointer coordinates
//! - [`actuator`]: the [`actuator::PointerActuator`] capability and click sequence
//! - [`monitor`]: the polling loop and its state machine
//! - [`error`]: error type with codes and suggestions
//!
//! # Pipeline
//!
//! | Stage | Input | Output |
//! |-------|-------|--------|
//! | **Capture** | screen | RGB frame + logical screen size |
//! | **Detect** | frame | candidate regions |
//! | **Verify** | frame + region | keyword match (optional) |
//! | **Map** | region center | pointer point |
//! | **Click** | pointer point | move, click, press, release |
//!
//! At most one click is dispatched per monitor run.

pub mod actuator;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod mapper;
pub mod monitor;
pub mod verify;
