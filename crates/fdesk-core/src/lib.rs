#![forbid(unsafe_code)]

//! Core: canonical input events, geometry, and display-width helpers.
//!
//! # Role in freightdesk
//! `fdesk-core` is the input layer shared by every other crate. Hosts translate
//! whatever their terminal backend produces into [`event::Event`] values and
//! hand them to widget state machines together with hit-test results.
//!
//! # Primary responsibilities
//! - **Event**: keys, pointer, paste, resize, focus.
//! - **Rect / Sides**: cell-space rectangles used for layout and hit testing.
//! - **text_width**: grapheme-aware width, truncation, and editing helpers.

pub mod event;
pub mod geometry;
pub mod text_width;
