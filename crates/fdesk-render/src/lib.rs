#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, and frames with hit grids.
//!
//! # Role in freightdesk
//! Widgets draw into a [`frame::Frame`]. The frame's [`buffer::Buffer`] is a
//! plain grid of styled cells that hosts present however they like (the demo
//! prints rows as text). The optional [`frame::HitGrid`] records which widget
//! owns each cell so pointer events can be routed back, which is also how
//! selectors tell an outside click from a click on themselves.

pub mod buffer;
pub mod cell;
pub mod frame;
