//! # TORQ Common Library
//!
//! Shared vocabulary for the TORQ brushless motor drive firmware:
//! axis state enums, error bitflags, configuration structs, the
//! collaborator contracts consumed by the axis controller, and the
//! board-wide context handle.
//!
//! Everything here is transport-neutral: the axis controller and any
//! surrounding telemetry/property layer speak these types.

pub mod axis;
pub mod board;
pub mod consts;
pub mod drive;
pub mod sync;
