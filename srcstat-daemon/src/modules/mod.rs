//! Module initialization.
//!
//! Each srcstat crate gets a small `init` function that converts the
//! relevant `SrcstatConfig` section into the crate's own configuration and
//! returns the built module together with the channel endpoint the
//! orchestrator wires to the next stage.
//!
//! ```text
//! listener --ServerEvent--> match-engine --CompletedMatch--> orchestrator
//! ```

pub mod listener;
pub mod match_engine;
