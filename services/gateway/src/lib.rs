//! Asybot Gateway Library Crate
//!
//! This library contains all the logic for the robot's brain-to-tablet relay:
//! configuration, the connected-client registry, concurrent command broadcast,
//! and the WebSocket server loop that feeds speech transcripts to the AI
//! collaborator. The `gateway` binary is a thin wrapper around this library.

pub mod broadcast;
pub mod config;
pub mod registry;
pub mod router;
pub mod simulator;
pub mod state;
pub mod ws;
