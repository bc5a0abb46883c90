//! Asybot Core Library
//!
//! Domain logic shared by the gateway service: the conversational-AI
//! collaborator contract and the robot's expression vocabulary. Transport,
//! connection tracking, and command routing live in the gateway crate; this
//! crate knows nothing about WebSockets.

pub mod expression;
pub mod llm_client;
