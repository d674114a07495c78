//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API the command-line tools drive
//! - **Outbound (Driven)**: The two independent capabilities a dispatch needs

pub mod inbound;
pub mod outbound;
