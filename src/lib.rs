//! CSM Editor - Collaborative State Machine editing core
//! Registries, links and tree helpers behind a visual CSM editor, plus
//! reading and writing the PKL description format.

pub mod codegen;
pub mod config;
pub mod csm;
pub mod description;
pub mod events;
pub mod graph;
pub mod links;
pub mod parser;
pub mod registry;
pub mod session;

#[cfg(test)]
mod fixtures;

pub use codegen::generate_pkl;
pub use config::EditorConfig;
pub use csm::*;
pub use description::CollaborativeStateMachineDescription;
pub use parser::{load_file, parse_pkl};
pub use session::{EditorSession, SessionError};
