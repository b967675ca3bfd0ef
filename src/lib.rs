//! Animal guessing game backed by a binary decision tree that grows a new question
//! every time it guesses wrong, and persists itself to a flat file between sessions.
//!
//! Layers, inner to outer:
//! - [`domain`]: the tree, its growth operation and the delimiter-free file format
//! - [`application`]: the game engine, the session loop and tree persistence
//! - [`infrastructure`]: file system and prompt implementations, service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
