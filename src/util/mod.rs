//! Utilities shared by tests and services

pub mod testing;
