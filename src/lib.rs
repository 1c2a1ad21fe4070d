//! Builds multilingual audio courses from phrase definitions and clips.
//!
//! Each course's sentences are resolved against the shared clip store,
//! folded into one track per translation language, split into parts of a
//! fixed phrase count and encoded. A JSON catalog and static pages describe
//! the result.

pub mod assembler;
pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod course;
pub mod pipeline;
pub mod resolver;
pub mod site;
pub mod synthesis;
pub mod types;
