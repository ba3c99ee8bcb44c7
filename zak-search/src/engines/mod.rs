//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SourceFinder`].

pub mod serpapi;

pub use serpapi::SerpApiEngine;
