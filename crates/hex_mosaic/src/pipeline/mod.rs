//! Concurrent stages that turn entities into pixels.
//!
//! - [`scoring`]: fan-in of the two list producers into one rank-ordered collection
//! - [`render`]: bounded worker pool preparing cell images, serialized compositing
pub mod render;
pub mod scoring;
