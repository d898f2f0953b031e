#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Library surface of the Path Defence command-line adapter.
//!
//! The binary wires platform concerns (argument parsing, the macroquad
//! window) around [`engine::Engine`], which owns the per-step pipeline.

pub mod engine;
