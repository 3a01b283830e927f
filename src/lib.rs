//! Purpose: Library crate behind the `framekit` CLI: labeled tables, their JSON codec, and stats.
//! Exports: `api` (stable surface) and `notice` (CLI diagnostics schema).
//! Role: Pure, synchronous helpers; every call is independent of every other.
//! Invariants: No global mutable state; mappings are insertion-ordered (`IndexMap`).
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
mod codec;
mod core;
mod flatten;
pub mod notice;
mod stats;
