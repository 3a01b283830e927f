//! Purpose: Internal JSON parsing boundary shared by CLI command handlers.
//! Exports: `parse` module with decode helpers and failure hints.
//! Role: Single seam for parser usage so callsites avoid ad hoc decode logic.
//! Invariants: CLI input decoding goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
