//! Purpose: Read CLI input documents from a file path or stdin.
//! Exports: `read_input`.
//! Role: Keep input-source semantics identical across subcommands.
//! Invariants: No path (or `-`) means stdin; input is read fully before parsing.

use std::io::Read;
use std::path::Path;

use framekit::api::{Error, ErrorKind};

pub(crate) fn read_input(path: Option<&Path>) -> Result<String, Error> {
    match path {
        None => read_stdin(),
        Some(path) if path == Path::new("-") => read_stdin(),
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
    }
}

fn read_stdin() -> Result<String, Error> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(text)
}
