//! Input validation and output directory preparation.
//!
//! Runs before the inventory. The output root is created when absent; an
//! existing one is reused as-is unless `clear_existing` asks for its contents
//! to be removed first. There is no interactive prompt.
//!
//! Clearing is refused when the output root is the input root or one of its
//! ancestors, since that would delete the photos about to be inventoried.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Input path is not a directory: {0}")]
    InputNotDirectory(PathBuf),
    #[error("Unable to make directory {path}: {source}")]
    CreateOutput { path: PathBuf, source: io::Error },
    #[error("Unable to clear directory {path}: {source}")]
    ClearOutput { path: PathBuf, source: io::Error },
    #[error("Refusing to clear {output}: it contains the input {input}")]
    OutputContainsInput { output: PathBuf, input: PathBuf },
}

pub fn prepare_paths(input: &Path, output: &Path, clear_existing: bool) -> Result<(), PathError> {
    if !input.is_dir() {
        return Err(PathError::InputNotDirectory(input.to_path_buf()));
    }

    if output.is_dir() {
        if clear_existing {
            refuse_if_contains_input(input, output)?;
            clear_directory(output).map_err(|source| PathError::ClearOutput {
                path: output.to_path_buf(),
                source,
            })?;
        }
        return Ok(());
    }

    fs::create_dir_all(output).map_err(|source| PathError::CreateOutput {
        path: output.to_path_buf(),
        source,
    })
}

fn refuse_if_contains_input(input: &Path, output: &Path) -> Result<(), PathError> {
    let resolve = |path: &Path| {
        path.canonicalize().map_err(|source| PathError::ClearOutput {
            path: output.to_path_buf(),
            source,
        })
    };
    let (input_root, output_root) = (resolve(input)?, resolve(output)?);
    if input_root.starts_with(&output_root) {
        return Err(PathError::OutputContainsInput {
            output: output.to_path_buf(),
            input: input.to_path_buf(),
        });
    }
    Ok(())
}

/// Remove everything inside `dir`, keeping `dir` itself.
fn clear_directory(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
