//! Input handling for files, directories, and stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One SQL input to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSource {
    pub name: String,
    pub content: String,
}

/// Errors raised while collecting SQL inputs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("no .sql files found in {}", .0.display())]
    EmptyDirectory(PathBuf),
}

/// Read SQL input from files, directories or stdin.
///
/// If no paths are provided, reads from stdin. Directories contribute their
/// `.sql` files (non-recursive, sorted by path).
pub fn read_input(paths: &[PathBuf]) -> Result<Vec<SqlSource>, InputError> {
    if paths.is_empty() {
        return read_from_stdin().map(|source| vec![source]);
    }

    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            let files = sql_files_in(path)?;
            if files.is_empty() {
                return Err(InputError::EmptyDirectory(path.clone()));
            }
            for file in files {
                sources.push(read_file(&file)?);
            }
        } else {
            sources.push(read_file(path)?);
        }
    }
    Ok(sources)
}

fn read_from_stdin() -> Result<SqlSource, InputError> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .map_err(InputError::Stdin)?;

    Ok(SqlSource {
        name: "<stdin>".to_string(),
        content,
    })
}

fn read_file(path: &Path) -> Result<SqlSource, InputError> {
    let content = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(SqlSource {
        name: path.display().to_string(),
        content,
    })
}

fn sql_files_in(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let read_err = |source: io::Error| InputError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_sql = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if path.is_file() && is_sql {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
