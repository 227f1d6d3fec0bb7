use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

use crate::params;
use crate::stacks::Stack;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unable to write {0}: {1}")]
    Io(String, std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Parameters(#[from] params::Error),
}

/// Writes `<out_dir>/<stack id>.template.json`, creating the directory.
pub fn write_template(out_dir: &Path, stack: &Stack) -> Result<PathBuf, Error> {
    fs::create_dir_all(out_dir).map_err(|error| Error::Io(out_dir.display().to_string(), error))?;

    let path = out_dir.join(stack.template_file_name());
    let contents = stack.template.to_json()?;
    write_atomically(&path, &contents)?;

    log::info!("Wrote {} template to {}", stack.stack_name, path.display());
    return Ok(path);
}

/// Sets `key` to `value` in a JSON parameter file, keeping every other key.
/// A missing file is created.
pub fn update_parameter(path: &Path, key: &str, value: &str) -> Result<(), Error> {
    let mut contents: Map<String, Value> = match params::read(path) {
        Ok(contents) => contents,
        Err(params::Error::FileNotFound(_)) => Map::new(),
        Err(error) => return Err(error.into()),
    };

    let previous = contents.insert(key.to_string(), Value::String(value.to_string()));
    match previous {
        Some(Value::String(previous)) if previous == value => {
            log::info!("{} in {} is already up to date", key, path.display());
        }
        Some(previous) => {
            log::info!("Updating {} in {} (was {})", key, path.display(), previous);
        }
        None => log::info!("Adding {} to {}", key, path.display()),
    }

    let file_contents = serde_json::to_string_pretty(&contents)?;
    return write_atomically(path, &file_contents);
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), Error> {
    let io_error = |error: std::io::Error| Error::Io(path.display().to_string(), error);

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(io_error)?;

    // Temp files start out owner-only; a fresh file gets the usual 0o666
    // less umask, a replaced file keeps its mode.
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(directory).map_err(io_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .map_err(io_error)?;
    }

    writeln!(file, "{}", contents).map_err(io_error)?;
    file.persist(path).map_err(|error| io_error(error.error))?;

    return Ok(());
}
