//! JSON document I/O.
//!
//! Documents are written atomically: data goes to a sibling `.tmp` file which
//! is flushed and then renamed over the target. A crash mid-write leaves the
//! previous document intact, so readers never observe a half-written graph.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Read and parse a JSON document.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened and
/// [`Error::Json`](crate::Error::Json) if it does not parse as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Read and parse a JSON document that may legitimately be absent.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match File::open(path) {
        Ok(file) => Ok(Some(serde_json::from_reader(BufReader::new(file))?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Atomically write `value` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed. On
/// failure the original file, if any, is unchanged.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, value) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// `graph_data.json` becomes `graph_data.json.tmp`; `graph` becomes `graph.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

fn write_to_temp_file<T: Serialize + ?Sized>(temp_path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(temp_path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}
