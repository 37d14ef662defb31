use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use planocheck_types::Result;

/// Serialize `value` as pretty JSON into a synced temp file in `path`'s directory
fn write_temp_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Write `value` to `path`, replacing any previous content.
/// Readers never observe a half-written record.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_temp_json(path, value)?
        .persist(path)
        .map_err(io::Error::from)?;
    Ok(())
}

/// Write `value` to `path` only if nothing exists there yet.
/// Fails with `ErrorKind::AlreadyExists` when another writer got there first.
pub(crate) fn write_json_new<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_temp_json(path, value)?
        .persist_noclobber(path)
        .map_err(io::Error::from)?;
    Ok(())
}
