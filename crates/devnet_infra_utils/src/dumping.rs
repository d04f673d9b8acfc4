use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Writes `data` to `file_path` as pretty-printed JSON followed by a newline, creating missing
/// parent directories.
pub fn serialize_to_file<T: Serialize>(data: &T, file_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(file_path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
