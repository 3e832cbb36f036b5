use crate::error::SheetDocError;
use std::path::Path;

/// A named file held in memory, either uploaded or read from disk.
#[derive(Clone, Debug)]
pub struct InputFile {
    /// File name including extension, without directories
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        InputFile {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, keeping only its file name.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SheetDocError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(InputFile { name, bytes })
    }

    /// File name without its last extension ("chart1.png" -> "chart1").
    pub fn stem(&self) -> &str {
        file_stem(&self.name)
    }
}

/// File name without its last extension. Names without an extension are returned as is.
pub(crate) fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    }
}
