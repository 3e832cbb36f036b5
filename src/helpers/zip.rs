//! Part lookup inside ZIP based packages (.xlsx, .docx, .ods).
use crate::error::SheetDocError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::ZipArchive;

/// Part names as they are compared: forward slashes, lower case.
fn normalize(name: &str) -> String {
    name.replace('\\', "/").to_ascii_lowercase()
}

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Opens a part by name. Writers disagree on case and path separators,
    /// so neither is significant.
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, SheetDocError>;

    /// Opens a part for XML parsing.
    fn xml_reader(&'_ mut self, name: &str) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, SheetDocError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, SheetDocError> {
        let wanted = normalize(name);
        let Some(stored) = self.file_names().find(|stored| normalize(stored) == wanted).map(str::to_owned) else {
            return Ok(None);
        };
        Ok(Some(self.by_name(&stored)?))
    }

    fn xml_reader(&'_ mut self, name: &str) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, SheetDocError> {
        Ok(self.file(name)?.map(|file| XmlReader::new(BufReader::new(file))))
    }
}
