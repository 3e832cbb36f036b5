use thiserror::Error;

/// Every failure the converter reports. Module errors convert in with `?`,
/// and [`ResultMessage::with_prefix`] puts the affected item in front.
#[derive(Error, Debug)]
pub enum SheetDocError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    ImageError(#[from] image::ImageError),

    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    OdsError(#[from] crate::spreadsheet::ods::OdsError),

    #[error("{0}")]
    RangeError(#[from] crate::table::range::RangeError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("{0}")]
    DocumentError(#[from] crate::document::DocumentError),

    #[error("{0}")]
    CompanionError(#[from] crate::document::companion::CompanionError),
}

pub trait ResultMessage {
    /// Rewrites the error as `"{message}: {error}"`.
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetDocError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|error| SheetDocError::WithContextError(format!("{message}: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_prepended_to_message() {
        let result: Result<(), SheetDocError> = Err(crate::spreadsheet::SpreadsheetError::SharedStringError(9).into());
        let error = result.with_prefix("Cell B2").with_prefix("Error processing report.xlsx").unwrap_err();
        assert_eq!(error.to_string(), "Error processing report.xlsx: Cell B2: Shared string index 9 is out of range");
    }
}
