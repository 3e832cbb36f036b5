use crate::error::SheetDocError;
use glob::Pattern;

/// Criteria for selecting the sheet to read and how to read it.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// Sheet name patterns; the first sheet matching any of them is read.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Treat the first used row as column names.
    pub header: bool,

    /// Convert error cells (`#DIV/0!` and friends) to empty values instead of text.
    pub error_as_null: bool,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            sheet_name_patterns: None,
            header: true,
            error_as_null: false,
        }
    }
}

impl Criteria {
    /// Builds criteria selecting sheets by glob pattern, e.g. `"Data*"`.
    pub fn with_sheet_pattern(mut self, pattern: &str) -> Result<Self, SheetDocError> {
        let pattern = Pattern::new(pattern)?;
        self.sheet_name_patterns
            .get_or_insert_with(Vec::new)
            .push(pattern);
        Ok(self)
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}
