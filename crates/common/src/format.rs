//! Output document format tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StepcastError;

/// Document formats a step sequence can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// HTML document plus an `images/` directory of PNG screenshots.
    #[default]
    Html,
    /// Single A4 PDF file, one page per step.
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Html, ExportFormat::Pdf];

    /// File extension for documents of this format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Html => f.write_str("HTML"),
            ExportFormat::Pdf => f.write_str("PDF"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = StepcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(StepcastError::unsupported_format(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("HTML".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!(" pdf ".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let err = "docx".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, StepcastError::UnsupportedFormat { ref format } if format == "docx"));
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        assert_eq!(serde_json::to_string(&ExportFormat::Pdf).unwrap(), "\"pdf\"");
        let parsed: ExportFormat = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(parsed, ExportFormat::Html);
    }
}
