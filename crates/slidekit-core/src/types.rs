use crate::package::content_types::content_type_values as ct;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Word,
    Excel,
    PowerPoint,
}

impl DocumentType {
    /// Maps the main part content type to its document family. Macro-enabled
    /// and template variants are recognized here and nowhere else.
    pub fn from_main_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            ct::WORD_DOCUMENT | ct::WORD_TEMPLATE | ct::WORD_MACRO_DOCUMENT
            | ct::WORD_MACRO_TEMPLATE => Some(Self::Word),
            ct::EXCEL_WORKBOOK | ct::EXCEL_TEMPLATE | ct::EXCEL_MACRO_WORKBOOK
            | ct::EXCEL_MACRO_TEMPLATE | ct::EXCEL_ADDIN => Some(Self::Excel),
            ct::POWERPOINT_PRESENTATION | ct::POWERPOINT_TEMPLATE | ct::POWERPOINT_SLIDESHOW
            | ct::POWERPOINT_MACRO_PRESENTATION | ct::POWERPOINT_MACRO_TEMPLATE
            | ct::POWERPOINT_MACRO_SLIDESHOW => Some(Self::PowerPoint),
            _ => None,
        }
    }

    pub fn is_macro_enabled(content_type: &str) -> bool {
        content_type.contains("macroEnabled")
    }

    /// Content type of the main part in a freshly created package.
    pub fn main_content_type(self) -> &'static str {
        match self {
            Self::Word => ct::WORD_DOCUMENT,
            Self::Excel => ct::EXCEL_WORKBOOK,
            Self::PowerPoint => ct::POWERPOINT_PRESENTATION,
        }
    }

    pub fn main_part_name(self) -> &'static str {
        match self {
            Self::Word => "/word/document.xml",
            Self::Excel => "/xl/workbook.xml",
            Self::PowerPoint => "/ppt/presentation.xml",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word => write!(f, "Word"),
            Self::Excel => write!(f, "Excel"),
            Self::PowerPoint => write!(f, "PowerPoint"),
        }
    }
}
