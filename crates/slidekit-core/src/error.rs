use thiserror::Error;

/// Placeholder substituted with the offending slide's identity when an
/// internal error crosses the builder boundary.
pub const SLIDE_PLACEHOLDER: &str = "{slide}";

#[derive(Error, Debug)]
pub enum SlidekitError {
    #[error("Invalid OOXML package: {message}")]
    InvalidPackage { message: String },

    #[error("Unsupported document kind: root part has content type '{content_type}'")]
    UnsupportedDocumentKind { content_type: String },

    #[error("Missing required part '{part_path}' in {document_type} document")]
    MissingPart { part_path: String, document_type: String },

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    #[error("Invalid relationship: {message}")]
    InvalidRelationship { message: String },

    #[error("Relationship id '{id}' already exists on part '{part}'")]
    DuplicateRelationshipId { part: String, id: String },

    #[error("Invalid slide source: {message}")]
    InvalidSlideSource { message: String },

    /// Raised inside the copy engine. The template may contain
    /// [`SLIDE_PLACEHOLDER`], filled in by the builder.
    #[error("Internal presentation builder error: {template}")]
    Internal { template: String },

    #[error("{message}")]
    SlideBuild { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl SlidekitError {
    pub fn internal(template: impl Into<String>) -> Self {
        Self::Internal {
            template: template.into(),
        }
    }

    /// Converts an internal error into a user-facing one naming `slide`.
    /// Every other variant passes through untouched.
    pub fn in_slide_context(self, slide: &str) -> Self {
        match self {
            Self::Internal { template } => {
                let message = if template.contains(SLIDE_PLACEHOLDER) {
                    template.replace(SLIDE_PLACEHOLDER, slide)
                } else {
                    format!("{} ({})", template, slide)
                };
                Self::SlideBuild { message }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlidekitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = SlidekitError::InvalidPackage {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid OOXML package: test error");
    }

    #[test]
    fn error_missing_part_formats_correctly() {
        let err = SlidekitError::MissingPart {
            part_path: "/ppt/presentation.xml".to_string(),
            document_type: "PowerPoint".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required part '/ppt/presentation.xml' in PowerPoint document"
        );
    }

    #[test]
    fn internal_error_gets_slide_identity() {
        let err = SlidekitError::internal("Unsupported content in {slide}: ink");
        let err = err.in_slide_context("source 2, slide 7");
        match err {
            SlidekitError::SlideBuild { message } => {
                assert_eq!(message, "Unsupported content in source 2, slide 7: ink");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_internal_errors_pass_through() {
        let err = SlidekitError::XmlWrite("boom".to_string()).in_slide_context("slide 1");
        assert!(matches!(err, SlidekitError::XmlWrite(_)));
    }
}
