pub mod error;
pub mod types;
pub mod xml;
pub mod hash;
pub mod package;
pub mod util;
pub mod pml;

pub use error::{Result, SlidekitError};
pub use types::DocumentType;
pub use package::OoxmlPackage;

pub use pml::{
    build_presentation, publish_slides, publish_slides_parallel, Diagnostic, PmlDocument,
    PresentationBuilder, PresentationBuilderSettings, PublishedSlide, SlidePublisher, SlideSource,
};
