mod builder;
mod cache;
mod copy;
mod document;
mod publish;
mod scale;
mod settings;
mod signature;

pub use builder::PresentationBuilder;
pub use cache::{CacheKey, CacheStats, EquivalenceCache};
pub use copy::Diagnostic;
pub use document::PmlDocument;
pub use publish::{
    build_presentation, build_presentation_with_settings, publish_slides,
    publish_slides_parallel, publish_slides_with_settings, PublishedSlide, SlidePublisher,
    SlideSource,
};
pub use scale::{scale_factor, scale_shapes};
pub use settings::PresentationBuilderSettings;
pub use signature::{layout_signature, master_signature};
