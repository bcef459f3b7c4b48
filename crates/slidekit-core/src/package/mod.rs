pub mod content_types;
pub mod guard;
pub mod ooxml;
pub mod pack_uri;
pub mod part_kind;
pub mod parts;
pub mod relationships;

pub use content_types::ContentTypes;
pub use guard::XmlPartGuard;
pub use ooxml::{CoreProperties, OoxmlPackage};
pub use pack_uri::PACKAGE_URI;
pub use part_kind::{Capability, PartKind};
pub use parts::Part;
pub use relationships::{relationship_types, Relationship, Relationships, TargetMode};
