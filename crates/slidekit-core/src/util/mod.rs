pub mod descendants;

pub use descendants::{descendants_trimmed, paragraph_texts};
