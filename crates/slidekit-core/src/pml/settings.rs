use serde::{Deserialize, Serialize};

/// Knobs for [`PresentationBuilder`](super::PresentationBuilder) and the
/// publish helpers. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationBuilderSettings {
    /// Scale `sz` on run properties along with geometry when slide sizes
    /// differ.
    pub scale_font_sizes: bool,
    pub strip_section_lists: bool,
    pub clear_custom_properties: bool,
    /// Remove the `smtClean` attribute from every XML part on finish.
    pub strip_smt_clean: bool,
    /// Digits in the `{base}_{NNN}` names produced by publishing.
    pub publish_number_width: usize,
    pub copy_comments: bool,
    pub copy_notes: bool,
}

impl Default for PresentationBuilderSettings {
    fn default() -> Self {
        Self {
            scale_font_sizes: false,
            strip_section_lists: true,
            clear_custom_properties: true,
            strip_smt_clean: true,
            publish_number_width: 3,
            copy_comments: true,
            copy_notes: true,
        }
    }
}

impl PresentationBuilderSettings {
    pub fn new() -> Self {
        Self::default()
    }
}
