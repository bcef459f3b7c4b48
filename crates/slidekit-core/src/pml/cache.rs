//! Per-build equivalence cache for images, media, slide masters and slide
//! layouts. Holds destination part names only; the destination package owns
//! the parts.

use crate::error::{Result, SlidekitError};
use crate::hash::fingerprint;
use crate::package::{OoxmlPackage, PartKind};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Cache keys, ordered by variant and then by their strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CacheKey {
    Image { fingerprint: String },
    Media { content_type: String, fingerprint: String },
    SlideMaster { signature: String },
    SlideLayout { master: String, signature: String },
}

/// A place where a cached unit has been related from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    pub part: String,
    pub rel_type: String,
    pub id: String,
}

/// Image or media bytes seen during a build.
#[derive(Debug, Clone)]
pub struct ContentData {
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub fingerprint: String,
    pub references: Vec<ContentReference>,
    /// Destination part holding the bytes, once written.
    pub holder: Option<String>,
}

impl ContentData {
    fn new(content_type: &str, bytes: &[u8], fingerprint: String) -> Self {
        Self {
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
            fingerprint,
            references: Vec::new(),
            holder: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlideMasterData {
    pub part: String,
    pub signature: String,
    /// Destination layouts known to belong to this master.
    pub layouts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SlideLayoutData {
    pub part: String,
    pub master: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub enum CacheEntry {
    Image(ContentData),
    Media(ContentData),
    SlideMaster(SlideMasterData),
    SlideLayout(SlideLayoutData),
}

/// Points at one image or media entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHandle {
    key: CacheKey,
    slot: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub images: usize,
    pub image_hits: usize,
    pub media: usize,
    pub media_hits: usize,
    pub masters: usize,
    pub master_hits: usize,
    pub layouts: usize,
    pub layout_hits: usize,
}

#[derive(Debug, Default)]
pub struct EquivalenceCache {
    /// Fingerprint buckets hold every distinct payload sharing a hash.
    entries: BTreeMap<CacheKey, Vec<CacheEntry>>,
    stats: CacheStats,
}

impl EquivalenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images are equivalent when their bytes are identical.
    pub fn get_or_add_image(&mut self, content_type: &str, bytes: &[u8]) -> ContentHandle {
        let fp = fingerprint(bytes);
        let key = CacheKey::Image {
            fingerprint: fp.clone(),
        };
        let bucket = self.entries.entry(key.clone()).or_default();
        let existing = bucket.iter().position(|e| match e {
            CacheEntry::Image(data) => data.bytes == bytes,
            _ => false,
        });
        let slot = match existing {
            Some(slot) => {
                self.stats.image_hits += 1;
                slot
            }
            None => {
                bucket.push(CacheEntry::Image(ContentData::new(content_type, bytes, fp)));
                self.stats.images += 1;
                bucket.len() - 1
            }
        };
        ContentHandle { key, slot }
    }

    /// Media are equivalent when content type and bytes are identical.
    pub fn get_or_add_media(&mut self, content_type: &str, bytes: &[u8]) -> ContentHandle {
        let fp = fingerprint(bytes);
        let key = CacheKey::Media {
            content_type: content_type.to_string(),
            fingerprint: fp.clone(),
        };
        let bucket = self.entries.entry(key.clone()).or_default();
        let existing = bucket.iter().position(|e| match e {
            CacheEntry::Media(data) => data.content_type == content_type && data.bytes == bytes,
            _ => false,
        });
        let slot = match existing {
            Some(slot) => {
                self.stats.media_hits += 1;
                slot
            }
            None => {
                bucket.push(CacheEntry::Media(ContentData::new(content_type, bytes, fp)));
                self.stats.media += 1;
                bucket.len() - 1
            }
        };
        ContentHandle { key, slot }
    }

    pub fn content(&self, handle: &ContentHandle) -> Option<&ContentData> {
        match self.entries.get(&handle.key)?.get(handle.slot)? {
            CacheEntry::Image(data) | CacheEntry::Media(data) => Some(data),
            _ => None,
        }
    }

    /// Relates `part` to the cached content, returning the relationship id.
    /// Reuses a relationship already recorded for `part` and `rel_type`,
    /// else relates to the destination part already holding the bytes, else
    /// writes the bytes to a new part.
    pub fn materialize(
        &mut self,
        handle: &ContentHandle,
        destination: &mut OoxmlPackage,
        part: &str,
        rel_type: &str,
    ) -> Result<String> {
        let (data, kind) = match self
            .entries
            .get_mut(&handle.key)
            .and_then(|bucket| bucket.get_mut(handle.slot))
        {
            Some(CacheEntry::Image(data)) => (data, PartKind::Image),
            Some(CacheEntry::Media(data)) => (data, PartKind::Media),
            _ => {
                return Err(SlidekitError::internal(format!(
                    "stale content handle {:?} while copying {{slide}}",
                    handle.key
                )))
            }
        };

        if let Some(reference) = data
            .references
            .iter()
            .find(|r| r.part == part && r.rel_type == rel_type)
        {
            if destination.has_relationship(part, &reference.id) {
                return Ok(reference.id.clone());
            }
        }

        let holder = holder_part(data, kind, destination);
        let id = destination.get_or_create_id_of_part(part, &holder, rel_type)?;
        debug!(part, holder = %holder, id = %id, "related cached content");
        data.references.push(ContentReference {
            part: part.to_string(),
            rel_type: rel_type.to_string(),
            id: id.clone(),
        });
        Ok(id)
    }

    /// Destination part holding the cached bytes, written on first use. The
    /// caller relates to it under an id of its own choosing.
    pub fn materialize_part(
        &mut self,
        handle: &ContentHandle,
        destination: &mut OoxmlPackage,
    ) -> Result<String> {
        match self
            .entries
            .get_mut(&handle.key)
            .and_then(|bucket| bucket.get_mut(handle.slot))
        {
            Some(CacheEntry::Image(data)) => Ok(holder_part(data, PartKind::Image, destination)),
            Some(CacheEntry::Media(data)) => Ok(holder_part(data, PartKind::Media, destination)),
            _ => Err(SlidekitError::internal(format!(
                "stale content handle {:?} while copying {{slide}}",
                handle.key
            ))),
        }
    }

    /// Destination master for `signature`, if one was registered.
    pub fn find_slide_master(&mut self, signature: &str) -> Option<&SlideMasterData> {
        let key = CacheKey::SlideMaster {
            signature: signature.to_string(),
        };
        match self.entries.get(&key)?.first()? {
            CacheEntry::SlideMaster(data) => {
                self.stats.master_hits += 1;
                Some(data)
            }
            _ => None,
        }
    }

    /// Registers `part` under `signature` unless the signature is already
    /// known. Returns the part that represents the signature.
    pub fn get_or_add_slide_master(&mut self, signature: &str, part: &str) -> String {
        let key = CacheKey::SlideMaster {
            signature: signature.to_string(),
        };
        let bucket = self.entries.entry(key).or_default();
        if let Some(CacheEntry::SlideMaster(data)) = bucket.first() {
            return data.part.clone();
        }
        bucket.push(CacheEntry::SlideMaster(SlideMasterData {
            part: part.to_string(),
            signature: signature.to_string(),
            layouts: Vec::new(),
        }));
        self.stats.masters += 1;
        part.to_string()
    }

    pub fn find_slide_layout(&mut self, master: &str, signature: &str) -> Option<&SlideLayoutData> {
        let key = CacheKey::SlideLayout {
            master: master.to_string(),
            signature: signature.to_string(),
        };
        match self.entries.get(&key)?.first()? {
            CacheEntry::SlideLayout(data) => {
                self.stats.layout_hits += 1;
                Some(data)
            }
            _ => None,
        }
    }

    /// Layout counterpart of [`get_or_add_slide_master`]; also attaches a
    /// newly registered layout to its master's entry.
    ///
    /// [`get_or_add_slide_master`]: Self::get_or_add_slide_master
    pub fn get_or_add_slide_layout(&mut self, master: &str, signature: &str, part: &str) -> String {
        let key = CacheKey::SlideLayout {
            master: master.to_string(),
            signature: signature.to_string(),
        };
        let bucket = self.entries.entry(key).or_default();
        if let Some(CacheEntry::SlideLayout(data)) = bucket.first() {
            return data.part.clone();
        }
        bucket.push(CacheEntry::SlideLayout(SlideLayoutData {
            part: part.to_string(),
            master: master.to_string(),
            signature: signature.to_string(),
        }));
        self.stats.layouts += 1;

        for entry in self.entries.values_mut().flatten() {
            if let CacheEntry::SlideMaster(data) = entry {
                if data.part == master {
                    data.layouts.push(part.to_string());
                }
            }
        }
        part.to_string()
    }

    pub fn master_layouts(&self, master: &str) -> Vec<String> {
        self.entries
            .values()
            .flatten()
            .find_map(|e| match e {
                CacheEntry::SlideMaster(data) if data.part == master => Some(data.layouts.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

fn holder_part(data: &mut ContentData, kind: PartKind, destination: &mut OoxmlPackage) -> String {
    match &data.holder {
        Some(holder) if destination.contains_part(holder) => holder.clone(),
        _ => {
            let name = destination.add_part(kind, &data.content_type, data.bytes.clone());
            data.holder = Some(name.clone());
            name
        }
    }
}
