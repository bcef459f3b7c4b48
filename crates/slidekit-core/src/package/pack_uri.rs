//! Part name arithmetic. Part names are absolute (`/ppt/slides/slide1.xml`);
//! zip entry names are the same without the leading slash. The package
//! itself is addressed as `/`.

pub const PACKAGE_URI: &str = "/";

/// Folder of a part name, without trailing slash (`/ppt/slides`).
pub fn base_uri(name: &str) -> &str {
    match name.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &name[..i],
    }
}

pub fn file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Lowercased extension, empty when there is none.
pub fn extension(name: &str) -> String {
    file_name(name)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Resolves a relationship target against the folder of `source`.
pub fn from_rel_ref(source: &str, target: &str) -> String {
    let target = target.split('#').next().unwrap_or(target);
    let joined = if target.starts_with('/') {
        target.to_string()
    } else {
        let base = base_uri(source);
        if base == "/" {
            format!("/{}", target)
        } else {
            format!("{}/{}", base, target)
        }
    };
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Relative reference from the folder of `source` to `target`, as written
/// in a `.rels` part.
pub fn relative_ref(source: &str, target: &str) -> String {
    let base = base_uri(source);
    if base == "/" {
        return target.trim_start_matches('/').to_string();
    }

    let base_segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    let target_segments: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let common = base_segments
        .iter()
        .zip(target_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..")
        .take(base_segments.len() - common)
        .collect();
    parts.extend_from_slice(&target_segments[common..]);
    parts.join("/")
}

/// `.rels` part name for `source` (`/ppt/slides/_rels/slide1.xml.rels`).
pub fn rels_uri(source: &str) -> String {
    if source == PACKAGE_URI {
        return "/_rels/.rels".to_string();
    }
    let base = base_uri(source);
    let file = file_name(source);
    if base == "/" {
        format!("/_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", base, file)
    }
}

/// Inverse of [`rels_uri`]. `None` when `rels` is not a relationships part.
pub fn source_of_rels(rels: &str) -> Option<String> {
    let file = file_name(rels).strip_suffix(".rels")?;
    let folder = base_uri(rels);
    let owner_folder = folder.strip_suffix("_rels")?.trim_end_matches('/');
    if file.is_empty() {
        return Some(PACKAGE_URI.to_string());
    }
    Some(format!("{}/{}", owner_folder, file))
}

/// Numeric suffix following `stem` in the file name (`slide12.xml` -> 12).
pub fn index_after_stem(name: &str, stem: &str) -> Option<u32> {
    let file = file_name(name);
    let rest = file.strip_prefix(stem)?;
    let digits = rest.split('.').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn to_zip_name(name: &str) -> &str {
    name.trim_start_matches('/')
}

pub fn from_zip_name(entry: &str) -> String {
    format!("/{}", entry.trim_start_matches('/'))
}
