use crate::xml::namespaces::{A, P};
use crate::xml::{XName, XmlDocument};
use indextree::NodeId;

/// Smallest font size written after scaling, in hundredths of a point.
const MIN_FONT_SIZE: i64 = 100;

/// Factor mapping a `source` slide size onto `destination`, preserving
/// aspect ratio. Degenerate sizes scale by 1.
pub fn scale_factor(destination: (i64, i64), source: (i64, i64)) -> f64 {
    let (dest_cx, dest_cy) = destination;
    let (src_cx, src_cy) = source;
    if src_cx <= 0 || src_cy <= 0 || dest_cx <= 0 || dest_cy <= 0 {
        return 1.0;
    }
    let x = dest_cx as f64 / src_cx as f64;
    let y = dest_cy as f64 / src_cy as f64;
    x.min(y)
}

pub fn is_identity(scale: f64) -> bool {
    (scale - 1.0).abs() < 1e-9
}

fn scaled(value: &str, scale: f64) -> Option<String> {
    let v: i64 = value.parse().ok()?;
    Some((((v as f64) * scale).round() as i64).to_string())
}

/// Scales DrawingML geometry under `node`: `a:off`, `a:chOff`, `a:chExt`,
/// and `a:ext` elements that carry `cx`/`cy` (extension-list `a:ext`
/// entries do not). With `scale_fonts`, `sz` on run properties too.
pub fn scale_shapes(doc: &mut XmlDocument, node: NodeId, scale: f64, scale_fonts: bool) {
    if is_identity(scale) {
        return;
    }

    let x = XName::local("x");
    let y = XName::local("y");
    let cx = XName::local("cx");
    let cy = XName::local("cy");
    let sz = XName::local("sz");

    let off = A::off();
    let ch_off = A::chOff();
    let ext = A::ext();
    let ch_ext = A::chExt();
    let run_props = [A::rPr(), A::defRPr(), A::endParaRPr()];
    let point_attrs = [&x, &y];
    let size_attrs = [&cx, &cy];
    let font_attrs = [&sz];

    let nodes: Vec<NodeId> = doc.descendants(node).collect();
    for n in nodes {
        let Some(name) = doc.name(n).cloned() else {
            continue;
        };

        let targets: &[&XName] = if name == off || name == ch_off {
            &point_attrs
        } else if name == ext || name == ch_ext {
            &size_attrs
        } else if scale_fonts && run_props.contains(&name) {
            &font_attrs
        } else {
            continue;
        };

        for attr in targets {
            let Some(value) = doc.attribute(n, attr).and_then(|v| scaled(v, scale)) else {
                continue;
            };
            let value = if *attr == &sz {
                value
                    .parse::<i64>()
                    .map(|v| v.max(MIN_FONT_SIZE).to_string())
                    .unwrap_or(value)
            } else {
                value
            };
            doc.set_attribute(n, attr, &value);
        }
    }
}

/// Scales the `p:cSld` shape tree of a slide, layout, or master document.
pub fn scale_part(doc: &mut XmlDocument, scale: f64, scale_fonts: bool) {
    let Some(c_sld) = doc.root().and_then(|root| doc.child_element(root, &P::cSld())) else {
        return;
    };
    scale_shapes(doc, c_sld, scale, scale_fonts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse;
    use pretty_assertions::assert_eq;

    const SLIDE: &str = r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree><p:sp><p:spPr><a:xfrm><a:off x="1000" y="2000"/><a:ext cx="3000" cy="4000"/></a:xfrm></p:spPr>
  <p:txBody><a:p><a:r><a:rPr sz="1800"/><a:t>x</a:t></a:r></a:p></p:txBody></p:sp>
  <p:extLst><p:ext uri="{X}"/></p:extLst></p:spTree></p:cSld></p:sld>"#;

    fn attr(doc: &XmlDocument, name: XName, attr: &str) -> Option<String> {
        let root = doc.root().unwrap();
        let node = doc.descendants_named(root, &name)[0];
        doc.attribute(node, &XName::local(attr)).map(|s| s.to_string())
    }

    #[test]
    fn scale_factor_preserves_aspect_ratio() {
        let f = scale_factor((12_192_000, 6_858_000), (9_144_000, 6_858_000));
        assert!((f - 1.0).abs() < 1e-9);

        let f = scale_factor((9_144_000, 6_858_000), (12_192_000, 6_858_000));
        assert!((f - 0.75).abs() < 1e-9);

        assert_eq!(scale_factor((100, 100), (0, 100)), 1.0);
    }

    #[test]
    fn scales_offsets_and_extents() {
        let mut doc = parse(SLIDE).unwrap();
        scale_part(&mut doc, 0.5, false);

        assert_eq!(attr(&doc, A::off(), "x").as_deref(), Some("500"));
        assert_eq!(attr(&doc, A::off(), "y").as_deref(), Some("1000"));
        assert_eq!(attr(&doc, A::ext(), "cx").as_deref(), Some("1500"));
        assert_eq!(attr(&doc, A::ext(), "cy").as_deref(), Some("2000"));
        assert_eq!(attr(&doc, A::rPr(), "sz").as_deref(), Some("1800"));
    }

    #[test]
    fn font_sizes_scale_only_when_asked() {
        let mut doc = parse(SLIDE).unwrap();
        scale_part(&mut doc, 0.5, true);
        assert_eq!(attr(&doc, A::rPr(), "sz").as_deref(), Some("900"));

        let mut doc = parse(SLIDE).unwrap();
        scale_part(&mut doc, 0.01, true);
        assert_eq!(attr(&doc, A::rPr(), "sz").as_deref(), Some("100"));
    }
}
