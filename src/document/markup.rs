//! Markup parsing and serialization for [`VerseDocument`]
//!
//! The rendered chapter markup is a small, well-formed dialect, so it is
//! tokenized with quick-xml rather than a full HTML parser.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;

use super::{ElementData, NodeId, NodeKind, VerseDocument};
use crate::error::{DocumentError, DocumentResult};

/// Parse a markup fragment into detached nodes. Child nodes are attached to
/// their fragment parents; the returned handles are the fragment's top-level
/// nodes, left unattached for the caller to splice in.
pub(super) fn parse_fragment(
    doc: &mut VerseDocument,
    markup_text: &str,
) -> DocumentResult<Vec<NodeId>> {
    // The renderer writes the HTML entity for non-breaking spaces; quick-xml's
    // unescaper only knows the XML predefined set.
    let markup_text = markup_text.replace("&nbsp;", "\u{a0}");
    let mut reader = XmlReader::from_str(&markup_text);
    let mut roots: Vec<NodeId> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = element_from_tag(doc, &e)?;
                place(doc, &stack, &mut roots, id);
                stack.push(id);
            }
            Ok(Event::Empty(e)) => {
                let id = element_from_tag(doc, &e)?;
                place(doc, &stack, &mut roots, id);
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let payload = t
                    .unescape()
                    .map_err(|e| DocumentError::Parse(e.to_string()))?
                    .into_owned();
                let id = doc.new_text(payload);
                place(doc, &stack, &mut roots, id);
            }
            Ok(Event::CData(t)) => {
                let payload = String::from_utf8_lossy(t.as_ref()).into_owned();
                let id = doc.new_text(payload);
                place(doc, &stack, &mut roots, id);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Parse(e.to_string())),
            _ => {}
        }
    }
    Ok(roots)
}

fn element_from_tag(doc: &mut VerseDocument, e: &BytesStart) -> DocumentResult<NodeId> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut data = ElementData::new(tag);
    for a in e.attributes().flatten() {
        let key = String::from_utf8_lossy(a.key.as_ref()).to_string();
        let value = a
            .unescape_value()
            .map_err(|e| DocumentError::Parse(e.to_string()))?;
        data.set_attr(&key, &value);
    }
    Ok(doc.new_element(data))
}

fn place(doc: &mut VerseDocument, stack: &[NodeId], roots: &mut Vec<NodeId>, id: NodeId) {
    match stack.last() {
        Some(&parent) => doc.attach(parent, id),
        None => roots.push(id),
    }
}

/// Serialize one node and its subtree to markup text
pub(super) fn serialize_node(doc: &VerseDocument, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Text(s) => out.push_str(&partial_escape(s)),
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(el.tag());
            for (k, v) in el.attrs() {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape(v));
                out.push('"');
            }
            let children = doc.children(id);
            if children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for &c in children {
                    serialize_node(doc, c, out);
                }
                out.push_str("</");
                out.push_str(el.tag());
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_closing_element() {
        let doc = VerseDocument::parse("before<br/>after").unwrap();
        assert_eq!(doc.children(doc.root()).len(), 3);
        assert_eq!(doc.inner_markup(doc.root()), "before<br/>after");
    }

    #[test]
    fn test_attribute_escaping_round_trip() {
        let markup_text = "<w strong=\"H7225\" note=\"a &quot;b&quot;\">text</w>";
        let doc = VerseDocument::parse(markup_text).unwrap();
        let w = doc.children(doc.root())[0];
        let el = doc.element(w).unwrap();
        assert_eq!(el.attr("strong"), Some("H7225"));
        assert_eq!(el.attr("note"), Some("a \"b\""));
        assert_eq!(doc.inner_markup(doc.root()), markup_text);
    }

    #[test]
    fn test_comments_are_dropped() {
        let doc = VerseDocument::parse("a<!-- note -->b").unwrap();
        assert_eq!(doc.text_content(doc.root()), "ab");
        assert_eq!(doc.children(doc.root()).len(), 2);
    }

    #[test]
    fn test_nbsp_entity_becomes_char() {
        let doc = VerseDocument::parse("one&nbsp;two").unwrap();
        assert_eq!(doc.text_content(doc.root()), "one\u{a0}two");
    }

    #[test]
    fn test_predefined_entities_unescape() {
        let doc = VerseDocument::parse("day &amp; night &lt;now&gt;").unwrap();
        assert_eq!(doc.text_content(doc.root()), "day & night <now>");
        assert_eq!(doc.inner_markup(doc.root()), "day &amp; night &lt;now&gt;");
    }

    #[test]
    fn test_whitespace_between_elements_is_kept() {
        let doc =
            VerseDocument::parse("<span class=\"seg\">a</span>\n<span class=\"seg\">b</span>")
                .unwrap();
        assert_eq!(doc.children(doc.root()).len(), 3);
        assert_eq!(doc.text_content(doc.root()), "a\nb");
    }
}
