//! Minimal element tree over `xml-rs` events.
//!
//! The registry is small enough to hold in memory, and walking a tree reads
//! much closer to the registry's structure than a streaming state machine.

use std::io::Read;

use xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements with the given tag, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this element and its descendants, trimmed.
    pub fn text(&self) -> String {
        fn collect(element: &Element, out: &mut String) {
            for node in &element.children {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Element(e) => collect(e, out),
                }
            }
        }
        let mut out = String::new();
        collect(self, &mut out);
        out.trim().to_string()
    }
}

/// Reads a whole document and returns its root element.
pub(crate) fn parse_document<R: Read>(reader: R) -> Result<Element> {
    let config = ParserConfig::new()
        .trim_whitespace(true)
        .ignore_comments(true)
        .cdata_to_characters(true);
    let events = EventReader::new_with_config(reader, config);

    let mut stack: Vec<Element> = vec![Element::default()];
    for event in events {
        match event? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                stack.push(Element {
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|attr| (attr.name.local_name, attr.value))
                        .collect(),
                    children: Vec::new(),
                });
            }
            // The reader rejects unbalanced documents, so a parent is always present.
            XmlEvent::EndElement { .. } if stack.len() > 1 => {
                let done = stack.pop();
                if let (Some(done), Some(parent)) = (done, stack.last_mut()) {
                    parent.children.push(Node::Element(done));
                }
            }
            XmlEvent::Characters(text) => {
                if let Some(current) = stack.last_mut() {
                    current.children.push(Node::Text(text));
                }
            }
            _ => {}
        }
    }

    let document = stack.pop().unwrap_or_default();
    Ok(document
        .children
        .into_iter()
        .find_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_builds_tree() {
        let xml = r#"<registry><command><proto><type>VkResult</type> <name>vkQueueWaitIdle</name></proto><param><type>VkQueue</type> <name>queue</name></param></command></registry>"#;
        let root = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(root.name, "registry");
        let command = root.child("command").unwrap();
        assert_eq!(command.child("proto").unwrap().child("name").unwrap().text(), "vkQueueWaitIdle");
        assert_eq!(command.children_named("param").count(), 1);
    }

    #[test]
    fn test_text_joins_descendants() {
        let xml = r#"<param>const <type>VkInstanceCreateInfo</type>* <name>pCreateInfo</name></param>"#;
        let root = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(root.child("type").unwrap().text(), "VkInstanceCreateInfo");
        assert!(root.text().contains("VkInstanceCreateInfo"));
    }

    #[test]
    fn test_attributes_and_comments() {
        let xml = r#"<!-- header --><platforms><platform name="xcb" protect="VK_USE_PLATFORM_XCB_KHR"/></platforms>"#;
        let root = parse_document(xml.as_bytes()).unwrap();
        let platform = root.child("platform").unwrap();
        assert_eq!(platform.attr("protect"), Some("VK_USE_PLATFORM_XCB_KHR"));
        assert_eq!(platform.attr("comment"), None);
    }

    #[test]
    fn test_closed_elements_attach_to_their_parent() {
        let xml = r#"<registry><commands><command/><command/></commands><feature/></registry>"#;
        let root = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(root.child("commands").unwrap().children_named("command").count(), 2);
        assert!(root.child("feature").is_some());
        assert!(root.child("command").is_none());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_document("<registry><commands></registry>".as_bytes()).is_err());
    }
}
