//! Response rendering
//!
//! Results are rendered from a [`Node`] tree so that XML and JSON share one
//! nesting: XML writes each node as an element with its fields as
//! attributes (or text children), JSON writes the same node as an object
//! whose child list is keyed by the child element name. CRUD payloads go
//! through [`render_envelope`], which wraps any serializable value in the
//! `{status, data}` envelope.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::types::Representation;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML rendering failed: {0}")]
    Xml(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub xml: &'static str,
    pub json: &'static str,
    pub value: String,
    /// Written as a text child element instead of an attribute
    pub element: bool,
}

/// One level of a rendered result tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: &'static str,
    pub fields: Vec<Field>,
    pub children: Vec<Node>,
    /// Grouping identity, never rendered
    identity: String,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, fields: Vec::new(), children: Vec::new(), identity: String::new() }
    }

    pub fn identified(tag: &'static str, identity: impl Into<String>) -> Self {
        Self { identity: identity.into(), ..Self::new(tag) }
    }

    pub fn attr(self, name: &'static str, value: impl Into<String>) -> Self {
        self.attr_as(name, name, value)
    }

    /// Attribute whose XML and JSON names differ
    pub fn attr_as(mut self, xml: &'static str, json: &'static str, value: impl Into<String>) -> Self {
        self.fields.push(Field { xml, json, value: value.into(), element: false });
        self
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push(Field { xml: name, json: name, value: value.into(), element: true });
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Child with `identity`, created by `make` on first use
    pub fn child(&mut self, identity: &str, make: impl FnOnce() -> Node) -> &mut Node {
        upsert(&mut self.children, identity, make)
    }
}

/// Entry of `nodes` with `identity`, appended by `make` on first use so
/// first-appearance order is kept
pub fn upsert<'a>(nodes: &'a mut Vec<Node>, identity: &str, make: impl FnOnce() -> Node) -> &'a mut Node {
    let index = match nodes.iter().position(|node| node.identity == identity) {
        Some(index) => index,
        None => {
            let mut node = make();
            node.identity = identity.to_string();
            nodes.push(node);
            nodes.len() - 1
        }
    };
    &mut nodes[index]
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for field in &self.fields {
            map.serialize_entry(field.json, &field.value)?;
        }
        if let Some(first) = self.children.first() {
            map.serialize_entry(first.tag, &self.children)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct StatusMessage<'a> {
    pub message: &'a str,
    pub code: &'a str,
}

impl StatusMessage<'static> {
    pub const SUCCESS: StatusMessage<'static> = StatusMessage { message: "Success", code: "200" };
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    status: &'a StatusMessage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
}

fn xml_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Xml(e.to_string())
}

fn xml_writer() -> Writer<Vec<u8>> {
    Writer::new_with_indent(Vec::new(), b' ', 1)
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), RenderError> {
    let mut start = BytesStart::new(node.tag);
    for field in node.fields.iter().filter(|f| !f.element) {
        start.push_attribute((field.xml, field.value.as_str()));
    }

    let has_body = !node.children.is_empty() || node.fields.iter().any(|f| f.element);
    if !has_body {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for field in node.fields.iter().filter(|f| f.element) {
        write_text_element(writer, field.xml, &field.value)?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag))).map_err(xml_error)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), RenderError> {
    writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)
}

/// Arrays repeat the element once per item, objects nest, null is empty
fn write_value<W: Write>(writer: &mut Writer<W>, name: &str, value: &Value) -> Result<(), RenderError> {
    match value {
        Value::Null => writer.write_event(Event::Empty(BytesStart::new(name))).map_err(xml_error),
        Value::Array(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_error)?;
            for (key, item) in map {
                write_value(writer, key, item)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)
        }
        Value::String(s) => write_text_element(writer, name, s),
        other => write_text_element(writer, name, &other.to_string()),
    }
}

/// Render a result tree: `<root>` with the nodes in XML, the success
/// envelope with the nodes as `data` in JSON
pub fn render_tree(nodes: &[Node], representation: Representation) -> Result<Vec<u8>, RenderError> {
    match representation {
        Representation::Json => {
            let envelope = Envelope { status: &StatusMessage::SUCCESS, data: Some(&nodes) };
            Ok(serde_json::to_vec(&envelope)?)
        }
        Representation::Xml => {
            let mut writer = xml_writer();
            if nodes.is_empty() {
                writer.write_event(Event::Empty(BytesStart::new("root"))).map_err(xml_error)?;
            } else {
                writer.write_event(Event::Start(BytesStart::new("root"))).map_err(xml_error)?;
                for node in nodes {
                    write_node(&mut writer, node)?;
                }
                writer.write_event(Event::End(BytesEnd::new("root"))).map_err(xml_error)?;
            }
            Ok(writer.into_inner())
        }
    }
}

/// Render `{status, data}` with any serializable payload
pub fn render_envelope<T: Serialize>(
    status: &StatusMessage<'_>,
    data: Option<&T>,
    representation: Representation,
) -> Result<Vec<u8>, RenderError> {
    match representation {
        Representation::Json => Ok(serde_json::to_vec(&Envelope { status, data })?),
        Representation::Xml => {
            let mut writer = xml_writer();
            writer.write_event(Event::Start(BytesStart::new("root"))).map_err(xml_error)?;
            write_value(&mut writer, "status", &serde_json::to_value(status)?)?;
            if let Some(data) = data {
                write_value(&mut writer, "data", &serde_json::to_value(data)?)?;
            }
            writer.write_event(Event::End(BytesEnd::new("root"))).map_err(xml_error)?;
            Ok(writer.into_inner())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Vec<Node> {
        let mut profile = Node::new("Profile").attr("name", "ch.cern.sam.ROC_CRITICAL");
        profile.push(
            Node::new("Ngi")
                .attr("name", "NGI_GRNET")
                .text("note", "a < b"),
        );
        vec![profile]
    }

    #[test]
    fn json_nests_children_under_their_tag() {
        let body = render_tree(&tree(), Representation::Json).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "status": {"message": "Success", "code": "200"},
                "data": [{"name": "ch.cern.sam.ROC_CRITICAL", "Ngi": [{"name": "NGI_GRNET", "note": "a < b"}]}]
            })
        );
    }

    #[test]
    fn xml_uses_attributes_and_escapes_text() {
        let body = String::from_utf8(render_tree(&tree(), Representation::Xml).unwrap()).unwrap();
        assert!(body.starts_with("<root>"));
        assert!(body.contains(r#"<Profile name="ch.cern.sam.ROC_CRITICAL">"#));
        assert!(body.contains("<note>a &lt; b</note>"));
        assert!(body.trim_end().ends_with("</root>"));
    }

    #[test]
    fn empty_rows_render_empty_containers() {
        let json = render_tree(&[], Representation::Json).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"status":{"message":"Success","code":"200"},"data":[]}"#
        );
        let xml = render_tree(&[], Representation::Xml).unwrap();
        assert_eq!(String::from_utf8(xml).unwrap(), "<root/>");
    }

    #[test]
    fn envelope_without_data_omits_the_key() {
        let status = StatusMessage { message: "Report was successfully updated", code: "200" };
        let body = render_envelope::<()>(&status, None, Representation::Json).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"status":{"message":"Report was successfully updated","code":"200"}}"#
        );
    }

    #[test]
    fn envelope_xml_repeats_array_items() {
        let data = json!([{"id": "a"}, {"id": "b"}]);
        let body = render_envelope(&StatusMessage::SUCCESS, Some(&data), Representation::Xml).unwrap();
        let body = String::from_utf8(body).unwrap();
        assert_eq!(body.matches("<data>").count(), 2);
        assert!(body.contains("<message>Success</message>"));
    }

    #[test]
    fn upsert_keeps_first_appearance_order() {
        let mut nodes = Vec::new();
        upsert(&mut nodes, "b", || Node::new("Site").attr("site", "b"));
        upsert(&mut nodes, "a", || Node::new("Site").attr("site", "a"));
        upsert(&mut nodes, "b", || unreachable!());
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].fields[0].value, "b");
    }
}
