//! Structured-data documents and the merge combinator.
//!
//! A `.meta` document is held as an ordered tree: element children keep
//! encounter order, attributes become `@name` scalar children, mixed text a
//! `#text` child, and repeated sibling names a list. Merging walks the
//! incoming tree into the staged one, accumulating values with deep-equality
//! dedup so two bundles can each contribute records under the same section
//! without clobbering or doubling each other.

use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Ordered mapping from node name to node value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTree {
    nodes: IndexMap<String, NodeValue>,
}

/// A node holds exactly one variant at a time; merging may promote
/// `Scalar`/`Tree` into a `List` but never drops a prior value.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Scalar(String),
    Tree(DocumentTree),
    List(Vec<NodeValue>),
}

impl DocumentTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.nodes.get(name)
    }

    pub fn insert(&mut self, name: String, value: NodeValue) {
        self.nodes.insert(name, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeValue)> {
        self.nodes.iter()
    }

    /// Adds a child under `name`, promoting to a list when the name repeats.
    /// Used by the parser for sibling elements sharing one tag.
    fn insert_child(&mut self, name: String, value: NodeValue) {
        match self.nodes.get_mut(&name) {
            None => {
                self.nodes.insert(name, value);
            }
            Some(NodeValue::List(items)) => items.push(value),
            Some(existing) => {
                let prev = std::mem::replace(existing, NodeValue::List(Vec::new()));
                if let NodeValue::List(items) = existing {
                    items.push(prev);
                    items.push(value);
                }
            }
        }
    }
}

/// Parses an XML document into a [`DocumentTree`].
pub fn parse_document(src: &str) -> anyhow::Result<DocumentTree> {
    let mut reader = Reader::from_str(src);
    reader.config_mut().trim_text(true);

    let mut root = DocumentTree::default();
    // open elements: (name, children-so-far, accumulated text)
    let mut stack: Vec<(String, DocumentTree, Option<String>)> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec())?;
                let tree = attributes_to_tree(&e)?;
                stack.push((name, tree, None));
            }
            Event::Empty(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec())?;
                let tree = attributes_to_tree(&e)?;
                let value = finish_element(tree, None);
                attach(&mut root, &mut stack, name, value);
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                append_text(&mut stack, text);
            }
            Event::CData(e) => {
                let text = String::from_utf8(e.into_inner().into_owned())?;
                append_text(&mut stack, text);
            }
            Event::End(_) => {
                if let Some((name, tree, text)) = stack.pop() {
                    let value = finish_element(tree, text);
                    attach(&mut root, &mut stack, name, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(root)
}

fn attributes_to_tree(start: &BytesStart<'_>) -> anyhow::Result<DocumentTree> {
    let mut tree = DocumentTree::default();
    for attr in start.attributes() {
        let attr = attr?;
        let key = format!("@{}", String::from_utf8(attr.key.as_ref().to_vec())?);
        let value = attr.unescape_value()?.into_owned();
        tree.insert_child(key, NodeValue::Scalar(value));
    }
    Ok(tree)
}

fn append_text(stack: &mut [(String, DocumentTree, Option<String>)], text: String) {
    if text.is_empty() {
        return;
    }
    if let Some((_, _, slot)) = stack.last_mut() {
        match slot {
            Some(existing) => existing.push_str(&text),
            None => *slot = Some(text),
        }
    }
}

/// An element with neither attributes nor children collapses to a bare
/// scalar of its text content (empty for `<a/>`).
fn finish_element(mut tree: DocumentTree, text: Option<String>) -> NodeValue {
    if tree.is_empty() {
        return NodeValue::Scalar(text.unwrap_or_default());
    }
    if let Some(text) = text {
        tree.insert_child("#text".to_string(), NodeValue::Scalar(text));
    }
    NodeValue::Tree(tree)
}

fn attach(
    root: &mut DocumentTree,
    stack: &mut [(String, DocumentTree, Option<String>)],
    name: String,
    value: NodeValue,
) {
    match stack.last_mut() {
        Some((_, parent, _)) => parent.insert_child(name, value),
        None => root.insert_child(name, value),
    }
}

/// Serializes a tree back to XML text. `lint` controls indentation only.
pub fn serialize_document(tree: &DocumentTree, lint: bool) -> anyhow::Result<String> {
    let mut writer = if lint {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };
    for (name, value) in tree.iter() {
        write_node(&mut writer, name, value)?;
    }
    let body = String::from_utf8(writer.into_inner())?;
    if lint {
        Ok(format!("{}\n{}", XML_DECL, body))
    } else {
        Ok(format!("{}{}", XML_DECL, body))
    }
}

fn write_node<W: Write>(writer: &mut Writer<W>, name: &str, value: &NodeValue) -> anyhow::Result<()> {
    match value {
        NodeValue::Scalar(text) => {
            if text.is_empty() {
                writer.write_event(Event::Empty(BytesStart::new(name)))?;
            } else {
                writer.write_event(Event::Start(BytesStart::new(name)))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
        }
        NodeValue::Tree(tree) => {
            let mut attrs: Vec<(&str, String)> = Vec::new();
            let mut text = None;
            let mut children: Vec<(&String, &NodeValue)> = Vec::new();
            for (child_name, child) in tree.iter() {
                if let Some(attr) = child_name.strip_prefix('@') {
                    attrs.push((attr, attribute_text(child)));
                } else if child_name == "#text" {
                    if let NodeValue::Scalar(t) = child {
                        text = Some(t.as_str());
                    }
                } else {
                    children.push((child_name, child));
                }
            }
            let mut start = BytesStart::new(name);
            for (key, value) in &attrs {
                start.push_attribute((*key, value.as_str()));
            }
            if children.is_empty() && text.is_none() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                if let Some(t) = text {
                    writer.write_event(Event::Text(BytesText::new(t)))?;
                }
                for (child_name, child) in children {
                    write_node(writer, child_name, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
        }
        NodeValue::List(items) => {
            for item in items {
                write_node(writer, name, item)?;
            }
        }
    }
    Ok(())
}

/// An attribute slot normally holds a scalar; a merge can have accumulated
/// several values under it, in which case they are space-joined since one
/// attribute name cannot repeat on an element.
fn attribute_text(value: &NodeValue) -> String {
    match value {
        NodeValue::Scalar(s) => s.clone(),
        NodeValue::List(items) => items
            .iter()
            .map(attribute_text)
            .collect::<Vec<_>>()
            .join(" "),
        NodeValue::Tree(_) => String::new(),
    }
}

/// Combines `incoming` into `base`, producing a new tree.
///
/// Rules, applied per incoming entry:
/// - names in `reserved` always accumulate into a list, deduplicated, never
///   collapsing back to a bare value;
/// - an incoming empty-string scalar is dropped;
/// - a name absent from `base` is copied over unchanged;
/// - tree-on-both-sides merges recursively;
/// - anything else accumulates with deep-equality dedup, base values first,
///   collapsing to the bare value when a single one survives.
///
/// Ordering is asymmetric: `merge(a, b)` keeps `a`'s values ahead of `b`'s
/// novel ones, so bundle order is observable in the output.
pub fn merge(base: &DocumentTree, incoming: &DocumentTree, reserved: &[String]) -> DocumentTree {
    let mut out = base.clone();
    for (name, value) in incoming.iter() {
        if reserved.iter().any(|r| r == name) {
            let mut items = flatten(out.get(name));
            accumulate(&mut items, value);
            if !items.is_empty() {
                out.insert(name.clone(), NodeValue::List(items));
            }
            continue;
        }
        if let NodeValue::Scalar(s) = value {
            if s.is_empty() {
                continue;
            }
        }
        let next = match (out.get(name), value) {
            (None, v) => Some(v.clone()),
            (Some(NodeValue::Tree(b)), NodeValue::Tree(inc)) => {
                Some(NodeValue::Tree(merge(b, inc, reserved)))
            }
            (Some(existing), v) => {
                let mut items = flatten(Some(existing));
                accumulate(&mut items, v);
                if items.len() == 1 {
                    items.pop()
                } else {
                    Some(NodeValue::List(items))
                }
            }
        };
        if let Some(v) = next {
            out.insert(name.clone(), v);
        }
    }
    out
}

/// Appends `value`'s elements to `items`, skipping empty scalars and values
/// already present by deep equality.
fn accumulate(items: &mut Vec<NodeValue>, value: &NodeValue) {
    for candidate in flatten(Some(value)) {
        if let NodeValue::Scalar(s) = &candidate {
            if s.is_empty() {
                continue;
            }
        }
        if !items.contains(&candidate) {
            items.push(candidate);
        }
    }
}

fn flatten(value: Option<&NodeValue>) -> Vec<NodeValue> {
    match value {
        None => Vec::new(),
        Some(NodeValue::List(items)) => items.clone(),
        Some(v) => vec![v.clone()],
    }
}
