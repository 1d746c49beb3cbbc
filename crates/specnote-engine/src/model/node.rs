use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mark::Mark;

/// Free-form, type-specific node options (e.g. heading `level`).
pub type Attrs = Map<String, Value>;

/// One element of the structured document tree.
///
/// The split between [`Element`] and [`TextRun`] is what enforces the tree's
/// shape rules: only text leaves carry a string payload and marks, only
/// elements carry children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum Node {
    Element(Element),
    Text(TextRun),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: NodeKind,
    pub attrs: Attrs,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub text: String,
    pub marks: Vec<Mark>,
}

/// Element types understood by the editor.
///
/// `Other` holds types written by a newer (or foreign) producer. They are kept
/// so the document survives a load/save cycle, and exporters fall back to the
/// plain text of their descendants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Doc,
    Heading,
    Paragraph,
    BulletList,
    OrderedList,
    ListItem,
    Other(String),
}

impl NodeKind {
    pub fn from_type(name: &str) -> Self {
        match name {
            "doc" => NodeKind::Doc,
            "heading" => NodeKind::Heading,
            "paragraph" => NodeKind::Paragraph,
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList,
            "listItem" => NodeKind::ListItem,
            other => NodeKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Heading => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::BulletList => "bulletList",
            NodeKind::OrderedList => "orderedList",
            NodeKind::ListItem => "listItem",
            NodeKind::Other(name) => name,
        }
    }
}

impl Element {
    pub fn new(kind: NodeKind, content: Vec<Node>) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            content,
        }
    }

    /// Heading level in 1..=3. Missing or unusable values read as 1.
    pub fn heading_level(&self) -> usize {
        let level = self
            .attrs
            .get("level")
            .and_then(Value::as_u64)
            .unwrap_or(1);
        level.clamp(1, 3) as usize
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.content {
            child.collect_text(&mut out);
        }
        out
    }
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }
}

impl From<TextRun> for Node {
    fn from(run: TextRun) -> Self {
        Node::Text(run)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn doc(content: Vec<Node>) -> Self {
        Element::new(NodeKind::Doc, content).into()
    }

    /// The content of a brand-new document: one empty paragraph.
    pub fn empty_doc() -> Self {
        Self::doc(vec![Self::paragraph(Vec::new())])
    }

    pub fn heading(level: u8, content: Vec<Node>) -> Self {
        let mut element = Element::new(NodeKind::Heading, content);
        element
            .attrs
            .insert("level".to_string(), Value::from(level));
        element.into()
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Element::new(NodeKind::Paragraph, content).into()
    }

    pub fn bullet_list(items: Vec<Node>) -> Self {
        Element::new(NodeKind::BulletList, items).into()
    }

    pub fn ordered_list(items: Vec<Node>) -> Self {
        Element::new(NodeKind::OrderedList, items).into()
    }

    pub fn list_item(content: Vec<Node>) -> Self {
        Element::new(NodeKind::ListItem, content).into()
    }

    pub fn text(text: impl Into<String>) -> Self {
        TextRun::new(text).into()
    }

    pub fn marked_text(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        TextRun {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
        .into()
    }

    pub fn type_name(&self) -> &str {
        match self {
            Node::Element(element) => element.kind.as_str(),
            Node::Text(_) => "text",
        }
    }

    pub fn kind(&self) -> Option<&NodeKind> {
        match self {
            Node::Element(element) => Some(&element.kind),
            Node::Text(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn is_kind(&self, kind: &NodeKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Child nodes; always empty for text leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.content,
            Node::Text(_) => &[],
        }
    }

    /// Concatenated text of every leaf in this subtree, ignoring marks.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(run) => out.push_str(&run.text),
            Node::Element(element) => {
                for child in &element.content {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first, pre-order traversal starting at (and including) this node.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }
}

/// Iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Wire shape of a node: `{"type", "attrs", "marks", "content", "text"}`.
///
/// Fields that do not belong to the node's type are dropped on the way in, so
/// a leaf that arrives with `content` or a paragraph that arrives with `text`
/// still yields a well-formed tree.
#[derive(Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attrs: Option<Attrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marks: Option<Vec<Mark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        if raw.kind == "text" {
            return Node::Text(TextRun {
                text: raw.text.unwrap_or_default(),
                marks: raw.marks.unwrap_or_default(),
            });
        }
        Node::Element(Element {
            kind: NodeKind::from_type(&raw.kind),
            attrs: raw.attrs.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Text(run) => RawNode {
                kind: "text".to_string(),
                attrs: None,
                marks: (!run.marks.is_empty()).then_some(run.marks),
                content: None,
                text: Some(run.text),
            },
            Node::Element(element) => RawNode {
                kind: element.kind.as_str().to_string(),
                attrs: (!element.attrs.is_empty()).then_some(element.attrs),
                marks: None,
                content: (!element.content.is_empty()).then_some(element.content),
                text: None,
            },
        }
    }
}
