use crate::model::{Element, Node, NodeKind};

use super::{heading_line, indent, join_blocks, paragraph_line};

/// Render a content tree as plain text.
///
/// Headings keep their `#` prefix and list items keep their bullets; no mark
/// syntax is ever emitted.
pub fn to_plain_text(root: &Node) -> String {
    join_blocks(root, |node| render(node, 0))
}

fn render(node: &Node, depth: usize) -> String {
    let element = match node {
        Node::Text(run) => return run.text.clone(),
        Node::Element(element) => element,
    };

    match &element.kind {
        NodeKind::Heading => heading_line(element),
        NodeKind::Paragraph => paragraph_line(element.text_content()),
        NodeKind::BulletList => bulleted(element, depth),
        NodeKind::OrderedList => element
            .content
            .iter()
            .enumerate()
            .map(|(i, item)| numbered_item(item, depth, i + 1))
            .collect(),
        NodeKind::ListItem => list_item(element, depth, "-"),
        NodeKind::Doc | NodeKind::Other(_) => element.text_content(),
    }
}

/// Every item of `list` with a `-` bullet, whatever the list type.
fn bulleted(list: &Element, depth: usize) -> String {
    list.content
        .iter()
        .map(|item| match item {
            Node::Element(inner) if inner.kind == NodeKind::ListItem => {
                list_item(inner, depth, "-")
            }
            _ => render(item, depth),
        })
        .collect()
}

fn list_item(element: &Element, depth: usize, bullet: &str) -> String {
    let body = element
        .content
        .iter()
        .map(|child| match child {
            Node::Element(inner) if inner.kind == NodeKind::Paragraph => inner.text_content(),
            _ => render(child, depth + 1),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{bullet} {body}\n", indent(depth))
}

/// An item of an ordered list. The number is written here; lists nested in
/// the item fall back to `-` bullets rather than continuing the numbering.
fn numbered_item(item: &Node, depth: usize, number: usize) -> String {
    let element = match item {
        Node::Element(element) if element.kind == NodeKind::ListItem => element,
        _ => return render(item, depth),
    };

    let body = element
        .content
        .iter()
        .map(|child| match child {
            Node::Element(inner) => match inner.kind {
                NodeKind::Paragraph => inner.text_content(),
                NodeKind::BulletList | NodeKind::OrderedList => bulleted(inner, depth + 1),
                _ => render(child, depth + 1),
            },
            Node::Text(run) => run.text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{number}. {body}\n", indent(depth))
}
