use crate::model::{Element, Mark, Node, NodeKind, TextRun};

use super::{heading_line, indent, join_blocks, paragraph_line};

/// Render a content tree as Markdown.
pub fn to_markdown(root: &Node) -> String {
    join_blocks(root, |node| render(node, 0, None))
}

/// `index` is the 1-based position of a list item inside an ordered list.
fn render(node: &Node, depth: usize, index: Option<usize>) -> String {
    let element = match node {
        Node::Text(run) => return apply_marks(run),
        Node::Element(element) => element,
    };

    match &element.kind {
        NodeKind::Heading => heading_line(element),
        NodeKind::Paragraph => paragraph_line(inline(element)),
        NodeKind::BulletList => element
            .content
            .iter()
            .map(|item| render(item, depth, None))
            .collect(),
        NodeKind::OrderedList => element
            .content
            .iter()
            .enumerate()
            .map(|(i, item)| render(item, depth, Some(i + 1)))
            .collect(),
        NodeKind::ListItem => list_item(element, depth, index),
        NodeKind::Doc | NodeKind::Other(_) => element.text_content(),
    }
}

fn list_item(element: &Element, depth: usize, index: Option<usize>) -> String {
    let bullet = match index {
        Some(n) => format!("{n}."),
        None => "-".to_string(),
    };
    let body = element
        .content
        .iter()
        .map(|child| match child {
            Node::Element(inner) if inner.kind == NodeKind::Paragraph => inline(inner),
            _ => render(child, depth + 1, None),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{bullet} {body}\n", indent(depth))
}

/// Inline content of a paragraph with marks applied.
fn inline(element: &Element) -> String {
    element
        .content
        .iter()
        .map(|child| render(child, 0, None))
        .collect()
}

/// Wrap a text run in Markdown emphasis.
///
/// Marks are applied in canonical order whatever order they were stored in:
/// italic innermost, bold outermost. Underline and text styling are dropped.
fn apply_marks(run: &TextRun) -> String {
    if run.text.is_empty() || run.marks.is_empty() {
        return run.text.clone();
    }

    let mut marks: Vec<&Mark> = run.marks.iter().collect();
    marks.sort_by_key(|mark| mark.render_rank());
    marks.dedup_by(|a, b| a.type_name() == b.type_name());

    marks.into_iter().fold(run.text.clone(), |text, mark| match mark {
        Mark::Italic => format!("*{text}*"),
        Mark::Bold => format!("**{text}**"),
        Mark::Underline | Mark::TextStyle(_) | Mark::Other { .. } => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn para(content: Vec<Node>) -> Node {
        Node::doc(vec![Node::paragraph(content)])
    }

    #[test]
    fn test_bold_paragraph() {
        let root = para(vec![Node::marked_text("Hi", [Mark::Bold])]);
        assert_eq!(to_markdown(&root), "**Hi**");
    }

    #[rstest]
    #[case(vec![Mark::Bold, Mark::Italic])]
    #[case(vec![Mark::Italic, Mark::Bold])]
    #[case(vec![Mark::Underline, Mark::Italic, Mark::Bold])]
    #[case(vec![Mark::Bold, Mark::text_style(Some("Georgia"), None, None), Mark::Italic])]
    fn test_bold_wraps_italic_in_any_order(#[case] marks: Vec<Mark>) {
        let root = para(vec![Node::marked_text("x", marks)]);
        assert_eq!(to_markdown(&root), "***x***");
    }

    #[rstest]
    #[case(Mark::Underline)]
    #[case(Mark::text_style(Some("Georgia"), Some("20px"), Some("red")))]
    fn test_lossy_marks_are_dropped(#[case] mark: Mark) {
        let root = para(vec![Node::marked_text("plain", [mark])]);
        assert_eq!(to_markdown(&root), "plain");
    }

    #[test]
    fn test_duplicate_marks_wrap_once() {
        let root = para(vec![Node::marked_text("x", [Mark::Bold, Mark::Bold])]);
        assert_eq!(to_markdown(&root), "**x**");
    }

    #[test]
    fn test_mixed_runs_in_paragraph() {
        let root = para(vec![
            Node::text("a "),
            Node::marked_text("b", [Mark::Italic]),
            Node::text(" c"),
        ]);
        assert_eq!(to_markdown(&root), "a *b* c");
    }

    #[rstest]
    #[case(1, "# T")]
    #[case(2, "## T")]
    #[case(3, "### T")]
    #[case(5, "### T")]
    fn test_heading_prefix(#[case] level: u8, #[case] expected: &str) {
        let root = Node::doc(vec![Node::heading(level, vec![Node::text("T")])]);
        assert_eq!(to_markdown(&root), expected);
    }

    #[test]
    fn test_heading_ignores_marks() {
        let root = Node::doc(vec![Node::heading(
            1,
            vec![Node::text("Big "), Node::marked_text("Deal", [Mark::Bold])],
        )]);
        assert_eq!(to_markdown(&root), "# Big Deal");
    }

    #[test]
    fn test_heading_then_bullets() {
        let root = Node::doc(vec![
            Node::heading(2, vec![Node::text("T")]),
            Node::bullet_list(vec![
                Node::list_item(vec![Node::paragraph(vec![Node::text("a")])]),
                Node::list_item(vec![Node::paragraph(vec![Node::text("b")])]),
            ]),
        ]);
        insta::assert_snapshot!(to_markdown(&root), @r"
        ## T

        - a
        - b
        ");
    }

    #[test]
    fn test_ordered_list_numbers_items() {
        let root = Node::doc(vec![Node::ordered_list(vec![
            Node::list_item(vec![Node::paragraph(vec![Node::text("one")])]),
            Node::list_item(vec![Node::paragraph(vec![Node::marked_text(
                "two",
                [Mark::Bold],
            )])]),
        ])]);
        assert_eq!(to_markdown(&root), "1. one\n2. **two**");
    }

    #[test]
    fn test_nested_lists_indent_by_depth() {
        let root = Node::doc(vec![Node::bullet_list(vec![Node::list_item(vec![
            Node::paragraph(vec![Node::text("outer")]),
            Node::ordered_list(vec![Node::list_item(vec![
                Node::paragraph(vec![Node::text("inner")]),
                Node::bullet_list(vec![Node::list_item(vec![Node::paragraph(vec![
                    Node::text("deepest"),
                ])])]),
            ])]),
        ])])]);

        assert_eq!(
            to_markdown(&root),
            "- outer\n  1. inner\n    - deepest"
        );
    }

    #[test]
    fn test_empty_paragraph_keeps_spacing() {
        let root = Node::doc(vec![
            Node::paragraph(vec![Node::text("a")]),
            Node::paragraph(vec![]),
            Node::paragraph(vec![Node::text("b")]),
        ]);
        assert_eq!(to_markdown(&root), "a\n\n\n\nb");
    }

    #[test]
    fn test_unknown_node_degrades_to_text() {
        let root: Node = serde_json::from_value(serde_json::json!({
            "type": "doc",
            "content": [
                {"type": "callout", "content": [
                    {"type": "paragraph", "content": [
                        {"type": "text", "text": "careful", "marks": [{"type": "bold"}]}
                    ]}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(to_markdown(&root), "careful");
    }

    #[test]
    fn test_unknown_inline_node_degrades_to_text() {
        let root: Node = serde_json::from_value(serde_json::json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [
                {"type": "text", "text": "see "},
                {"type": "mention", "content": [{"type": "text", "text": "@tim"}]}
            ]}]
        }))
        .unwrap();
        assert_eq!(to_markdown(&root), "see @tim");
    }

    #[test]
    fn test_output_is_stable() {
        let root = para(vec![Node::marked_text("x", [Mark::Italic, Mark::Bold])]);
        assert_eq!(to_markdown(&root), to_markdown(&root.clone()));
    }
}
