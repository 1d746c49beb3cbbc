use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::Attrs;

/// Inline style annotation on a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMark", into = "RawMark")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    /// Font family / size / colour, kept as the raw attribute map.
    TextStyle(Attrs),
    Other { kind: String, attrs: Attrs },
}

impl Mark {
    pub fn text_style(
        font_family: Option<&str>,
        font_size: Option<&str>,
        color: Option<&str>,
    ) -> Self {
        let mut attrs = Attrs::new();
        for (key, value) in [
            ("fontFamily", font_family),
            ("fontSize", font_size),
            ("color", color),
        ] {
            if let Some(value) = value {
                attrs.insert(key.to_string(), Value::from(value));
            }
        }
        Mark::TextStyle(attrs)
    }

    pub fn type_name(&self) -> &str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::TextStyle(_) => "textStyle",
            Mark::Other { kind, .. } => kind,
        }
    }

    /// Position in the canonical application order: marks with a lower rank
    /// wrap the text first, so higher ranks end up outermost.
    pub fn render_rank(&self) -> u8 {
        match self {
            Mark::Underline | Mark::TextStyle(_) | Mark::Other { .. } => 0,
            Mark::Italic => 1,
            Mark::Bold => 2,
        }
    }

    pub fn style_attr(&self, key: &str) -> Option<&str> {
        match self {
            Mark::TextStyle(attrs) => attrs.get(key).and_then(Value::as_str),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawMark {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attrs: Option<Attrs>,
}

impl From<RawMark> for Mark {
    fn from(raw: RawMark) -> Self {
        match raw.kind.as_str() {
            "bold" => Mark::Bold,
            "italic" => Mark::Italic,
            "underline" => Mark::Underline,
            "textStyle" => Mark::TextStyle(raw.attrs.unwrap_or_default()),
            _ => Mark::Other {
                kind: raw.kind,
                attrs: raw.attrs.unwrap_or_default(),
            },
        }
    }
}

impl From<Mark> for RawMark {
    fn from(mark: Mark) -> Self {
        let kind = mark.type_name().to_string();
        let attrs = match mark {
            Mark::TextStyle(attrs) | Mark::Other { attrs, .. } => {
                (!attrs.is_empty()).then_some(attrs)
            }
            _ => None,
        };
        RawMark { kind, attrs }
    }
}
