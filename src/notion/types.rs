//! Wire types for the Notion REST API.
//!
//! Only the parts of the API this crate reads are modelled. Blocks are
//! decoded in two steps: the envelope first, then the payload stored under
//! the key named by the block's `type`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /v1/databases/{id}/query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub filter: Value,
    pub sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One page of a paginated list response.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// A database row.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// A typed page property.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichText>,
    },
    RichText {
        rich_text: Vec<RichText>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Checkbox {
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    Files {
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// A hosted (`file`) or linked (`external`) file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

impl FileObject {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|f| f.url.as_str())
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

/// A styled run of text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

impl RichText {
    /// Unstyled text, handy for tests and simple fields.
    #[must_use]
    pub fn plain(text: &str) -> Self {
        Self {
            plain_text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Concatenate spans without any styling.
#[must_use]
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|s| s.plain_text.as_str()).collect()
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

/// Block envelope as returned by `GET /v1/blocks/{id}/children`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// A decoded block with its (already fetched) children.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub content: BlockContent,
    pub children: Vec<Block>,
}

impl Block {
    /// Leaf block without children, used when building trees by hand.
    #[must_use]
    pub fn new(content: BlockContent) -> Self {
        Self {
            id: String::new(),
            has_children: false,
            content,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }
}

/// Every block type the markdown renderer understands.
#[derive(Debug, Clone)]
pub enum BlockContent {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Toggle(TextBlock),
    Quote(TextBlock),
    Callout(CalloutBlock),
    Code(CodeBlock),
    Image(ImageBlock),
    Divider,
    Table(TableBlock),
    TableRow(TableRowBlock),
    Unsupported(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Icon {
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub caption: Vec<RichText>,
    #[serde(flatten)]
    pub source: FileObject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub table_width: usize,
    #[serde(default)]
    pub has_column_header: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

impl TryFrom<RawBlock> for Block {
    type Error = serde_json::Error;

    fn try_from(mut raw: RawBlock) -> Result<Self, Self::Error> {
        let payload = raw.payload.remove(&raw.kind).unwrap_or(Value::Null);
        let content = match raw.kind.as_str() {
            "paragraph" => BlockContent::Paragraph(decode(payload)?),
            "heading_1" => BlockContent::Heading1(decode(payload)?),
            "heading_2" => BlockContent::Heading2(decode(payload)?),
            "heading_3" => BlockContent::Heading3(decode(payload)?),
            "bulleted_list_item" => BlockContent::BulletedListItem(decode(payload)?),
            "numbered_list_item" => BlockContent::NumberedListItem(decode(payload)?),
            "to_do" => BlockContent::ToDo(decode(payload)?),
            "toggle" => BlockContent::Toggle(decode(payload)?),
            "quote" => BlockContent::Quote(decode(payload)?),
            "callout" => BlockContent::Callout(decode(payload)?),
            "code" => BlockContent::Code(decode(payload)?),
            "image" => BlockContent::Image(decode(payload)?),
            "divider" => BlockContent::Divider,
            "table" => BlockContent::Table(decode(payload)?),
            "table_row" => BlockContent::TableRow(decode(payload)?),
            other => BlockContent::Unsupported(other.to_string()),
        };

        Ok(Self {
            id: raw.id,
            has_children: raw.has_children,
            content,
            children: Vec::new(),
        })
    }
}

fn decode<T: for<'de> Deserialize<'de> + Default>(payload: Value) -> Result<T, serde_json::Error> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload)
}
