//! Rendering options and configuration.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use super::JsonFormat;

/// Default value of the `Creator` metadata element.
pub const DEFAULT_CREATOR: &str = "yolo2page";

/// Output markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// PAGE-XML document
    #[default]
    PageXml,
    /// JSON dump of the emitted tree
    Json,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::PageXml => "xml",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" | "page" | "pagexml" | "page-xml" => Ok(OutputFormat::PageXml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Options for serializing a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Markup to produce
    pub format: OutputFormat,

    /// Value of the `Creator` metadata element
    pub creator: String,

    /// Creation timestamp; the current time when `None`
    pub created: Option<DateTime<Utc>>,

    /// Spaces per indentation level in XML output (0 = single line)
    pub indent: usize,

    /// JSON layout
    pub json_format: JsonFormat,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the creator name.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Use a fixed creation timestamp.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the XML indentation width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Timestamp to write, resolving `None` to now.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.created.unwrap_or_else(Utc::now)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::PageXml,
            creator: DEFAULT_CREATOR.to_string(),
            created: None,
            indent: 2,
            json_format: JsonFormat::Pretty,
        }
    }
}
