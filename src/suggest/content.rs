//! What gets sent to the model for a given file.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use scraper::Html;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::SuggestError;

/// Characters of text content included in a prompt.
pub const TEXT_HEAD_CHARS: usize = 3000;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "csv", "md", "py", "json", "js", "html", "css", "xml", "yml", "yaml", "jsonl", "tsv",
    "log", "mdx", "ts", "tsx", "jsx",
];
const DOCUMENT_EXTENSIONS: &[&str] = &["xlsx", "docx", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Text,
    Document,
}

/// Lowercased extension including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Check that a file can be sent for a suggestion and classify it.
pub fn validate_file(path: &Path) -> Result<FileKind, SuggestError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let kind = if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Image
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Text
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Document
    } else {
        return Err(SuggestError::Unsupported(dotted_extension(path)));
    };

    if !path.is_file() {
        return Err(SuggestError::NotFound(path.to_path_buf()));
    }
    Ok(kind)
}

/// First [`TEXT_HEAD_CHARS`] characters of a text file, decoded lossily.
/// HTML is reduced to its visible text first. `None` when nothing readable
/// remains.
pub fn read_text_head(path: &Path) -> Result<Option<String>, SuggestError> {
    let io_err = |source| SuggestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let is_html = dotted_extension(path) == ".html";

    // HTML needs the whole document; plain text only the worst-case UTF-8 prefix.
    let bytes = if is_html {
        fs::read(path).map_err(io_err)?
    } else {
        let mut bytes = Vec::new();
        fs::File::open(path)
            .map_err(io_err)?
            .take((TEXT_HEAD_CHARS * 4) as u64)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
        bytes
    };

    let decoded = String::from_utf8_lossy(&bytes);
    let text = if is_html {
        html_visible_text(&decoded)
    } else {
        decoded.into_owned()
    };

    let head: String = text.chars().take(TEXT_HEAD_CHARS).collect();
    if head.trim().is_empty() {
        debug!(path = %path.display(), "No readable text content");
        return Ok(None);
    }
    Ok(Some(head))
}

/// Visible text of an HTML document with whitespace collapsed.
pub fn html_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// Body of the user message: a plain string, or typed parts when an image
/// travels along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// The file's bytes as a `data:` URL.
pub fn image_data_url(path: &Path) -> Result<String, SuggestError> {
    let bytes = fs::read(path).map_err(|source| SuggestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mime = match dotted_extension(path).as_str() {
        ".png" => "image/png",
        _ => "image/jpeg",
    };
    debug!(path = %path.display(), bytes = bytes.len(), "Encoding image");
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Build the user message for `path`.
pub fn user_prompt(path: &Path, kind: FileKind) -> Result<UserContent, SuggestError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let prompt = match kind {
        FileKind::Text => match read_text_head(path)? {
            Some(content) => format!("File content:\n{content}\n\nSuggest a filename."),
            None => format!(
                "Original filename: '{file_name}'. Content is empty or unreadable. Suggest a clean filename."
            ),
        },
        FileKind::Image => {
            return Ok(UserContent::Parts(vec![
                ContentPart::Text {
                    text: "What is in this image? Rename it.".to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_data_url(path)?,
                    },
                },
            ]));
        }
        FileKind::Document => format!(
            "Original filename: '{file_name}'. This is a document. Suggest a clean, descriptive filename."
        ),
    };
    Ok(UserContent::Text(prompt))
}
