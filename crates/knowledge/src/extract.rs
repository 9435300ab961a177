//! Source file reading and text extraction.
//!
//! Handles plain text, Markdown and HTML. PDFs and other binary formats are
//! rejected; their text has to be extracted before ingestion.

use crate::types::Document;
use docbrain_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up when walking a directory without an explicit filter.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "html", "htm"];

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    PlainText,
    Pdf,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("txt") | Some("text") => Self::PlainText,
            Some("pdf") => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::PlainText => "text",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        }
    }
}

/// Turns a file into a [`Document`] ready for ingestion.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> AppResult<Document>;
}

/// Extractor for UTF-8 text files on the local filesystem.
///
/// The document's source name is the file name, which is what answers cite.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExtractor;

impl TextExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> AppResult<Document> {
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::InvalidInput(format!("Not a file: {}", path.display())))?;

        let text = extract_text(path)?;
        Ok(Document::new(text, source_name))
    }
}

/// Read `path` and return its cleaned text.
pub fn extract_text(path: &Path) -> AppResult<String> {
    let content_type = ContentType::from_path(path);

    if content_type == ContentType::Pdf {
        return Err(AppError::InvalidInput(format!(
            "{}: PDF text extraction is not built in, convert it to text first",
            path.display()
        )));
    }

    let bytes = fs::read(path)?;
    let raw = String::from_utf8(bytes).map_err(|_| {
        AppError::InvalidInput(format!("{}: not valid UTF-8 text", path.display()))
    })?;

    if !is_likely_text(&raw) {
        tracing::warn!("Skipping likely binary file: {:?}", path);
        return Err(AppError::InvalidInput(format!(
            "{}: binary files are not supported",
            path.display()
        )));
    }

    let cleaned = match content_type {
        ContentType::Markdown => clean_markdown(&raw),
        ContentType::Html => clean_html(&raw),
        ContentType::PlainText | ContentType::Unknown | ContentType::Pdf => raw,
    };

    tracing::debug!(
        path = %path.display(),
        content_type = content_type.as_str(),
        chars = cleaned.chars().count(),
        "Extracted text"
    );

    Ok(cleaned)
}

/// Expand `paths` into the files to ingest, sorted and deduplicated.
///
/// Files named directly are always kept. Directories are walked and filtered
/// by extension (`include`, or [`DEFAULT_EXTENSIONS`] when empty).
pub fn collect_files(paths: &[PathBuf], include: &[String]) -> AppResult<Vec<PathBuf>> {
    let wanted: Vec<String> = if include.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        include
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    };

    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && has_extension(entry_path, &wanted) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else {
            return Err(AppError::InvalidInput(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn has_extension(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| wanted.iter().any(|w| w.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Clean markdown by removing heading markers, rules and fences.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        // Blank lines survive so paragraph breaks can guide chunking
        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Clean HTML by stripping tags, scripts and styles.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut in_script = false;
    let mut in_style = false;

    for (i, ch) in text.char_indices() {
        if ch == '<' {
            in_tag = true;

            let rest = &text[i..];
            if starts_with_tag(rest, "<script") {
                in_script = true;
            } else if starts_with_tag(rest, "</script") {
                in_script = false;
            } else if starts_with_tag(rest, "<style") {
                in_style = true;
            } else if starts_with_tag(rest, "</style") {
                in_style = false;
            }
        } else if ch == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag && !in_script && !in_style {
            result.push(ch);
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_with_tag(rest: &str, tag: &str) -> bool {
    rest.get(..tag.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(tag))
}

/// Check if text is likely text (not binary).
fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(ContentType::from_path(Path::new("notes.md")), ContentType::Markdown);
        assert_eq!(ContentType::from_path(Path::new("page.HTM")), ContentType::Html);
        assert_eq!(ContentType::from_path(Path::new("file.txt")), ContentType::PlainText);
        assert_eq!(ContentType::from_path(Path::new("contract.pdf")), ContentType::Pdf);
        assert_eq!(ContentType::from_path(Path::new("Makefile")), ContentType::Unknown);
    }

    #[test]
    fn test_clean_markdown() {
        let input = "# Header\n\nSome text\n\n```rust\ncode\n```\n\nMore text";
        let output = clean_markdown(input);
        assert!(output.contains("Header"));
        assert!(output.contains("Some text\n\n"));
        assert!(output.contains("More text"));
        assert!(!output.contains("```"));
    }

    #[test]
    fn test_clean_html() {
        let input = "<html><head><style>p { color: red; }</style></head><body><p>Hello <b>world</b></p><script>alert(1)</script></body></html>";
        assert_eq!(clean_html(input), "Hello world");
    }

    #[test]
    fn test_clean_html_multibyte() {
        assert_eq!(clean_html("<p>Olá, você</p><p>é bem-vindo</p>"), "Olá, você é bem-vindo");
    }

    #[test]
    fn test_clean_html_case_folding_shifts_offsets() {
        // Both characters lowercase to sequences of different byte widths
        assert_eq!(clean_html("\u{130}<p>\u{130}\u{212A}"), "\u{130} \u{130}\u{212A}");
        assert_eq!(
            clean_html("\u{212A}<SCRIPT>alert(1)</Script><P>Kelvin</P>"),
            "\u{212A} Kelvin"
        );
    }

    #[test]
    fn test_extract_uses_file_name_as_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("contract.txt");
        fs::write(&path, "The salary is $100,000 per year.").unwrap();

        let doc = FileExtractor.extract(&path).unwrap();
        assert_eq!(doc.source_name, "contract.txt");
        assert_eq!(doc.raw_text, "The salary is $100,000 per year.");
    }

    #[test]
    fn test_rejects_pdf_and_binary() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("contract.pdf");
        fs::write(&pdf, b"%PDF-1.7").unwrap();
        assert!(matches!(extract_text(&pdf), Err(AppError::InvalidInput(_))));

        let blob = temp.path().join("blob.bin");
        fs::write(&blob, [0xff, 0xfe, 0x00, 0x01]).unwrap();
        assert!(matches!(extract_text(&blob), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_collect_files() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("docs/nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("docs/b.md"), "b").unwrap();
        fs::write(nested.join("a.txt"), "a").unwrap();
        fs::write(nested.join("image.png"), [0u8; 4]).unwrap();
        let direct = temp.path().join("direct.log");
        fs::write(&direct, "log").unwrap();

        let files = collect_files(&[temp.path().join("docs"), direct.clone()], &[]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.txt".to_string()));
        assert!(names.contains(&"b.md".to_string()));
        assert!(names.contains(&"direct.log".to_string()));

        let only_md = collect_files(&[temp.path().join("docs")], &[".md".to_string()]).unwrap();
        assert_eq!(only_md.len(), 1);

        assert!(collect_files(&[temp.path().join("missing")], &[]).is_err());
    }
}
