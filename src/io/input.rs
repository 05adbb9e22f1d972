use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use super::{DocumentFormat, ExtensionFormat};

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Tries `preferred` first, then every other compiled-in format.
pub fn parse_with_fallback(contents: &str, preferred: DocumentFormat, label: &str) -> Result<Value> {
    let primary = match parse_document_str(contents, preferred) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    for candidate in DocumentFormat::available_formats() {
        if candidate == preferred {
            continue;
        }
        if let Ok(value) = parse_document_str(contents, candidate) {
            return Ok(value);
        }
    }
    let tried: Vec<String> = DocumentFormat::available_formats()
        .iter()
        .map(ToString::to_string)
        .collect();
    Err(anyhow!(
        "failed to parse {label}: tried {} (first error: {primary:#})",
        tried.join(", ")
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Stdin,
    File(PathBuf),
    Inline(String),
}

impl DocumentSource {
    /// `-` means stdin; an existing path is a file; anything else is inline
    /// text.
    pub fn from_spec(spec: &str) -> Self {
        if spec == "-" {
            return DocumentSource::Stdin;
        }
        let path = Path::new(spec);
        if path.is_file() {
            DocumentSource::File(path.to_path_buf())
        } else {
            DocumentSource::Inline(spec.to_string())
        }
    }
}

/// Loads a document named by a CLI-style spec.
pub fn load_document(spec: &str, label: &str) -> Result<Value> {
    match DocumentSource::from_spec(spec) {
        DocumentSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read from stdin")?;
            parse_with_fallback(&buffer, DocumentFormat::default(), label)
        }
        DocumentSource::File(path) => {
            let preferred = match DocumentFormat::from_extension(&path) {
                ExtensionFormat::Known(format) => format,
                ExtensionFormat::UnsupportedFeature {
                    format_name,
                    feature_flag,
                } => bail!(
                    "{label} '{}' requires {format_name} support, but this build lacks the '{feature_flag}' feature",
                    path.display()
                ),
                ExtensionFormat::Unknown => DocumentFormat::default(),
            };
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {label} from {}", path.display()))?;
            parse_with_fallback(&contents, preferred, label)
        }
        DocumentSource::Inline(text) => {
            parse_with_fallback(&text, DocumentFormat::default(), &format!("inline {label}"))
        }
    }
}
