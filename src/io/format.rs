use std::{fmt, path::Path};

/// Supported data formats for documents fed to the editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
}

impl DocumentFormat {
    /// Formats compiled into this build, JSON first.
    pub fn available_formats() -> Vec<DocumentFormat> {
        vec![
            DocumentFormat::Json,
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml,
            #[cfg(feature = "toml")]
            DocumentFormat::Toml,
        ]
    }

    pub fn from_extension(path: &Path) -> ExtensionFormat {
        let Some(ext) = path.extension() else {
            return ExtensionFormat::Unknown;
        };
        match ext.to_string_lossy().to_ascii_lowercase().as_str() {
            "json" => ExtensionFormat::Known(DocumentFormat::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => ExtensionFormat::Known(DocumentFormat::Yaml),
            #[cfg(not(feature = "yaml"))]
            "yaml" | "yml" => ExtensionFormat::UnsupportedFeature {
                format_name: "yaml",
                feature_flag: "yaml",
            },
            #[cfg(feature = "toml")]
            "toml" => ExtensionFormat::Known(DocumentFormat::Toml),
            #[cfg(not(feature = "toml"))]
            "toml" => ExtensionFormat::UnsupportedFeature {
                format_name: "toml",
                feature_flag: "toml",
            },
            _ => ExtensionFormat::Unknown,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "json"),
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => write!(f, "yaml"),
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => write!(f, "toml"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionFormat {
    Known(DocumentFormat),
    UnsupportedFeature {
        format_name: &'static str,
        feature_flag: &'static str,
    },
    Unknown,
}
