//! Template asset loading with embedded fallbacks.
//!
//! Bundled invoice templates are compiled into the binary. When a template
//! directory is configured, files on disk take precedence and the embedded
//! set acts as a fallback, so a deployment can override individual templates
//! without shipping the full set.

use rust_embed::RustEmbed;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Embedded default invoice templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.svg"]
struct EmbeddedTemplates;

/// Loader for template sources, embedded or external
#[derive(Debug, Clone, Default)]
pub struct TemplateAssets {
    /// External templates directory; `None` means embedded only
    dir: Option<PathBuf>,
}

impl TemplateAssets {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Read raw template source by id (`{id}.svg`).
    ///
    /// Filesystem overrides win over embedded templates; absence is a normal
    /// outcome, not an error.
    pub fn read(&self, id: &str) -> Option<String> {
        let file_name = format!("{id}.svg");

        if let Some(dir) = &self.dir {
            let path = dir.join(&file_name);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    tracing::debug!(template = id, "Loaded template from filesystem");
                    return Some(content);
                }
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                    tracing::warn!(template = id, error = %e, "Failed to read template file");
                }
                Err(_) => {}
            }
        }

        EmbeddedTemplates::get(&file_name)
            .and_then(|f| String::from_utf8(f.data.into_owned()).ok())
    }

    /// List available template ids, merging filesystem and embedded sets.
    pub fn list(&self) -> Vec<String> {
        let mut ids: BTreeSet<String> = EmbeddedTemplates::iter()
            .filter_map(|name| name.strip_suffix(".svg").map(str::to_string))
            .collect();

        if let Some(dir) = &self.dir {
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    if let Some(name) = entry.file_name().to_str() {
                        if let Some(id) = name.strip_suffix(".svg") {
                            ids.insert(id.to_string());
                        }
                    }
                }
            }
        }

        ids.into_iter().collect()
    }
}
