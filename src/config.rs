use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::index::BIN_SIZE;
use crate::model::LoadOptions;

fn default_bin_size() -> i64 {
    BIN_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationConfig {
    pub gtf: PathBuf,
    #[serde(default)]
    pub fasta: Option<PathBuf>,
    #[serde(default)]
    pub required_tags: Vec<String>,
    #[serde(default = "default_bin_size")]
    pub bin_size: i64,
}

impl AnnotationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;

        // Relative paths are relative to the config file
        if let Some(dir) = path.parent() {
            config.gtf = resolve(dir, &config.gtf);
            config.fasta = config.fasta.as_deref().map(|f| resolve(dir, f));
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.gtf.as_os_str().is_empty() {
            bail!("'gtf' must name a GTF file");
        }
        if self.bin_size <= 0 {
            bail!("invalid binSize {}: must be positive", self.bin_size);
        }
        if let Some(i) = self.required_tags.iter().position(|t| t.trim().is_empty()) {
            bail!("requiredTags[{i}] is empty");
        }
        Ok(())
    }

    /// The FASTA path, or an error naming the binary that needs it.
    pub fn require_fasta(&self, tool: &str) -> Result<&Path> {
        match &self.fasta {
            Some(path) => Ok(path),
            None => bail!("{tool} requires 'fasta' in the config file"),
        }
    }

    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            required_tags: self.required_tags.clone(),
            bin_size: self.bin_size,
        }
    }
}

fn resolve(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}
