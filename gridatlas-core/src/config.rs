use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::BuildOptions;
use crate::error::{AtlasError, Result};
use crate::scan::{Eligibility, Ordering, DEFAULT_EXCLUDE_SUFFIX, DEFAULT_EXTENSIONS};

pub const DEFAULT_INPUT_DIR: &str = "./";
pub const DEFAULT_OUTPUT: &str = "blocks_atlas.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub columns: Option<u32>,
    pub extensions: Vec<String>,
    pub exclude_suffix: String,
    /// Sort inputs by path instead of trusting the directory listing order.
    pub sort: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            columns: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_suffix: DEFAULT_EXCLUDE_SUFFIX.to_string(),
            sort: false,
        }
    }
}

impl AtlasConfig {
    pub fn build_options(&self) -> Result<BuildOptions> {
        let columns = match self.columns {
            None => None,
            Some(n) => Some(NonZeroU32::new(n).ok_or(AtlasError::ZeroColumns)?),
        };
        let exclude_suffixes = if self.exclude_suffix.is_empty() { Vec::new() } else { vec![self.exclude_suffix.clone()] };
        Ok(BuildOptions {
            columns,
            eligibility: Eligibility { extensions: self.extensions.clone(), exclude_suffixes, exclude_names: Vec::new() },
            ordering: if self.sort { Ordering::Lexicographic } else { Ordering::Listing },
        })
    }
}

pub fn load_from_yaml_str(s: &str) -> Result<AtlasConfig> {
    let cfg: AtlasConfig = serde_yaml::from_str(s)?;
    Ok(cfg)
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AtlasConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .map_err(|source| AtlasError::ConfigIo { path: path.to_path_buf(), source })?;
    load_from_yaml_str(&data)
}
