//! `name:tag` model references.

use crate::config::ArchiveConfig;
use crate::error::{Result, TransferError};
use std::fmt;
use std::str::FromStr;

/// A model name plus its size/tag, as written on the command line
/// (`llama3:8b`) and as laid out in the manifest tree (`<name>/<tag>`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelRef {
    pub name: String,
    pub tag: String,
}

impl ModelRef {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Parse `name:tag`, splitting on the first `:`.
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once(':') {
            Some((name, tag)) => Ok(Self::new(name, tag)),
            None => Err(TransferError::usage(
                "Model specification must be in the form 'model_name:model_size'",
            )),
        }
    }

    /// File name of the archive this model exports to.
    pub fn archive_file_name(&self) -> String {
        format!(
            "{}{}_{}.{}",
            ArchiveConfig::EXPORT_NAME_PREFIX,
            self.name,
            self.tag,
            ArchiveConfig::EXPORT_EXTENSION
        )
    }
}

impl FromStr for ModelRef {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}
