//! Output file naming.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Placeholder replaced by the scene number.
const PLACEHOLDER: char = '#';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("output template '{0}' must contain exactly one '#'")]
    Placeholder(String),
}

/// A file name pattern such as `output#.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    prefix: String,
    suffix: String,
}

impl OutputTemplate {
    /// File name for scene `index`.
    pub fn path_for(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}{}{}", self.prefix, index, self.suffix))
    }
}

impl FromStr for OutputTemplate {
    type Err = TemplateError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        match template.split_once(PLACEHOLDER) {
            Some((prefix, suffix)) if !suffix.contains(PLACEHOLDER) => Ok(Self {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            }),
            _ => Err(TemplateError::Placeholder(template.to_string())),
        }
    }
}
