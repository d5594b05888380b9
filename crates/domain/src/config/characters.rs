use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the character catalog comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharactersConfig {
    /// TOML file with a `[[characters]]` array. When `None`, the built-in
    /// personas are used.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
