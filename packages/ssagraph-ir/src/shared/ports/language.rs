//! Language abstraction

use serde::{Deserialize, Serialize};

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    TypeScript,
    JavaScript,
    C,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::TypeScript,
        Language::JavaScript,
        Language::C,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::C => "c",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Java => &["java"],
            Language::TypeScript => &["ts", "tsx"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::C => &["c", "h"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "java" => Some(Language::Java),
            "ts" | "tsx" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "c" | "h" => Some(Language::C),
            _ => None,
        }
    }

    pub fn from_file_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit(['/', '\\']).next()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "java" => Some(Language::Java),
            "typescript" | "ts" => Some(Language::TypeScript),
            "javascript" | "js" => Some(Language::JavaScript),
            "c" => Some(Language::C),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("MJS"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("xyz"), None);
    }

    #[test]
    fn test_from_file_path() {
        assert_eq!(
            Language::from_file_path("src/main/java/a/Main.java"),
            Some(Language::Java)
        );
        assert_eq!(Language::from_file_path("lib/util.h"), Some(Language::C));
        assert_eq!(Language::from_file_path("Makefile"), None);
        assert_eq!(Language::from_file_path("dir.d/Makefile"), None);
    }
}
