//! Rules-file source, re-read on every poll.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::rules::model::RuleSet;
use crate::rules::source::{ListError, RuleSource};

/// Reads a TOML file of `[[rules]]` tables.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Load a rule set from a TOML file.
pub fn load_rules(path: &Path) -> Result<RuleSet, ListError> {
    let content = fs::read_to_string(path).map_err(|source| read_error(path, source))?;
    parse_rules(path, &content)
}

fn parse_rules(path: &Path, content: &str) -> Result<RuleSet, ListError> {
    toml::from_str(content).map_err(|source| ListError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_error(path: &Path, source: std::io::Error) -> ListError {
    ListError::Read {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl RuleSource for FileRuleSource {
    async fn list(&self) -> Result<RuleSet, ListError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| read_error(&self.path, source))?;
        parse_rules(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_rules_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[rules]]
namespace = "default"
host = "foo"
paths = [{{ path = "/", service = "foo", port = 3000 }}]
"#
        )
        .unwrap();

        let source = FileRuleSource::new(file.path());
        let set = source.list().await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.rules[0].host, "foo");
    }

    #[tokio::test]
    async fn test_missing_file_is_list_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileRuleSource::new(dir.path().join("absent.toml"));
        assert!(matches!(source.list().await, Err(ListError::Read { .. })));
    }

    #[tokio::test]
    async fn test_malformed_file_is_list_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[rules]\nnamespace =").unwrap();

        let source = FileRuleSource::new(file.path());
        assert!(matches!(source.list().await, Err(ListError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_edits_are_seen_on_next_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "rules = []\n").unwrap();

        let source = FileRuleSource::new(&path);
        assert!(source.list().await.unwrap().is_empty());

        std::fs::write(
            &path,
            "[[rules]]\nnamespace = \"default\"\nhost = \"bar\"\npaths = []\n",
        )
        .unwrap();
        let set = source.list().await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.rules[0].host, "bar");
        assert_eq!(set, load_rules(&path).unwrap());
    }
}
