//! Game catalog
//!
//! The catalog is a newline-delimited list of titles. Anything after a `#`
//! on a line is a comment; blank lines are dropped. The parsed order is kept
//! as loaded and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::PlinkoError;

/// Ordered, read-only list of game titles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    titles: Vec<String>,
}

impl Catalog {
    /// Parse the newline-delimited catalog resource
    pub fn parse(text: &str) -> Self {
        let titles = text
            .lines()
            .map(|line| match line.find('#') {
                Some(idx) => &line[..idx],
                None => line,
            })
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { titles }
    }

    /// Build from already-clean titles (blank entries are still dropped)
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.trim().is_empty())
                .collect(),
        }
    }

    /// Empty catalog: every zone shows the placeholder label
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Read a catalog file from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self, PlinkoError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PlinkoError::Catalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::parse(&text);
        log::info!("Loaded {} titles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Fall back to an empty catalog when loading failed
    pub fn or_empty(result: Result<Self, PlinkoError>) -> Self {
        match result {
            Ok(catalog) => catalog,
            Err(e) => {
                log::warn!("{} - zones will show placeholders", e);
                Self::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_comments_and_blanks() {
        let text = "Pac-Man\n  Tetris  # weekly favourite\n\n# whole-line comment\n   \nZelda#no space\r\nMario\n";
        let catalog = Catalog::parse(text);
        assert_eq!(catalog.titles(), ["Pac-Man", "Tetris", "Zelda", "Mario"]);
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(Catalog::parse("").is_empty());
        assert!(Catalog::parse("\n\n # nothing here\n").is_empty());
    }

    #[test]
    fn test_from_titles_drops_blanks() {
        let catalog = Catalog::from_titles(["Galaga", " ", "", "Joust"]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.titles()[1], "Joust");
    }

    #[test]
    fn test_or_empty_on_failure() {
        let failed = Err(PlinkoError::Catalog("404".to_string()));
        assert!(Catalog::or_empty(failed).is_empty());

        let ok = Ok(Catalog::from_titles(["Dig Dug"]));
        assert_eq!(Catalog::or_empty(ok).len(), 1);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Catalog::from_file(std::path::Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(PlinkoError::Catalog(_))));
    }
}
