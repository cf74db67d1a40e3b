//! Recently selected games
//!
//! Persisted to SessionStorage, so the list lives as long as the tab.
//! Most recent first, no duplicates.

use serde::{Deserialize, Serialize};

/// Maximum number of titles to keep
pub const MAX_HISTORY: usize = 50;

/// Selection history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionHistory {
    titles: Vec<String>,
}

impl SelectionHistory {
    /// SessionStorage key (used only in wasm32)
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "gameHistory";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection at the front, moving it there if already present
    pub fn push(&mut self, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        self.titles.retain(|t| t != title);
        self.titles.insert(0, title.to_string());
        self.titles.truncate(MAX_HISTORY);
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn latest(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn clear(&mut self) {
        self.titles.clear();
    }

    /// Load history from SessionStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(history) = serde_json::from_str::<SelectionHistory>(&json) {
                    log::info!("Loaded {} recent selections", history.len());
                    return history;
                }
            }
        }

        Self::new()
    }

    /// Save history to SessionStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_recent_first() {
        let mut history = SelectionHistory::new();
        history.push("Tetris");
        history.push("Zelda");
        assert_eq!(history.titles(), ["Zelda", "Tetris"]);
        assert_eq!(history.latest(), Some("Zelda"));
    }

    #[test]
    fn test_duplicate_moves_to_front() {
        let mut history = SelectionHistory::new();
        for title in ["Tetris", "Zelda", "Mario", "Tetris"] {
            history.push(title);
        }
        assert_eq!(history.titles(), ["Tetris", "Mario", "Zelda"]);
    }

    #[test]
    fn test_capped() {
        let mut history = SelectionHistory::new();
        for i in 0..(MAX_HISTORY + 10) {
            history.push(&format!("Game {}", i));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.latest(), Some("Game 59"));
        assert!(!history.titles().contains(&"Game 9".to_string()));
    }

    #[test]
    fn test_blank_ignored() {
        let mut history = SelectionHistory::new();
        history.push("   ");
        assert!(history.is_empty());
    }

    #[test]
    fn test_storage_format_is_plain_array() {
        let mut history = SelectionHistory::new();
        history.push("Mario");
        history.push("Zelda");
        assert_eq!(serde_json::to_string(&history).unwrap(), r#"["Zelda","Mario"]"#);
        let parsed: SelectionHistory = serde_json::from_str(r#"["A","B"]"#).unwrap();
        assert_eq!(parsed.titles(), ["A", "B"]);
    }
}
