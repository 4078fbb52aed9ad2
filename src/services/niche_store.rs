use std::{fs, path::PathBuf};

/// Niche list persisted as a JSON array at a well-known path.
pub struct NicheStore {
    path: PathBuf,
}

impl NicheStore {
    pub fn new(path: PathBuf) -> Self {
        NicheStore { path }
    }

    /// A missing file is a normal first run and yields an empty list; a file
    /// that is not a JSON list of strings is an error.
    pub fn load(&self) -> anyhow::Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let content = fs::read_to_string(&self.path)?;
        let niches: Vec<String> = serde_json::from_str(&content)?;
        Ok(normalize(niches))
    }

    /// Overwrites the stored list with the normalized entries and returns
    /// what was written.
    pub fn save(&self, niches: &[String]) -> anyhow::Result<Vec<String>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let niches = normalize(niches.to_vec());
        fs::write(&self.path, serde_json::to_string_pretty(&niches)?)?;
        Ok(niches)
    }
}

fn normalize(niches: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = vec![];
    for niche in niches {
        let trimmed = niche.trim().to_string();
        if !trimmed.is_empty() && !kept.contains(&trimmed) {
            kept.push(trimmed);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = NicheStore::new(dir.path().join("nichos.json"));

        assert_eq!(store.load().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn save_then_load_round_trips_normalized_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = NicheStore::new(dir.path().join("nested/nichos.json"));

        let saved = store
            .save(&[
                " auto peças ".to_string(),
                "padaria".to_string(),
                "auto peças".to_string(),
                "  ".to_string(),
            ])
            .unwrap();

        assert_eq!(saved, vec!["auto peças", "padaria"]);
        assert_eq!(store.load().unwrap(), saved);
    }

    #[test]
    fn content_that_is_not_a_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nichos.json");
        fs::write(&path, r#"{"nichos": ["padaria"]}"#).unwrap();

        let store = NicheStore::new(path);

        assert!(store.load().is_err());
    }
}
