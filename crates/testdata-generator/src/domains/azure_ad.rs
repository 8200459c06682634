//! Directory device records (`AzureAD/devicesInfo.csv`).

use crate::faker::Faker;
use crate::generator::{Domain, DomainGenerator, GenerateOptions, GeneratorError, OutputBatch};
use crate::generators::ChoiceSet;
use oea_core::Record;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_USER_COUNT: usize = 100;

const MODELS: &[&str] = &[
    "null",
    "Surface Go",
    "TravelMate B311-31",
    "OEMST Product Name DV",
    "HP Stream 11 Pro G5",
    "Virtual Machine",
    "VivoBook_ASUS Laptop E410MA_L410MA",
    "HP Stream Laptop 11-ak0xxx",
    "Surface Pro 6",
];

const OPERATING_SYSTEMS: &[&str] = &[
    "Windows",
    "macOS",
    "AndroidForWork",
    "iOS/iPadOS",
    "Windows Mobile",
    "IPhone",
];

#[derive(Debug, Deserialize)]
struct GraphPage {
    value: Vec<GraphUser>,
}

#[derive(Debug, Deserialize)]
struct GraphUser {
    id: String,
}

/// Read directory user ids from a Graph-style export: a JSON array of pages,
/// each `{"value": [{"id": ...}, ...]}`.
pub fn load_user_ids(path: &Path) -> Result<Vec<String>, GeneratorError> {
    let content = fs::read_to_string(path).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pages: Vec<GraphPage> =
        serde_json::from_str(&content).map_err(|source| GeneratorError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let ids: Vec<String> = pages
        .into_iter()
        .flat_map(|page| page.value.into_iter().map(|user| user.id))
        .collect();
    info!("Loaded {} user ids from {}", ids.len(), path.display());
    Ok(ids)
}

/// Generates one device record per directory user.
pub struct AzureAdGenerator {
    faker: Faker,
    user_ids: Option<Vec<String>>,
    count: usize,
    models: ChoiceSet<&'static str>,
    operating_systems: ChoiceSet<&'static str>,
}

impl AzureAdGenerator {
    pub fn new(options: &GenerateOptions) -> Result<Self, GeneratorError> {
        Ok(Self {
            faker: options.faker(),
            user_ids: options.user_ids.clone(),
            count: options.count.unwrap_or(DEFAULT_USER_COUNT),
            models: ChoiceSet::new(MODELS.to_vec())?,
            operating_systems: ChoiceSet::new(OPERATING_SYSTEMS.to_vec())?,
        })
    }

    fn resolve_user_ids(&mut self) -> Vec<String> {
        match self.user_ids.take() {
            Some(ids) => ids,
            None => {
                debug!("No user export given, synthesizing {} user ids", self.count);
                (0..self.count)
                    .map(|_| self.faker.uuid4().to_string())
                    .collect()
            }
        }
    }
}

impl DomainGenerator for AzureAdGenerator {
    fn domain(&self) -> Domain {
        Domain::AzureAd
    }

    fn generate(&mut self) -> Result<Vec<OutputBatch>, GeneratorError> {
        let user_ids = self.resolve_user_ids();
        let devices: Vec<Record> = user_ids
            .into_iter()
            .map(|id| {
                Record::new()
                    .with("id", id)
                    .with("deviceId", self.faker.uuid4_simple())
                    .with("model", *self.faker.pick(&self.models))
                    .with("operatingSystem", *self.faker.pick(&self.operating_systems))
            })
            .collect();
        Ok(vec![OutputBatch::csv("AzureAD/devicesInfo.csv", devices)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_user_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Users.json");
        fs::write(
            &path,
            r#"[{"value":[{"id":"u1","displayName":"A"},{"id":"u2"}]},{"value":[{"id":"u3"}]}]"#,
        )
        .unwrap();
        assert_eq!(load_user_ids(&path).unwrap(), vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_load_user_ids_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_user_ids(&missing),
            Err(GeneratorError::Io { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(load_user_ids(&bad), Err(GeneratorError::Json { .. })));
    }

    #[test]
    fn test_one_row_per_user() {
        let options = GenerateOptions::default()
            .with_user_ids(vec!["a".to_string(), "b".to_string()]);
        let batches = AzureAdGenerator::new(&options).unwrap().generate().unwrap();
        let text = batches[0].render().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,deviceId,model,operatingSystem");
        assert!(lines[1].starts_with("a,"));
        assert!(lines[2].starts_with("b,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_no_users_is_empty_input() {
        let options = GenerateOptions::default().with_user_ids(Vec::new());
        let batches = AzureAdGenerator::new(&options).unwrap().generate().unwrap();
        assert!(matches!(
            batches[0].render(),
            Err(GeneratorError::EmptyInput(_))
        ));
    }
}
