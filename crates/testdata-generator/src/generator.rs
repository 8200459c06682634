//! Domain generator abstraction and its output.

use chrono::NaiveDateTime;
use oea_core::Record;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Invalid choice list, weights or counts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A batch that needs a header was rendered with no records
    #[error("Cannot render '{0}': no records to infer a header from")]
    EmptyInput(String),

    /// Unknown generator domain name
    #[error("Unknown domain '{0}' (expected one of: {domains})", domains = Domain::names().join(", "))]
    UnknownDomain(String),

    /// Error reading an input file
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a JSON input file
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializer failure other than empty input
    #[error("Failed to render output: {0}")]
    Render(String),
}

impl From<json_types::JsonWriteError> for GeneratorError {
    fn from(err: json_types::JsonWriteError) -> Self {
        Self::Render(err.to_string())
    }
}

/// Serialized shape of one output batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Records rendered as CSV, optionally without the header row
    Csv {
        records: Vec<Record>,
        include_header: bool,
    },
    /// Records rendered as JSON, array-wrapped or newline-delimited
    Json { records: Vec<Record>, array: bool },
    /// Pre-rendered text written as-is
    Raw(String),
}

/// Records destined for one relative output path.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBatch {
    pub path: PathBuf,
    pub payload: Payload,
}

impl OutputBatch {
    pub fn csv(path: impl AsRef<Path>, records: Vec<Record>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            payload: Payload::Csv {
                records,
                include_header: true,
            },
        }
    }

    pub fn csv_headerless(path: impl AsRef<Path>, records: Vec<Record>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            payload: Payload::Csv {
                records,
                include_header: false,
            },
        }
    }

    pub fn json_array(path: impl AsRef<Path>, records: Vec<Record>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            payload: Payload::Json {
                records,
                array: true,
            },
        }
    }

    pub fn raw(path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            payload: Payload::Raw(text.into()),
        }
    }

    /// Number of records (0 for raw text).
    pub fn record_count(&self) -> usize {
        match &self.payload {
            Payload::Csv { records, .. } | Payload::Json { records, .. } => records.len(),
            Payload::Raw(_) => 0,
        }
    }

    /// Render the batch to the text appended to its destination.
    pub fn render(&self) -> Result<String, GeneratorError> {
        match &self.payload {
            Payload::Csv {
                records,
                include_header,
            } => csv_types::records_to_csv(records, *include_header).map_err(|e| match e {
                csv_types::CsvWriteError::EmptyInput => {
                    GeneratorError::EmptyInput(self.path.display().to_string())
                }
                other => GeneratorError::Render(other.to_string()),
            }),
            Payload::Json { records, array } => {
                let text = if *array {
                    json_types::records_to_json_array(records)?
                } else {
                    json_types::records_to_ndjson(records)?
                };
                Ok(text)
            }
            Payload::Raw(text) => Ok(text.clone()),
        }
    }
}

/// A generator for one data domain.
///
/// Implementations own their seeded [`Faker`](crate::Faker) and return every
/// batch in a fixed order, so output is reproducible for a seed.
pub trait DomainGenerator {
    /// Domain this generator produces.
    fn domain(&self) -> Domain;

    /// Produce all output batches.
    fn generate(&mut self) -> Result<Vec<OutputBatch>, GeneratorError>;
}

/// Supported generator domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Intune,
    AzureAd,
    StudentDemographics,
    EdFi,
    MsInsights,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Intune,
        Domain::AzureAd,
        Domain::StudentDemographics,
        Domain::EdFi,
        Domain::MsInsights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intune => "intune",
            Self::AzureAd => "azure-ad",
            Self::StudentDemographics => "student-demographics",
            Self::EdFi => "edfi",
            Self::MsInsights => "ms-insights",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Domain::as_str).collect()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GeneratorError::UnknownDomain(s.to_string()))
    }
}

/// Options shared by every domain generator.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Seed for the generator's random stream
    pub seed: u64,
    /// Primary record count (devices, students, students per school)
    pub count: Option<usize>,
    /// Number of schools for the school-shaped domains
    pub schools: Option<usize>,
    /// Instant that "now"-relative ranges resolve against
    pub reference: NaiveDateTime,
    /// Directory user ids for the azure-ad domain
    pub user_ids: Option<Vec<String>>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            count: None,
            schools: None,
            reference: crate::faker::default_reference(),
            user_ids: None,
        }
    }
}

impl GenerateOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_schools(mut self, schools: usize) -> Self {
        self.schools = Some(schools);
        self
    }

    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_user_ids(mut self, user_ids: Vec<String>) -> Self {
        self.user_ids = Some(user_ids);
        self
    }

    pub(crate) fn faker(&self) -> crate::Faker {
        crate::Faker::new(self.seed).with_reference(self.reference)
    }
}

/// Build the generator for a domain.
pub fn build_generator(
    domain: Domain,
    options: &GenerateOptions,
) -> Result<Box<dyn DomainGenerator>, GeneratorError> {
    use crate::domains::*;

    let generator: Box<dyn DomainGenerator> = match domain {
        Domain::Intune => Box::new(IntuneGenerator::new(options)?),
        Domain::AzureAd => Box::new(AzureAdGenerator::new(options)?),
        Domain::StudentDemographics => Box::new(StudentDemographicsGenerator::new(options)?),
        Domain::EdFi => Box::new(EdFiGenerator::new(options)?),
        Domain::MsInsights => Box::new(MsInsightsGenerator::new(options)?),
    };
    Ok(generator)
}
