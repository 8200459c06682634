//! OEA test data toolkit.
//!
//! Generates synthetic education data for the OEA data domains and moves
//! landed data through the stages, pseudonymizing it on the way.
//!
//! # Workspace Crates
//!
//! - `oea_core` - Semantic types, values, datasets and entity schemas
//! - `testdata_generator` - Seeded generators for the Intune, Azure AD,
//!   student demographics, Ed-Fi and MS Insights domains
//! - `testdata_populate` - Writes generator output to disk
//! - `csv_types` / `json_types` - Record and dataset serializers
//! - `oea_storage` - Storage URIs, stage conventions and the local filesystem
//! - `oea` - Pseudonymization, table engine, catalog and stage processing
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate MS Insights test data for two schools
//! oea-testdata generate ms-insights --output-dir ./test_data --schools 2
//!
//! # Land it in stage1np and process one source folder into stage 2
//! oea-testdata land --source-folder ms_insights --input ./test_data
//! oea-testdata --salt s3cret process --source-folder contoso_sis --schema schemas.yaml
//!
//! # Inspect the stages
//! oea-testdata stage describe stage2p
//! ```

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{FileConfig, GlobalOpts, Settings};
pub use logging::LoggingContext;
