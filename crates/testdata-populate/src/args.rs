//! CLI argument definitions shared by the `generate` command.

use crate::error::PopulatorError;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use testdata_generator::domains::load_user_ids;
use testdata_generator::GenerateOptions;

/// Arguments for writing one domain's test data.
#[derive(Args, Clone, Debug)]
pub struct PopulateArgs {
    /// Output directory; batches are appended beneath it
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,

    /// Random seed for deterministic generation (same seed = same data)
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Primary record count: devices, students, or students per school
    #[arg(long)]
    pub count: Option<usize>,

    /// Number of schools for the school-shaped domains
    #[arg(long)]
    pub schools: Option<usize>,

    /// Graph-style JSON export of directory users (azure-ad only)
    #[arg(long)]
    pub users_file: Option<PathBuf>,

    /// Date that "now"-relative ranges resolve against (YYYY-MM-DD)
    #[arg(long)]
    pub reference_date: Option<NaiveDate>,

    /// Remove the output directory before writing, instead of appending
    #[arg(long)]
    pub clean: bool,
}

impl PopulateArgs {
    /// Generator options for these arguments, loading the users file if
    /// one was given.
    pub fn to_options(&self) -> Result<GenerateOptions, PopulatorError> {
        let mut options = GenerateOptions::default().with_seed(self.seed);
        if let Some(count) = self.count {
            options = options.with_count(count);
        }
        if let Some(schools) = self.schools {
            options = options.with_schools(schools);
        }
        if let Some(date) = self.reference_date {
            let reference = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
                PopulatorError::Arguments(format!("invalid reference date {date}"))
            })?;
            options = options.with_reference(reference);
        }
        if let Some(path) = &self.users_file {
            options = options.with_user_ids(load_user_ids(path)?);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: PopulateArgs,
    }

    #[test]
    fn test_defaults_and_overrides() {
        let cli = Cli::parse_from(["t", "--output-dir", "out"]);
        let options = cli.args.to_options().unwrap();
        assert_eq!(options.seed, 1);
        assert_eq!(options.count, None);
        assert!(!cli.args.clean);

        let cli = Cli::parse_from([
            "t",
            "-o",
            "out",
            "--seed",
            "7",
            "--count",
            "3",
            "--reference-date",
            "2022-01-31",
        ]);
        let options = cli.args.to_options().unwrap();
        assert_eq!(options.seed, 7);
        assert_eq!(options.count, Some(3));
        assert_eq!(options.reference.to_string(), "2022-01-31 00:00:00");
    }

    #[test]
    fn test_missing_users_file() {
        let cli = Cli::parse_from(["t", "-o", "out", "--users-file", "/nonexistent/users.json"]);
        assert!(matches!(
            cli.args.to_options(),
            Err(PopulatorError::Generator(_))
        ));
    }
}
