//! Populator that renders generator batches into files.

use crate::error::PopulatorError;
use oea_storage::FileWriter;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use testdata_generator::DomainGenerator;
use tracing::{debug, info};

/// Metrics from a populate operation.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Number of batches appended.
    pub batches_written: u64,
    /// Number of records across all batches.
    pub records_written: u64,
    /// Number of distinct files touched.
    pub files_written: u64,
    /// Bytes appended across all files.
    pub bytes_written: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating data.
    pub generation_duration: Duration,
    /// Time spent rendering and writing data.
    pub write_duration: Duration,
}

impl PopulateMetrics {
    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.records_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.bytes_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Writes one generator's output under a root directory.
pub struct Populator {
    generator: Box<dyn DomainGenerator>,
    output_dir: PathBuf,
    clean: bool,
}

impl Populator {
    pub fn new(generator: Box<dyn DomainGenerator>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            output_dir: output_dir.into(),
            clean: false,
        }
    }

    /// Remove the output directory before writing.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate every batch and append it to its file.
    ///
    /// Batches land in the order the generator returns them, so several
    /// batches for one path concatenate in that order.
    pub fn populate(&mut self) -> Result<PopulateMetrics, PopulatorError> {
        let start_time = Instant::now();
        let mut metrics = PopulateMetrics::default();
        let domain = self.generator.domain();

        if self.clean && self.output_dir.exists() {
            info!("Removing {} before writing", self.output_dir.display());
            std::fs::remove_dir_all(&self.output_dir)?;
        }

        info!(
            "Generating '{}' test data into '{}'",
            domain,
            self.output_dir.display()
        );

        let gen_start = Instant::now();
        let batches = self.generator.generate()?;
        metrics.generation_duration = gen_start.elapsed();

        let write_start = Instant::now();
        let mut writer = FileWriter::new(&self.output_dir);
        let mut files = BTreeSet::new();
        for batch in &batches {
            let text = batch.render()?;
            writer.write(&batch.path, &text)?;
            files.insert(batch.path.clone());

            metrics.batches_written += 1;
            metrics.records_written += batch.record_count() as u64;
            debug!(
                "Appended {} records to {}",
                batch.record_count(),
                batch.path.display()
            );
        }
        writer.finish()?;
        metrics.write_duration = write_start.elapsed();

        metrics.files_written = files.len() as u64;
        metrics.bytes_written = writer.bytes_written();
        metrics.total_duration = start_time.elapsed();

        info!(
            "'{}' generation complete: {} records, {} files, {} bytes in {:?} ({:.2} records/sec)",
            domain,
            metrics.records_written,
            metrics.files_written,
            metrics.bytes_written,
            metrics.total_duration,
            metrics.records_per_second()
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use testdata_generator::{build_generator, Domain, GenerateOptions};

    fn populator(domain: Domain, dir: &Path, options: &GenerateOptions) -> Populator {
        Populator::new(build_generator(domain, options).unwrap(), dir)
    }

    #[test]
    fn test_metrics() {
        let metrics = PopulateMetrics {
            records_written: 1000,
            bytes_written: 100000,
            total_duration: Duration::from_secs(10),
            ..Default::default()
        };

        assert_eq!(metrics.records_per_second(), 100.0);
        assert_eq!(metrics.bytes_per_second(), 10000.0);
        assert_eq!(PopulateMetrics::default().records_per_second(), 0.0);
    }

    #[test]
    fn test_populate_intune() {
        let temp_dir = TempDir::new().unwrap();
        let options = GenerateOptions::default().with_seed(3).with_count(10);
        let metrics = populator(Domain::Intune, temp_dir.path(), &options)
            .populate()
            .unwrap();

        assert_eq!(metrics.records_written, 10);
        assert_eq!(metrics.files_written, 1);

        let content = std::fs::read_to_string(temp_dir.path().join("Intune/device.csv")).unwrap();
        assert_eq!(content.lines().count(), 11);
        assert_eq!(metrics.bytes_written, content.len() as u64);
    }

    #[test]
    fn test_append_then_clean() {
        let temp_dir = TempDir::new().unwrap();
        let options = GenerateOptions::default().with_count(2);
        let path = temp_dir.path().join("Intune/device.csv");

        populator(Domain::Intune, temp_dir.path(), &options)
            .populate()
            .unwrap();
        populator(Domain::Intune, temp_dir.path(), &options)
            .populate()
            .unwrap();
        // appended: two headers plus four rows
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 6);

        populator(Domain::Intune, temp_dir.path(), &options)
            .with_clean(true)
            .populate()
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_deterministic_generation() {
        let temp_dir = TempDir::new().unwrap();
        let options = GenerateOptions::default()
            .with_seed(42)
            .with_count(4)
            .with_schools(1);

        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        populator(Domain::MsInsights, &first, &options).populate().unwrap();
        populator(Domain::MsInsights, &second, &options).populate().unwrap();

        let org = "M365/Org.csv";
        assert_eq!(
            std::fs::read_to_string(first.join(org)).unwrap(),
            std::fs::read_to_string(second.join(org)).unwrap()
        );
        let students = "contoso_sis/students.csv";
        assert_eq!(
            std::fs::read_to_string(first.join(students)).unwrap(),
            std::fs::read_to_string(second.join(students)).unwrap()
        );
    }
}
