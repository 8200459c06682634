//! Managed-device inventory (`Intune/device.csv`).

use crate::faker::Faker;
use crate::generator::{Domain, DomainGenerator, GenerateOptions, GeneratorError, OutputBatch};
use crate::generators::ChoiceSet;
use chrono::Duration;
use oea_core::Record;
use tracing::debug;

const DEFAULT_DEVICE_COUNT: usize = 100;

const DEVICE_CATALOG: &[(&str, &[&str])] = &[
    ("Dell", &["Vostro 15 3501", "Vostro 5410", "Latitude 15 5520"]),
    ("Lenovo", &["ThinkBook 14s Yoga", "Yoga Slim 7", "X1 Titanium Yoga"]),
    (
        "HP",
        &[
            "ENVY Laptop 14-eb0019TX",
            "Pavilion Laptop 14-ec0007AX",
            "Spectre x360 14-ea0542TU",
        ],
    ),
];

const OS_TYPES: &[&str] = &["Windows", "Android", "iOS/iPadOS", "macOS"];

struct DeviceMake {
    make: &'static str,
    models: ChoiceSet<&'static str>,
}

/// Generates one device record per requested device.
pub struct IntuneGenerator {
    faker: Faker,
    count: usize,
    makes: ChoiceSet<DeviceMake>,
    operating_systems: ChoiceSet<&'static str>,
}

impl IntuneGenerator {
    pub fn new(options: &GenerateOptions) -> Result<Self, GeneratorError> {
        let makes = DEVICE_CATALOG
            .iter()
            .map(|&(make, models)| {
                Ok(DeviceMake {
                    make,
                    models: ChoiceSet::new(models.to_vec())?,
                })
            })
            .collect::<Result<Vec<_>, GeneratorError>>()?;

        Ok(Self {
            faker: options.faker(),
            count: options.count.unwrap_or(DEFAULT_DEVICE_COUNT),
            makes: ChoiceSet::new(makes)?,
            operating_systems: ChoiceSet::new(OS_TYPES.to_vec())?,
        })
    }

    fn device(&mut self) -> Record {
        let device_id = self.faker.uuid4();
        let make = self.faker.pick(&self.makes);
        let model = format!("{} {}", make.make, self.faker.pick(&make.models));
        let last_contact = self
            .faker
            .date_time_between(Duration::days(-30), Duration::zero());
        let upn = self.faker.free_email();
        let os = *self.faker.pick(&self.operating_systems);

        Record::new()
            .with("DeviceId", device_id)
            .with("Model", model)
            .with("LastContact", last_contact)
            .with("UPN", upn)
            .with("OS", os)
    }
}

impl DomainGenerator for IntuneGenerator {
    fn domain(&self) -> Domain {
        Domain::Intune
    }

    fn generate(&mut self) -> Result<Vec<OutputBatch>, GeneratorError> {
        let devices: Vec<Record> = (0..self.count).map(|_| self.device()).collect();
        debug!("Generated {} device records", devices.len());
        Ok(vec![OutputBatch::csv("Intune/device.csv", devices)])
    }
}
