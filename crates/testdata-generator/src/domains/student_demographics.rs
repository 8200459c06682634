//! Student demographics (`StudentDemographics/demographics.csv`).

use crate::faker::Faker;
use crate::generator::{Domain, DomainGenerator, GenerateOptions, GeneratorError, OutputBatch};
use crate::generators::WeightedChoice;
use oea_core::Record;

const DEFAULT_STUDENT_COUNT: usize = 100;

/// Weighted demographic distributions shared with the MS Insights SIS feed.
pub(crate) struct Demographics {
    pub race: WeightedChoice<&'static str>,
    pub language: WeightedChoice<&'static str>,
    pub ell_status: WeightedChoice<&'static str>,
    pub special_education: WeightedChoice<&'static str>,
    pub low_income: WeightedChoice<&'static str>,
}

impl Demographics {
    pub fn new() -> Result<Self, GeneratorError> {
        Ok(Self {
            race: WeightedChoice::new(
                vec!["Asian", "Black", "Indian", "White", "American Indian"],
                &[25, 15, 35, 5, 20],
            )?,
            language: WeightedChoice::new(
                vec!["English", "Spanish", "German", "French", "Japanese"],
                &[85, 10, 2, 2, 1],
            )?,
            ell_status: WeightedChoice::new(
                vec![
                    "",
                    "English Learner",
                    "Initially Fluent English Proficient",
                    "Redesignated Fluent English Proficient",
                ],
                &[80, 10, 5, 5],
            )?,
            special_education: WeightedChoice::new(
                vec![
                    "",
                    "Designated Instruction Service",
                    "Resource Specialty Program",
                    "Special Day Class",
                ],
                &[80, 10, 5, 5],
            )?,
            low_income: WeightedChoice::new(vec!["0", "1"], &[60, 40])?,
        })
    }
}

/// Generates `SIS ID` rows `st1..stN` with weighted demographic attributes.
pub struct StudentDemographicsGenerator {
    faker: Faker,
    count: usize,
    demographics: Demographics,
    cities: WeightedChoice<&'static str>,
}

impl StudentDemographicsGenerator {
    pub fn new(options: &GenerateOptions) -> Result<Self, GeneratorError> {
        Ok(Self {
            faker: options.faker(),
            count: options.count.unwrap_or(DEFAULT_STUDENT_COUNT),
            demographics: Demographics::new()?,
            cities: WeightedChoice::new(
                vec![
                    "Hyderabad",
                    "Chennai",
                    "Bangalore",
                    "Kochi",
                    "Vizag",
                    "Pondicherry",
                    "Mysore",
                    "Madurai",
                    "Ooty",
                    "Munnar",
                ],
                &[25, 10, 25, 5, 10, 5, 5, 5, 5, 5],
            )?,
        })
    }
}

impl DomainGenerator for StudentDemographicsGenerator {
    fn domain(&self) -> Domain {
        Domain::StudentDemographics
    }

    fn generate(&mut self) -> Result<Vec<OutputBatch>, GeneratorError> {
        let d = &self.demographics;
        let records: Vec<Record> = (1..=self.count)
            .map(|n| {
                Record::new()
                    .with("SIS ID", format!("st{n}"))
                    .with("FederalRaceCategory", *self.faker.pick_weighted(&d.race))
                    .with("PrimaryLanguage", *self.faker.pick_weighted(&d.language))
                    .with("ELLStatus", *self.faker.pick_weighted(&d.ell_status))
                    .with(
                        "SpecialEducation",
                        *self.faker.pick_weighted(&d.special_education),
                    )
                    .with("LowIncome", *self.faker.pick_weighted(&d.low_income))
                    .with("City/Region", *self.faker.pick_weighted(&self.cities))
            })
            .collect();
        Ok(vec![OutputBatch::csv(
            "StudentDemographics/demographics.csv",
            records,
        )])
    }
}
