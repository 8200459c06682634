//! One generator per data domain.

mod azure_ad;
mod edfi;
mod intune;
mod ms_insights;
mod student_demographics;

pub use azure_ad::{load_user_ids, AzureAdGenerator};
pub use edfi::{EdFiGenerator, EdFiSettings};
pub use intune::IntuneGenerator;
pub use ms_insights::{MsInsightsGenerator, MsInsightsSettings};
pub use student_demographics::StudentDemographicsGenerator;
