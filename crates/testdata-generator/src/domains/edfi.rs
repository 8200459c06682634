//! Ed-Fi entity graph (`EdFi/*.json`).
//!
//! Each school owns its students, courses, calendar, graduation plans and
//! staff; associations reference the school, a graduation plan and the
//! student by id. Output is array-wrapped JSON, one file per entity.

use crate::faker::{years, Faker};
use crate::generator::{Domain, DomainGenerator, GenerateOptions, GeneratorError, OutputBatch};
use crate::generators::ChoiceSet;
use chrono::Duration;
use oea_core::{Record, Value};
use tracing::debug;

const OPERATIONAL_STATUS: &[&str] = &["Active", "Inactive"];
const CHARTER_STATUS: &[&str] = &[
    "School Charter",
    "Open Enrollment Charter",
    "Not a Charter School",
];
const GRADE_LEVELS: &[&str] = &[
    "First Grade",
    "Second Grade",
    "Third Grade",
    "Fourth Grade",
    "Fifth Grade",
    "Sixth Grade",
    "Seventh Grade",
    "Eighth Grade",
    "Ninth Grade",
    "Tenth Grade",
    "Eleventh Grade",
    "Twelfth Grade",
];
const SCHOOL_TYPES: &[&str] = &["High School", "Middle School", "Elementary School"];
const SUBJECTS: &[(&str, &str)] = &[
    ("Math", "Algebra"),
    ("Math", "Geometry"),
    ("Language", "English"),
    ("History", "World History"),
    ("Science", "Biology"),
    ("Science", "Health"),
    ("Technology", "Programming"),
    ("Physical Education", "Sports"),
    ("Arts", "Music"),
];

/// `uri://ed-fi.org/<Key>#<Value>`
pub fn descriptor(key: &str, value: &str) -> String {
    format!("uri://ed-fi.org/{key}#{value}")
}

fn link(rel: &str, href: String) -> Record {
    Record::new().with("rel", rel).with("href", href)
}

/// Tunables for the Ed-Fi generator.
#[derive(Debug, Clone)]
pub struct EdFiSettings {
    pub schools: usize,
    pub students_per_school: usize,
    pub graduation_plans_per_school: usize,
    pub staff_per_school: usize,
    pub school_year: String,
    pub include_optional_fields: bool,
}

impl Default for EdFiSettings {
    fn default() -> Self {
        Self {
            schools: 1,
            students_per_school: 100,
            graduation_plans_per_school: 10,
            staff_per_school: 5,
            school_year: "2021".to_string(),
            include_optional_fields: true,
        }
    }
}

/// One school and everything it owns.
struct School {
    record: Record,
    id: String,
    school_id: u64,
    calendar: Record,
    students: Vec<Record>,
    courses: Vec<Record>,
    graduation_plans: Vec<Record>,
    associations: Vec<Record>,
    staff: Vec<Record>,
}

/// Generates the Ed-Fi entity files.
pub struct EdFiGenerator {
    faker: Faker,
    settings: EdFiSettings,
    school_types: ChoiceSet<&'static str>,
    operational_status: ChoiceSet<&'static str>,
    charter_status: ChoiceSet<&'static str>,
    grade_levels: ChoiceSet<&'static str>,
}

impl EdFiGenerator {
    pub fn new(options: &GenerateOptions) -> Result<Self, GeneratorError> {
        let mut settings = EdFiSettings::default();
        if let Some(schools) = options.schools {
            settings.schools = schools;
        }
        if let Some(count) = options.count {
            settings.students_per_school = count;
        }
        Self::with_settings(options, settings)
    }

    pub fn with_settings(
        options: &GenerateOptions,
        settings: EdFiSettings,
    ) -> Result<Self, GeneratorError> {
        if settings.graduation_plans_per_school == 0 && settings.students_per_school > 0 {
            return Err(GeneratorError::Configuration(
                "students need at least one graduation plan per school".to_string(),
            ));
        }
        Ok(Self {
            faker: options.faker(),
            settings,
            school_types: ChoiceSet::new(SCHOOL_TYPES.to_vec())?,
            operational_status: ChoiceSet::new(OPERATIONAL_STATUS.to_vec())?,
            charter_status: ChoiceSet::new(CHARTER_STATUS.to_vec())?,
            grade_levels: ChoiceSet::new(GRADE_LEVELS.to_vec())?,
        })
    }

    fn grade_level(&mut self) -> &'static str {
        *self.faker.pick(&self.grade_levels)
    }

    fn pick_str(&mut self, options: &[&'static str]) -> &'static str {
        options[self.faker.pyint(0, options.len() as i64 - 1) as usize]
    }

    fn create_school(&mut self) -> School {
        let school_type = *self.faker.pick(&self.school_types);
        let school_name = format!("{} {}", self.faker.city(), school_type);
        let id = self.faker.uuid4_simple();
        let school_id = self.faker.random_number(5);
        let short_name: String = school_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect();
        let website = format!("www.{}.com", school_name.to_lowercase().replace(' ', ""));
        let operational = *self.faker.pick(&self.operational_status);
        let funding = self.pick_str(&["public", "private"]);
        let charter = *self.faker.pick(&self.charter_status);
        let addresses: Value = if self.settings.include_optional_fields {
            self.create_addresses().into()
        } else {
            "".into()
        };
        let identification_code = self.faker.random_number(10);
        let telephones = self.create_telephones();
        let grade_levels: Vec<Value> = (0..4)
            .map(|_| {
                let level = self.grade_level();
                Record::new()
                    .with("gradeLevelDescriptor", descriptor("GradeLevelDescriptor", level))
                    .into()
            })
            .collect();

        let record = Record::new()
            .with("Id", id.clone())
            .with("SchoolId", school_id)
            .with("NameOfInstitution", school_name.clone())
            .with(
                "OperationalStatusDescriptor",
                descriptor("OperationalStatusDescriptor", operational),
            )
            .with("ShortNameOfInstitution", short_name)
            .with("Website", website)
            .with(
                "AdministrativeFundingControlDescriptor",
                descriptor(
                    "AdministrativeFundingControlDescriptor",
                    &format!("{funding} School"),
                ),
            )
            .with(
                "CharterStatusDescriptor",
                descriptor("CharterStatusDescriptor", charter),
            )
            .with(
                "SchoolTypeDescriptor",
                descriptor("SchoolTypeDescriptor", "Regular"),
            )
            .with(
                "TitleIPartASchoolDesignationDescriptor",
                descriptor(
                    "TitleIPartASchoolDesignationDescriptor",
                    "Not A Title I School",
                ),
            )
            .with("Addresses", addresses)
            .with(
                "EducationOrganizationCategories",
                vec![Record::new().with(
                    "EducationOrganizationCategoryDescriptor",
                    descriptor("educationOrganizationCategoryDescriptor", "School"),
                )],
            )
            .with(
                "IdentificationCodes",
                vec![Record::new()
                    .with(
                        "educationOrganizationIdentificationSystemDescriptor",
                        descriptor("educationOrganizationIdentificationSystemDescriptor", "SEA"),
                    )
                    .with("identificationCode", identification_code)],
            )
            .with("InstitutionTelephones", telephones)
            .with("InternationalAddresses", Value::Array(Vec::new()))
            .with(
                "SchoolCategories",
                vec![Record::new().with(
                    "SchoolCategoryDescriptor",
                    descriptor("SchoolCategoryDescriptor", school_type),
                )],
            )
            .with("gradeLevels", Value::Array(grade_levels));

        let school_year_id = self.faker.uuid4_simple();
        let calendar = self.create_calendar(&id, school_id, &school_year_id);
        let students = self.create_students();
        let courses = self.create_courses(&id, school_id, &school_name);
        let graduation_plans = self.create_graduation_plans(&id, school_id, &school_year_id);
        let associations =
            self.create_student_school_associations(&id, school_id, &students, &graduation_plans);
        let staff = (0..self.settings.staff_per_school)
            .map(|_| self.create_staff())
            .collect();

        School {
            record,
            id,
            school_id,
            calendar,
            students,
            courses,
            graduation_plans,
            associations,
            staff,
        }
    }

    fn create_addresses(&mut self) -> Vec<Record> {
        let state = self.faker.state_abbr();
        ["Physical", "Mailing"]
            .into_iter()
            .map(|kind| {
                Record::new()
                    .with("AddressType", kind)
                    .with("City", self.faker.city())
                    .with("PostalCode", self.faker.postcode())
                    .with("StateAbbreviation", state)
                    .with("StreetNumberName", self.faker.street_name())
            })
            .collect()
    }

    fn create_telephones(&mut self) -> Vec<Record> {
        ["Fax", "Main"]
            .into_iter()
            .map(|kind| {
                Record::new()
                    .with(
                        "InstitutionTelephoneNumberTypeDescriptor",
                        descriptor("InstitutionTelephoneNumberTypeDescriptor", kind),
                    )
                    .with("TelephoneNumber", self.faker.phone_number())
            })
            .collect()
    }

    fn create_calendar(&mut self, school_uuid: &str, school_id: u64, school_year_id: &str) -> Record {
        Record::new()
            .with("Id", self.faker.uuid4_simple())
            .with("CalendarCode", self.faker.random_number(5))
            .with(
                "SchoolReference",
                Record::new().with("SchoolId", school_id).with(
                    "Link",
                    link("School", format!("/ed-fi/schools/{school_uuid}")),
                ),
            )
            .with(
                "SchoolYearTypeReference",
                Record::new()
                    .with("SchoolYear", self.settings.school_year.as_str())
                    .with(
                        "Link",
                        link(
                            "SchoolYearType",
                            format!("/ed-fi/schoolYearTypes/{school_year_id}"),
                        ),
                    ),
            )
            .with(
                "CalendarTypeDescriptor",
                descriptor("calendarTypeDescriptor", "Student Specific"),
            )
            .with("GradeLevel", Value::Array(Vec::new()))
    }

    fn create_students(&mut self) -> Vec<Record> {
        (0..self.settings.students_per_school)
            .map(|_| {
                let gender = self.faker.gender();
                let first_name = self.faker.first_name_for(gender);
                Record::new()
                    .with("Id", self.faker.uuid4_simple())
                    .with("StudentUniqueId", self.faker.random_number(5))
                    .with("BirthCity", self.faker.city())
                    .with(
                        "BirthDate",
                        self.faker
                            .date_between(years(-18), years(-5))
                            .to_string(),
                    )
                    .with(
                        "BirthSexDescriptor",
                        descriptor("birthStateAbbreviationDescriptor", gender.as_str()),
                    )
                    .with("FirstName", first_name)
                    .with("IdentificationDocuments", Value::Array(Vec::new()))
                    .with("LastSurname", self.faker.last_name())
                    .with(
                        "OtherNames",
                        vec![Record::new()
                            .with(
                                "OtherNameTypeDescriptor",
                                descriptor("otherNameTypeDescriptor", "Nickname"),
                            )
                            .with("FirstName", self.faker.first_name_for(gender))
                            .with("PersonalTitlePrefix", gender.title_prefix())],
                    )
                    .with("PersonalIdentificationDocuments", Value::Array(Vec::new()))
                    .with("PersonalTitlePrefix", gender.title_prefix())
                    .with("Visas", Value::Array(Vec::new()))
            })
            .collect()
    }

    fn create_courses(&mut self, school_uuid: &str, school_id: u64, school_name: &str) -> Vec<Record> {
        let catalog_host = school_name.to_lowercase().replace(' ', "");
        SUBJECTS
            .iter()
            .map(|&(subject, course_name)| {
                let prefix: String = course_name.chars().take(3).collect::<String>().to_uppercase();
                Record::new()
                    .with("Id", self.faker.uuid4_simple())
                    .with(
                        "EducationOrganizationReference",
                        Record::new()
                            .with("EducationOrganizationId", school_id)
                            .with(
                                "Link",
                                link("School", format!("/ed-fi/schools/{school_uuid}")),
                            ),
                    )
                    .with("CourseCode", self.faker.random_number(5))
                    .with(
                        "AcademicSubjectDescriptor",
                        descriptor("academicSubjectDescriptor", subject),
                    )
                    .with(
                        "CourseDefinedByDescriptor",
                        descriptor("CourseDefinedByDescriptor", "SEA"),
                    )
                    .with("CourseDescription", format!("Description about {course_name}"))
                    .with(
                        "CourseGPAApplicabilityDescriptor",
                        descriptor(
                            "CourseGPAApplicabilityDescriptor",
                            self.pick_str(&["Applicable", "Not Applicable"]),
                        ),
                    )
                    .with("CourseTitle", course_name)
                    .with("HighSchoolCourseRequirement", self.faker.boolean())
                    .with("NumberOfParts", 1i32)
                    .with("CompetencyLevels", Value::Array(Vec::new()))
                    .with(
                        "IdentificationCodes",
                        vec![
                            Record::new()
                                .with(
                                    "CourseIdentificationSystemDescriptor",
                                    descriptor(
                                        "CourseIdentificationSystemDescriptor",
                                        "LEA course code",
                                    ),
                                )
                                .with(
                                    "CourseCatalogURL",
                                    format!("http://www.{catalog_host}.edu/coursecatalog"),
                                )
                                .with(
                                    "IdentificationCode",
                                    format!("{prefix}-{}", self.faker.pyint(1, 4)),
                                ),
                            Record::new()
                                .with(
                                    "CourseIdentificationSystemDescriptor",
                                    descriptor(
                                        "CourseIdentificationSystemDescriptor",
                                        "State course code",
                                    ),
                                )
                                .with("IdentificationCode", self.faker.random_number(5)),
                        ],
                    )
                    .with("LearningObjectives", Value::Array(Vec::new()))
                    .with(
                        "LearningStandards",
                        vec![Record::new().with(
                            "LearningStandardReference",
                            Record::new()
                                .with("LearningStandardId", self.faker.random_number(5))
                                .with(
                                    "Link",
                                    link(
                                        "LearningStandard",
                                        format!(
                                            "/ed-fi/learningStandards/{}",
                                            self.faker.uuid4_simple()
                                        ),
                                    ),
                                ),
                        )],
                    )
                    .with(
                        "LevelCharacteristics",
                        vec![Record::new().with(
                            "CourseLevelCharacteristicDescriptor",
                            descriptor("CourseLevelCharacteristicDescriptor", "Core Subject"),
                        )],
                    )
                    .with("OfferedGradeLevels", Value::Array(Vec::new()))
            })
            .collect()
    }

    fn create_graduation_plans(
        &mut self,
        school_uuid: &str,
        school_id: u64,
        school_year_id: &str,
    ) -> Vec<Record> {
        (0..self.settings.graduation_plans_per_school)
            .map(|_| {
                Record::new()
                    .with("Id", self.faker.uuid4_simple())
                    .with(
                        "EducationOrganizationReference",
                        Record::new()
                            .with("EducationOrganizationId", school_id)
                            .with(
                                "Link",
                                link("School", format!("/ed-fi/schools/{school_uuid}")),
                            ),
                    )
                    .with(
                        "GraduationSchoolYearTypeReference",
                        Record::new()
                            .with("SchoolYear", self.settings.school_year.as_str())
                            .with(
                                "Link",
                                link(
                                    "SchoolYearType",
                                    format!("/ed-fi/schoolYearTypes/{school_year_id}"),
                                ),
                            ),
                    )
                    .with(
                        "GraduationPlanTypeDescriptor",
                        descriptor(
                            "GraduationPlanTypeDescriptor",
                            self.pick_str(&["Minimum", "Recommended"]),
                        ),
                    )
                    .with("TotalRequiredCredits", self.faker.pyint(20, 29))
                    .with("CreditsByCourses", Value::Array(Vec::new()))
                    .with(
                        "CreditsByCreditCategories",
                        vec![Record::new()
                            .with(
                                "CreditCategoryDescriptor",
                                descriptor("CreditCategoryDescriptor", "Honors"),
                            )
                            .with("Credits", self.faker.pyint(5, 14))],
                    )
                    .with("CreditsBySubjects", Value::Array(Vec::new()))
                    .with("RequiredAssessments", Value::Array(Vec::new()))
            })
            .collect()
    }

    fn create_student_school_associations(
        &mut self,
        school_uuid: &str,
        school_id: u64,
        students: &[Record],
        graduation_plans: &[Record],
    ) -> Vec<Record> {
        let plan_ids: Vec<&str> = graduation_plans
            .iter()
            .filter_map(|plan| plan.get_str("Id"))
            .collect();
        students
            .iter()
            .map(|student| {
                let plan_id = plan_ids[self.faker.pyint(0, plan_ids.len() as i64 - 1) as usize];
                let student_id = student.get_str("Id").unwrap_or_default();
                let unique_id = student.get("StudentUniqueId").cloned().unwrap_or(Value::Null);
                Record::new()
                    .with("Id", self.faker.uuid4_simple())
                    .with(
                        "GraduationPlanReference",
                        Record::new()
                            .with("EducationOrganizationId", school_id)
                            .with(
                                "GraduationPlanTypeDescriptor",
                                descriptor("GraduationPlanTypeDescriptor", "Minimum"),
                            )
                            .with("GraduationSchoolYear", self.settings.school_year.as_str())
                            .with(
                                "Link",
                                link("GraduationPlan", format!("/ed-fi/graduationPlans/{plan_id}")),
                            ),
                    )
                    .with(
                        "SchoolReference",
                        Record::new().with("SchoolId", school_id).with(
                            "Link",
                            link("School", format!("/ed-fi/schools/{school_uuid}")),
                        ),
                    )
                    .with(
                        "StudentReference",
                        Record::new().with("StudentUniqueId", unique_id).with(
                            "Link",
                            link("Student", format!("/ed-fi/students/{student_id}")),
                        ),
                    )
                    .with(
                        "EntryDate",
                        self.faker
                            .date_between(years(-5), Duration::zero())
                            .to_string(),
                    )
                    .with(
                        "EntryGradeLevelDescriptor",
                        descriptor("GradeLevelDescriptor", self.grade_level()),
                    )
                    .with("AlternativeGraduationPlans", Value::Array(Vec::new()))
                    .with("EducationPlans", Value::Array(Vec::new()))
            })
            .collect()
    }

    fn create_staff(&mut self) -> Record {
        let gender = self.faker.gender();
        let first_name = self.faker.first_name_for(gender);
        let last_name = self.faker.last_name();
        Record::new()
            .with("id", self.faker.uuid4_simple())
            .with("staffUniqueId", self.faker.random_number(5))
            .with(
                "birthDate",
                self.faker.date_between(years(-60), years(-30)).to_string(),
            )
            .with("firstName", first_name)
            .with(
                "highestCompletedLevelOfEducationDescriptor",
                descriptor("LevelOfEducationDescriptor", "Some College No Degree"),
            )
            .with("hispanicLatinoEthnicity", self.faker.boolean())
            .with("lastSurname", last_name)
            .with(
                "loginId",
                format!("{first_name}_{}", self.faker.random_number(2)),
            )
            .with("personalTitlePrefix", gender.title_prefix())
            .with("sexDescriptor", descriptor("SexDescriptor", gender.as_str()))
            .with("yearsOfPriorProfessionalExperience", self.faker.pyint(0, 14))
            .with("addresses", Value::Array(Vec::new()))
            .with("ancestryEthnicOrigins", Value::Array(Vec::new()))
            .with("credentials", Value::Array(Vec::new()))
            .with(
                "electronicMails",
                vec![Record::new()
                    .with(
                        "electronicMailAddress",
                        format!("{first_name}{last_name}@edfi.org"),
                    )
                    .with(
                        "electronicMailTypeDescriptor",
                        descriptor("ElectronicMailTypeDescriptor", "Work"),
                    )],
            )
            .with(
                "identificationCodes",
                vec![Record::new()
                    .with(
                        "staffIdentificationSystemDescriptor",
                        descriptor("StaffIdentificationSystemDescriptor", "State"),
                    )
                    .with("identificationCode", self.faker.random_number(5))],
            )
            .with("identificationDocuments", Value::Array(Vec::new()))
            .with("internationalAddresses", Value::Array(Vec::new()))
            .with("languages", Value::Array(Vec::new()))
            .with("otherNames", vec![self.faker.first_name_for(gender)])
            .with(
                "personalIdentificationDocuments",
                vec![Record::new()
                    .with(
                        "identificationDocumentUseDescriptor",
                        descriptor(
                            "IdentificationDocumentUseDescriptor",
                            "Personal Information Verification",
                        ),
                    )
                    .with(
                        "personalInformationVerificationDescriptor",
                        descriptor(
                            "PersonalInformationVerificationDescriptor",
                            "Entry in family Bible",
                        ),
                    )],
            )
            .with(
                "races",
                vec![Record::new().with("raceDescriptor", descriptor("RaceDescriptor", "Asian"))],
            )
            .with("recognitions", Value::Array(Vec::new()))
            .with("telephones", Value::Array(Vec::new()))
            .with("tribalAffiliations", Value::Array(Vec::new()))
            .with("visas", Value::Array(Vec::new()))
    }
}

impl DomainGenerator for EdFiGenerator {
    fn domain(&self) -> Domain {
        Domain::EdFi
    }

    fn generate(&mut self) -> Result<Vec<OutputBatch>, GeneratorError> {
        let mut schools = Vec::new();
        let mut students = Vec::new();
        let mut associations = Vec::new();
        let mut courses = Vec::new();
        let mut calendars = Vec::new();
        let mut graduation_plans = Vec::new();
        let mut staff = Vec::new();

        for _ in 0..self.settings.schools {
            let school = self.create_school();
            debug!(
                "Generated school {} ({}) with {} students",
                school.id,
                school.school_id,
                school.students.len()
            );
            schools.push(school.record);
            students.extend(school.students);
            associations.extend(school.associations);
            courses.extend(school.courses);
            calendars.push(school.calendar);
            graduation_plans.extend(school.graduation_plans);
            staff.extend(school.staff);
        }

        Ok(vec![
            OutputBatch::json_array("EdFi/School.json", schools),
            OutputBatch::json_array("EdFi/Student.json", students),
            OutputBatch::json_array("EdFi/StudentSchoolAssociation.json", associations),
            OutputBatch::json_array("EdFi/Course.json", courses),
            OutputBatch::json_array("EdFi/Calendar.json", calendars),
            OutputBatch::json_array("EdFi/GraduationPlan.json", graduation_plans),
            OutputBatch::json_array("EdFi/Staff.json", staff),
        ])
    }
}
