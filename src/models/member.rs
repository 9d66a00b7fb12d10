use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|g| g.as_str().eq_ignore_ascii_case(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Course {
    #[serde(rename = "ICT")]
    Ict,
    #[serde(rename = "CS")]
    Cs,
}

impl Course {
    pub const ALL: [Course; 2] = [Course::Ict, Course::Cs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Ict => "ICT",
            Course::Cs => "CS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Cybersecurity,
    Programming,
    Networking,
    #[serde(rename = "Computer Maintenance")]
    ComputerMaintenance,
    #[serde(rename = "Graphic Design")]
    GraphicDesign,
    #[serde(rename = "AI & Machine Learning")]
    AiMachineLearning,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Cybersecurity,
        Department::Programming,
        Department::Networking,
        Department::ComputerMaintenance,
        Department::GraphicDesign,
        Department::AiMachineLearning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Cybersecurity => "Cybersecurity",
            Department::Programming => "Programming",
            Department::Networking => "Networking",
            Department::ComputerMaintenance => "Computer Maintenance",
            Department::GraphicDesign => "Graphic Design",
            Department::AiMachineLearning => "AI & Machine Learning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|d| d.as_str().eq_ignore_ascii_case(s))
    }
}

/// A member as stored in the Members sheet.
///
/// Text columns are kept as text so rows edited by hand in the spreadsheet
/// stay readable even when they drift from the registration enums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub reg_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub year_of_study: Option<u8>,
    pub course: String,
    pub departments: Vec<String>,
    pub active: bool,
    pub role: String,
    pub registration_date: String,
}

/// Year of study as sent by clients: forms post text, scripts post numbers.
/// Anything else lands in `Other` and is rejected by validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Number(i64),
    Text(String),
    Other(Value),
}

/// Department selection as sent by clients. A non-list value lands in `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DepartmentsInput {
    List(Vec<String>),
    Other(Value),
}

/// Raw registration payload. Every field is optional so that a missing field
/// is reported as a field error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMemberRequest {
    pub reg_number: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub year_of_study: Option<YearInput>,
    pub course: Option<String>,
    pub departments: Option<DepartmentsInput>,
}

/// A registration that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub reg_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    pub year_of_study: u8,
    pub course: Course,
    pub departments: Vec<Department>,
}

impl NewMember {
    pub fn departments_cell(&self) -> String {
        self.departments
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
