use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;
use crate::models::{
    Course, Department, DepartmentsInput, Gender, NewMember, NewMemberRequest, YearInput,
};

pub const MAX_DEPARTMENTS_PER_MEMBER: usize = 6;
pub const MIN_YEAR: i64 = 1;
pub const MAX_YEAR: i64 = 3;

static REG_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T/(DEG|DIP)/(19|20)\d{2}/\d{1,4}$").expect("reg number pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("phone pattern"));

/// Uppercases and strips all whitespace. No other rewriting happens.
pub fn normalize_reg_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Normalizes `raw` and checks it against `T/(DEG|DIP)/YYYY/N`.
pub fn validate_and_normalize(raw: &str) -> Result<String, AppError> {
    let normalized = normalize_reg_number(raw);
    if REG_NUMBER_RE.is_match(&normalized) {
        return Ok(normalized);
    }
    Err(AppError::validation(
        "INVALID_REG_NUMBER",
        "reg_number",
        reg_number_problem(&normalized),
    ))
}

fn reg_number_problem(normalized: &str) -> String {
    if normalized.is_empty() {
        return "Registration number is required".to_string();
    }
    let parts: Vec<&str> = normalized.split('/').collect();
    if parts.len() != 4 {
        return format!(
            "Invalid registration number '{}': expected format T/DEG/2020/1",
            normalized
        );
    }
    let (prefix, program, year, sequence) = (parts[0], parts[1], parts[2], parts[3]);
    if prefix != "T" {
        format!("Registration number must start with 'T/', got '{}/'", prefix)
    } else if program != "DEG" && program != "DIP" {
        format!("Program type must be DEG or DIP, got '{}'", program)
    } else if year.len() != 4
        || !year.chars().all(|c| c.is_ascii_digit())
        || !(year.starts_with("19") || year.starts_with("20"))
    {
        format!("Year must be a 4-digit year between 1900 and 2099, got '{}'", year)
    } else {
        format!("Sequence number must be 1 to 4 digits, got '{}'", sequence)
    }
}

fn required<'a>(
    value: &'a Option<String>,
    code: &'static str,
    field: &'static str,
) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(code, field, format!("{} is required", field))),
    }
}

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::validation(
            "INVALID_EMAIL",
            "email",
            format!("Invalid email address '{}'", email),
        ));
    }
    Ok(email.to_string())
}

pub fn validate_phone(phone: &str) -> Result<String, AppError> {
    let phone: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if !PHONE_RE.is_match(&phone) {
        return Err(AppError::validation(
            "INVALID_PHONE",
            "phone",
            "Phone number must be 10 to 15 digits, optionally starting with '+'",
        ));
    }
    Ok(phone)
}

pub fn validate_year(year: Option<&YearInput>) -> Result<u8, AppError> {
    let parsed = match year {
        Some(YearInput::Number(n)) => Some(*n),
        Some(YearInput::Text(s)) => s.trim().parse::<i64>().ok(),
        Some(YearInput::Other(_)) | None => None,
    };
    match parsed {
        Some(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => Ok(y as u8),
        _ => Err(AppError::validation(
            "INVALID_YEAR",
            "year_of_study",
            format!("Year of study must be between {} and {}", MIN_YEAR, MAX_YEAR),
        )),
    }
}

/// Parses department names, collapsing repeats while keeping the caller's order.
pub fn validate_departments(
    input: Option<&DepartmentsInput>,
) -> Result<Vec<Department>, AppError> {
    let raw = match input {
        Some(DepartmentsInput::List(names)) => names.as_slice(),
        Some(DepartmentsInput::Other(value)) => {
            return Err(AppError::validation(
                "INVALID_DEPARTMENTS",
                "departments",
                format!("Departments must be a list of names, got {}", value),
            ));
        }
        None => &[],
    };

    if raw.is_empty() {
        return Err(AppError::validation(
            "INVALID_DEPARTMENTS",
            "departments",
            "Select at least one department",
        ));
    }

    if raw.len() > MAX_DEPARTMENTS_PER_MEMBER {
        return Err(AppError::validation(
            "INVALID_DEPARTMENTS",
            "departments",
            format!("At most {} departments may be selected", MAX_DEPARTMENTS_PER_MEMBER),
        ));
    }

    let mut departments = Vec::with_capacity(raw.len());
    for name in raw {
        let department = Department::parse(name).ok_or_else(|| {
            AppError::validation(
                "INVALID_DEPARTMENTS",
                "departments",
                format!("Unknown department '{}'", name.trim()),
            )
        })?;
        if !departments.contains(&department) {
            departments.push(department);
        }
    }

    Ok(departments)
}

/// Validates every field of a registration, stopping at the first problem.
pub fn validate_registration(req: &NewMemberRequest) -> Result<NewMember, AppError> {
    let reg_number = validate_and_normalize(req.reg_number.as_deref().unwrap_or_default())?;
    let full_name = required(&req.full_name, "INVALID_FULL_NAME", "full_name")?
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let email = validate_email(required(&req.email, "INVALID_EMAIL", "email")?)?;
    let phone = validate_phone(required(&req.phone, "INVALID_PHONE", "phone")?)?;

    let gender_raw = required(&req.gender, "INVALID_GENDER", "gender")?;
    let gender = Gender::parse(gender_raw).ok_or_else(|| {
        AppError::validation(
            "INVALID_GENDER",
            "gender",
            format!("Gender must be one of Male, Female, Other; got '{}'", gender_raw),
        )
    })?;

    let year_of_study = validate_year(req.year_of_study.as_ref())?;

    let course_raw = required(&req.course, "INVALID_COURSE", "course")?;
    let course = Course::parse(course_raw).ok_or_else(|| {
        AppError::validation(
            "INVALID_COURSE",
            "course",
            format!("Course must be ICT or CS; got '{}'", course_raw),
        )
    })?;

    let departments = validate_departments(req.departments.as_ref())?;

    Ok(NewMember {
        reg_number,
        full_name,
        email,
        phone,
        gender,
        year_of_study,
        course,
        departments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewMemberRequest {
        NewMemberRequest {
            reg_number: Some("t/deg/2020/1".to_string()),
            full_name: Some("  Johnson   Mwakyusa ".to_string()),
            email: Some("john@example.com".to_string()),
            phone: Some("+255 712 345 678".to_string()),
            gender: Some("male".to_string()),
            year_of_study: Some(YearInput::Text("2".to_string())),
            course: Some("ict".to_string()),
            departments: Some(DepartmentsInput::List(vec![
                "Programming".to_string(),
                "programming".to_string(),
            ])),
        }
    }

    fn code_of(err: AppError) -> &'static str {
        err.code()
    }

    #[test]
    fn reg_number_accepts_short_sequence() {
        assert_eq!(validate_and_normalize("T/DEG/2020/1").unwrap(), "T/DEG/2020/1");
        assert_eq!(validate_and_normalize(" t/dip/1999/0042 ").unwrap(), "T/DIP/1999/0042");
    }

    #[test]
    fn reg_number_rejects_unknown_program_type() {
        let err = validate_and_normalize("T/MSC/2020/1").unwrap_err();
        assert_eq!(err.code(), "INVALID_REG_NUMBER");
        assert_eq!(err.to_string(), "Program type must be DEG or DIP, got 'MSC'");
    }

    #[test]
    fn reg_number_reasons_name_the_bad_segment() {
        let reason = |raw: &str| validate_and_normalize(raw).unwrap_err().to_string();
        assert!(reason("X/DEG/2020/1").contains("must start with 'T/'"));
        assert!(reason("T/DEG/2120/1").contains("4-digit year"));
        assert!(reason("T/DEG/2020/12345").contains("Sequence number"));
        assert!(reason("T/DEG/2020").contains("expected format"));
        assert_eq!(reason(""), "Registration number is required");
    }

    #[test]
    fn registration_is_normalized() {
        let member = validate_registration(&request()).unwrap();
        assert_eq!(member.reg_number, "T/DEG/2020/1");
        assert_eq!(member.full_name, "Johnson Mwakyusa");
        assert_eq!(member.phone, "+255712345678");
        assert_eq!(member.gender, Gender::Male);
        assert_eq!(member.year_of_study, 2);
        assert_eq!(member.course, Course::Ict);
        assert_eq!(member.departments, vec![Department::Programming]);
    }

    #[test]
    fn each_field_has_its_own_error_code() {
        let mut req = request();
        req.email = Some("not-an-email".to_string());
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_EMAIL");

        let mut req = request();
        req.phone = Some("12345".to_string());
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_PHONE");

        let mut req = request();
        req.gender = None;
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_GENDER");

        let mut req = request();
        req.year_of_study = Some(YearInput::Number(4));
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_YEAR");

        let mut req = request();
        req.course = Some("Medicine".to_string());
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_COURSE");

        let mut req = request();
        req.departments = Some(DepartmentsInput::List(vec![]));
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_DEPARTMENTS");

        let mut req = request();
        req.departments = Some(DepartmentsInput::List(vec!["Basket Weaving".to_string()]));
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_DEPARTMENTS");

        let mut req = request();
        req.full_name = Some("   ".to_string());
        assert_eq!(code_of(validate_registration(&req).unwrap_err()), "INVALID_FULL_NAME");
    }

    #[test]
    fn every_department_may_be_selected() {
        let all: Vec<String> = Department::ALL.iter().map(|d| d.as_str().to_string()).collect();
        let selected = validate_departments(Some(&DepartmentsInput::List(all.clone()))).unwrap();
        assert_eq!(selected.len(), MAX_DEPARTMENTS_PER_MEMBER);

        let mut too_many = all;
        too_many.push("Programming".to_string());
        assert!(validate_departments(Some(&DepartmentsInput::List(too_many))).is_err());
    }

    #[test]
    fn wrongly_typed_values_get_field_codes() {
        let year: YearInput = serde_json::from_value(serde_json::json!(2.5)).unwrap();
        assert_eq!(validate_year(Some(&year)).unwrap_err().code(), "INVALID_YEAR");
        assert_eq!(validate_year(None).unwrap_err().code(), "INVALID_YEAR");

        let departments: DepartmentsInput =
            serde_json::from_value(serde_json::json!("Programming")).unwrap();
        let err = validate_departments(Some(&departments)).unwrap_err();
        assert_eq!(err.code(), "INVALID_DEPARTMENTS");
        assert_eq!(err.to_string(), "Departments must be a list of names, got \"Programming\"");
        assert_eq!(validate_departments(None).unwrap_err().code(), "INVALID_DEPARTMENTS");
    }
}
