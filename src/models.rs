use serde::{Deserialize, Serialize};
use std::fmt;

pub const CURRENT_LOCATION_VALUE: &str = "current-location";
pub const CURRENT_LOCATION_LABEL: &str = "Use Your Current Location";

/// Stable identifier assigned at load time: the record's index in the source array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record as it appears in the JSON resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub position: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub posted_time: String,
    pub logo: String,
    pub skills: Vec<String>,
    pub description: String,
    pub total_applications: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub position: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub posted_time: String,
    pub logo: String,
    pub skills: Vec<String>,
    pub description: String,
    pub total_applications: u32,
}

impl Job {
    pub fn from_record(id: JobId, record: JobRecord) -> Self {
        Self {
            id,
            position: record.position,
            company: record.company,
            location: record.location,
            salary: record.salary,
            posted_time: record.posted_time,
            logo: record.logo,
            skills: record.skills,
            description: record.description,
            total_applications: record.total_applications,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOption {
    pub value: String,
    pub label: String,
}

impl LocationOption {
    pub fn new(location: &str) -> Self {
        Self {
            value: location.to_string(),
            label: location.to_string(),
        }
    }

    pub fn current_location() -> Self {
        Self {
            value: CURRENT_LOCATION_VALUE.to_string(),
            label: CURRENT_LOCATION_LABEL.to_string(),
        }
    }

    pub fn is_current_location(&self) -> bool {
        self.value == CURRENT_LOCATION_VALUE
    }
}

#[cfg(test)]
pub(crate) fn sample_job(id: usize, position: &str, location: &str) -> Job {
    Job {
        id: JobId(id),
        position: position.to_string(),
        company: format!("Company {}", id),
        location: location.to_string(),
        salary: "$100k - $120k".to_string(),
        posted_time: "2 days ago".to_string(),
        logo: format!("https://logo.example/{}.png", id),
        skills: vec!["Rust".to_string(), "SQL".to_string()],
        description: format!("{} at company {}", position, id),
        total_applications: 12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_record_uses_camel_case_wire_names() {
        let json = r#"{
            "position": "Backend Engineer",
            "company": "Acme",
            "location": "Remote",
            "salary": "$120k",
            "postedTime": "1 day ago",
            "logo": "https://acme.example/logo.png",
            "skills": ["Rust", "Postgres"],
            "description": "Build things",
            "totalApplications": 42
        }"#;
        let record: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.posted_time, "1 day ago");
        assert_eq!(record.total_applications, 42);

        let job = Job::from_record(JobId(3), record);
        assert_eq!(job.id, JobId(3));
        assert_eq!(job.skills, vec!["Rust", "Postgres"]);
    }

    #[test]
    fn test_current_location_sentinel() {
        let sentinel = LocationOption::current_location();
        assert!(sentinel.is_current_location());
        assert_eq!(sentinel.label, "Use Your Current Location");
        assert!(!LocationOption::new("NYC").is_current_location());
    }
}
