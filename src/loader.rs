use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::LoadError;
use crate::models::{Job, JobId, JobRecord, LocationOption};

/// Where the static job list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    Url(String),
    File(PathBuf),
}

impl JobSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            JobSource::Url(trimmed.to_string())
        } else {
            JobSource::File(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            JobSource::Url(url) => url.clone(),
            JobSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub jobs: Vec<Job>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Loaded,
    Unavailable(String),
}

/// Everything the view needs after start-up.
#[derive(Debug)]
pub struct Board {
    pub jobs: Vec<Job>,
    pub locations: Vec<LocationOption>,
    pub skipped: Vec<SkippedRecord>,
    pub availability: Availability,
}

impl Board {
    pub fn from_report(report: LoadReport) -> Self {
        let locations = location_options(&report.jobs);
        Self {
            jobs: report.jobs,
            locations,
            skipped: report.skipped,
            availability: Availability::Loaded,
        }
    }

    pub fn unavailable(reason: String) -> Self {
        Self {
            jobs: Vec::new(),
            locations: location_options(&[]),
            skipped: Vec::new(),
            availability: Availability::Unavailable(reason),
        }
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }
}

pub fn fetch(source: &JobSource) -> Result<String, LoadError> {
    match source {
        JobSource::File(path) => std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        }),
        JobSource::Url(url) => {
            let http_err = |source: reqwest::Error| LoadError::Http {
                url: url.clone(),
                source,
            };
            let response = reqwest::blocking::get(url).map_err(http_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            response.text().map_err(http_err)
        }
    }
}

/// Parse the JSON payload, skipping (not failing on) malformed records.
pub fn parse_jobs(payload: &str) -> Result<LoadReport, LoadError> {
    let value: Value = serde_json::from_str(payload)?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(LoadError::NotAnArray(json_kind(&other))),
    };

    let mut report = LoadReport::default();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<JobRecord>(item) {
            Ok(record) => report.jobs.push(Job::from_record(JobId(index), record)),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed job record");
                report.skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Distinct job locations in first-seen order, followed by the current-location sentinel.
pub fn location_options(jobs: &[Job]) -> Vec<LocationOption> {
    let mut seen = HashSet::new();
    let mut options: Vec<LocationOption> = jobs
        .iter()
        .filter(|job| seen.insert(job.location.as_str()))
        .map(|job| LocationOption::new(&job.location))
        .collect();
    options.push(LocationOption::current_location());
    options
}

/// One fetch, no retry. Failures become an explicit "no jobs available" board.
pub fn load(source: &JobSource) -> Board {
    let result = fetch(source).and_then(|payload| parse_jobs(&payload));
    match result {
        Ok(report) => {
            tracing::info!(
                source = %source.describe(),
                jobs = report.jobs.len(),
                skipped = report.skipped.len(),
                "loaded job list"
            );
            Board::from_report(report)
        }
        Err(e) => {
            tracing::error!(source = %source.describe(), error = %e, "failed to load job list");
            Board::unavailable(e.to_string())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
