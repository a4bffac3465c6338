use crate::models::{Job, JobId, LocationOption};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub query: String,
    pub location: Option<LocationOption>,
    pub triggered: bool,
}

impl FilterCriteria {
    /// Title substring match AND exact location match. An absent criterion matches everything;
    /// the current-location sentinel is never compared against job locations.
    pub fn matches(&self, job: &Job) -> bool {
        self.matches_query(job) && self.matches_location(job)
    }

    fn matches_query(&self, job: &Job) -> bool {
        if self.query.is_empty() {
            return true;
        }
        job.position
            .to_lowercase()
            .contains(&self.query.to_lowercase())
    }

    fn matches_location(&self, job: &Job) -> bool {
        match &self.location {
            Some(option) if !option.is_current_location() => job.location == option.value,
            _ => true,
        }
    }
}

/// Order-preserving filter over the loaded list.
pub fn apply(jobs: &[Job], criteria: &FilterCriteria) -> Vec<JobId> {
    jobs.iter()
        .filter(|job| criteria.matches(job))
        .map(|job| job.id)
        .collect()
}

/// Holds the criteria and the visible subset. Filtering only runs once a search has been
/// triggered; after that, every criteria or job-list change re-runs it.
#[derive(Debug)]
pub struct FilterEngine {
    jobs: Vec<Job>,
    criteria: FilterCriteria,
    visible: Vec<JobId>,
}

impl FilterEngine {
    pub fn new(jobs: Vec<Job>) -> Self {
        let visible = jobs.iter().map(|job| job.id).collect();
        Self {
            jobs,
            criteria: FilterCriteria::default(),
            visible,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn visible(&self) -> &[JobId] {
        &self.visible
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_jobs(&self) -> impl Iterator<Item = &Job> {
        self.visible.iter().filter_map(|id| self.job(*id))
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.refresh();
    }

    pub fn set_location(&mut self, location: Option<LocationOption>) {
        self.criteria.location = location;
        self.refresh();
    }

    /// Replace the underlying job list. Before the first search the visible list mirrors it.
    pub fn reset(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
        if self.criteria.triggered {
            self.refresh();
        } else {
            self.visible = self.jobs.iter().map(|job| job.id).collect();
        }
    }

    pub fn trigger_search(&mut self) {
        self.criteria.triggered = true;
        self.refresh();
    }

    fn refresh(&mut self) {
        if !self.criteria.triggered {
            return;
        }
        self.visible = apply(&self.jobs, &self.criteria);
        tracing::debug!(
            query = %self.criteria.query,
            location = ?self.criteria.location.as_ref().map(|l| l.value.as_str()),
            visible = self.visible.len(),
            "filtered jobs"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_job;

    fn scenario_jobs() -> Vec<Job> {
        vec![
            sample_job(0, "Backend Engineer", "Remote"),
            sample_job(1, "Frontend Engineer", "NYC"),
        ]
    }

    fn mixed_jobs() -> Vec<Job> {
        vec![
            sample_job(0, "Backend Engineer", "Remote"),
            sample_job(1, "Product Designer", "NYC"),
            sample_job(2, "Staff ENGINEER", "NYC"),
            sample_job(3, "Data Analyst", "Berlin"),
            sample_job(4, "Platform engineer", "Berlin"),
        ]
    }

    #[test]
    fn test_scenario_query_matches_both_in_order() {
        let mut engine = FilterEngine::new(scenario_jobs());
        engine.set_query("engineer");
        engine.trigger_search();
        assert_eq!(engine.visible(), &[JobId(0), JobId(1)]);
    }

    #[test]
    fn test_scenario_location_only() {
        let mut engine = FilterEngine::new(scenario_jobs());
        engine.set_location(Some(LocationOption::new("NYC")));
        engine.trigger_search();
        let positions: Vec<&str> = engine.visible_jobs().map(|j| j.position.as_str()).collect();
        assert_eq!(positions, vec!["Frontend Engineer"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let criteria = FilterCriteria {
            query: "EnGiNeEr".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&mixed_jobs(), &criteria), vec![JobId(0), JobId(2), JobId(4)]);
    }

    #[test]
    fn test_query_and_location_are_conjunctive() {
        let criteria = FilterCriteria {
            query: "engineer".to_string(),
            location: Some(LocationOption::new("Berlin")),
            triggered: true,
        };
        assert_eq!(apply(&mixed_jobs(), &criteria), vec![JobId(4)]);
    }

    #[test]
    fn test_empty_criteria_returns_full_list() {
        let jobs = mixed_jobs();
        let all: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(apply(&jobs, &FilterCriteria::default()), all);
    }

    #[test]
    fn test_sentinel_location_is_ignored() {
        let jobs = mixed_jobs();
        let criteria = FilterCriteria {
            location: Some(LocationOption::current_location()),
            ..Default::default()
        };
        assert_eq!(apply(&jobs, &criteria).len(), jobs.len());
    }

    #[test]
    fn test_location_filter_only_returns_that_location() {
        let jobs = mixed_jobs();
        for location in ["Remote", "NYC", "Berlin", "Nowhere"] {
            let criteria = FilterCriteria {
                location: Some(LocationOption::new(location)),
                ..Default::default()
            };
            for id in apply(&jobs, &criteria) {
                assert_eq!(jobs[id.0].location, location);
            }
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let jobs = mixed_jobs();
        let criteria = FilterCriteria {
            query: "engineer".to_string(),
            location: Some(LocationOption::new("NYC")),
            triggered: true,
        };
        let once = apply(&jobs, &criteria);
        let narrowed: Vec<Job> = jobs.iter().filter(|j| once.contains(&j.id)).cloned().collect();
        assert_eq!(apply(&narrowed, &criteria), once);

        let mut engine = FilterEngine::new(jobs);
        engine.set_query("engineer");
        engine.trigger_search();
        let first = engine.visible().to_vec();
        engine.trigger_search();
        assert_eq!(engine.visible(), first.as_slice());
    }

    #[test]
    fn test_no_filtering_before_trigger() {
        let mut engine = FilterEngine::new(mixed_jobs());
        engine.set_query("designer");
        engine.set_location(Some(LocationOption::new("NYC")));
        assert_eq!(engine.visible_count(), 5);

        engine.reset(scenario_jobs());
        assert_eq!(engine.visible(), &[JobId(0), JobId(1)]);
        assert!(!engine.criteria().triggered);
    }

    #[test]
    fn test_changes_refilter_after_trigger() {
        let mut engine = FilterEngine::new(mixed_jobs());
        engine.trigger_search();
        assert_eq!(engine.visible_count(), 5);

        engine.set_query("engineer");
        assert_eq!(engine.visible(), &[JobId(0), JobId(2), JobId(4)]);

        engine.set_location(Some(LocationOption::new("NYC")));
        assert_eq!(engine.visible(), &[JobId(2)]);

        engine.set_location(None);
        engine.reset(scenario_jobs());
        assert_eq!(engine.visible(), &[JobId(0), JobId(1)]);
    }
}
