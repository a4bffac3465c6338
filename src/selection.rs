use ratatui::prelude::*;

use crate::models::{Job, JobId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Selected(JobId),
}

impl Selection {
    /// Clicking a card selects it; clicking the selected card again goes back to the placeholder.
    pub fn click(&mut self, id: JobId) {
        *self = match *self {
            Selection::Selected(current) if current == id => Selection::None,
            _ => Selection::Selected(id),
        };
    }

    pub fn id(&self) -> Option<JobId> {
        match self {
            Selection::None => None,
            Selection::Selected(id) => Some(*id),
        }
    }

    pub fn is_selected(&self, id: JobId) -> bool {
        self.id() == Some(id)
    }

    pub fn selected_job<'a>(&self, jobs: &'a [Job]) -> Option<&'a Job> {
        let id = self.id()?;
        jobs.iter().find(|job| job.id == id)
    }
}

const PLACEHOLDER_ART: &[&str] = &[
    r"      .-----------------.      ",
    r"      |  _____   _____  |      ",
    r"      | |     | |     | |      ",
    r"      | |  o  | |  o  | |      ",
    r"      | |_____| |_____| |      ",
    r"      |     \_______/   |      ",
    r"      '-----------------'      ",
    r"        /|           |\        ",
    r"       /_|___________|_\       ",
];

/// Shown in the detail pane while nothing is selected.
pub fn placeholder_text(asset: &str) -> Text<'static> {
    let mut lines: Vec<Line> = vec![Line::from("")];
    for row in PLACEHOLDER_ART {
        lines.push(Line::from(Span::styled(*row, Style::default().fg(Color::Magenta))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Select a job to see its details"));
    lines.push(Line::from(Span::styled(
        asset.to_string(),
        Style::default().fg(Color::DarkGray),
    )));
    Text::from(lines).centered()
}

fn heading(label: &str) -> Line<'static> {
    Line::from(Span::styled(
        label.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

pub fn skill_tags(skills: &[String]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, skill) in skills.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {} ", skill),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ));
    }
    Line::from(spans)
}

pub fn detail_text(job: &Job, width: usize) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        format!("[logo] {}", job.logo),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        job.position.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(job.company.clone()));
    lines.push(Line::from(Span::styled(
        job.location.clone(),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" + {} Applications ", job.total_applications),
        Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(heading("Description"));
    for line in textwrap::fill(&job.description, width.max(20)).lines() {
        lines.push(Line::from(line.to_string()));
    }
    lines.push(Line::from(""));

    lines.push(heading("Skills"));
    lines.push(skill_tags(&job.skills));
    lines.push(Line::from(""));

    lines.push(heading("Base Salary"));
    lines.push(Line::from(Span::styled(
        job.salary.clone(),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(""));

    // No action is bound to this
    lines.push(Line::from(Span::styled(
        "[ Apply Now ]",
        Style::default().bg(Color::LightMagenta).fg(Color::White).add_modifier(Modifier::BOLD),
    )));

    Text::from(lines)
}

/// Plain rendering for stdout.
pub fn detail_plain(job: &Job) -> String {
    let mut out = String::new();
    out.push_str(&format!("Job #{}\n", job.id));
    out.push_str(&format!("Logo: {}\n", job.logo));
    out.push_str(&format!("Position: {}\n", job.position));
    out.push_str(&format!("Company: {}\n", job.company));
    out.push_str(&format!("Location: {}\n", job.location));
    out.push_str(&format!("Posted: {}\n", job.posted_time));
    out.push_str(&format!("+ {} Applications\n", job.total_applications));
    out.push_str(&format!("\n--- Description ---\n{}\n", textwrap::fill(&job.description, 80)));
    out.push_str(&format!("\nSkills: {}\n", job.skills.join(", ")));
    out.push_str(&format!("Base Salary: {}\n", job.salary));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_job;

    fn text_to_string(text: &Text) -> String {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_selection_starts_empty() {
        let selection = Selection::default();
        assert_eq!(selection, Selection::None);
        assert!(selection.selected_job(&[sample_job(0, "A", "NYC")]).is_none());
    }

    #[test]
    fn test_click_selects_and_replaces() {
        let jobs = vec![sample_job(0, "Backend Engineer", "Remote"), sample_job(1, "Frontend Engineer", "NYC")];
        let mut selection = Selection::default();

        selection.click(JobId(0));
        assert_eq!(selection.selected_job(&jobs).unwrap().position, "Backend Engineer");

        selection.click(JobId(1));
        assert_eq!(selection, Selection::Selected(JobId(1)));
        assert!(selection.is_selected(JobId(1)));
        assert!(!selection.is_selected(JobId(0)));
    }

    #[test]
    fn test_click_selected_again_deselects() {
        let mut selection = Selection::default();
        selection.click(JobId(4));
        selection.click(JobId(4));
        assert_eq!(selection, Selection::None);
    }

    #[test]
    fn test_detail_text_shows_every_field() {
        let job = sample_job(2, "Backend Engineer", "Remote");
        let rendered = text_to_string(&detail_text(&job, 60));

        assert!(rendered.contains("https://logo.example/2.png"));
        assert!(rendered.contains("Backend Engineer"));
        assert!(rendered.contains("Company 2"));
        assert!(rendered.contains("Remote"));
        assert!(rendered.contains("+ 12 Applications"));
        assert!(rendered.contains("Description"));
        assert!(rendered.contains(" Rust "));
        assert!(rendered.contains("Base Salary"));
        assert!(rendered.contains("$100k - $120k"));
        assert!(rendered.contains("Apply Now"));
    }

    #[test]
    fn test_placeholder_mentions_asset() {
        let rendered = text_to_string(&placeholder_text("/undraw_interview_re_e5jn.svg"));
        assert!(rendered.contains("/undraw_interview_re_e5jn.svg"));
        assert!(rendered.contains("Select a job"));
    }

    #[test]
    fn test_detail_plain() {
        let out = detail_plain(&sample_job(1, "Frontend Engineer", "NYC"));
        assert!(out.starts_with("Job #1\n"));
        assert!(out.contains("Location: NYC"));
        assert!(out.contains("Skills: Rust, SQL"));
    }
}
