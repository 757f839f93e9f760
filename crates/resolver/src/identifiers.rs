use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_JOB: Lazy<Regex> = Lazy::new(|| Regex::new(r"^U\d+").expect("valid job regex"));

static PRO_WRAPPED_JOB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PRO \d+[_-](U\d+)").expect("valid PRO job regex"));

static PRO_YEAR_JOB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PRO-2025-\d+").expect("valid PRO year regex"));

static PRO_FOLDER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PRO\s*\d+[_-]").expect("valid PRO prefix regex"));

static DRAWING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bR-?[0-9]+[A-Z]?\b").expect("valid drawing number regex"));

/// Pulls the job-number token out of a folder or project name.
///
/// Tried in order: a leading `U<digits>`, the `U` token wrapped in
/// `PRO <digits>_U<digits>`, then a leading `PRO-2025-<digits>`.
pub fn extract_job_number(name: &str) -> Option<String> {
    let name = name.trim();

    if let Some(m) = LEADING_JOB.find(name) {
        return Some(m.as_str().to_string());
    }

    if let Some(caps) = PRO_WRAPPED_JOB.captures(name) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    PRO_YEAR_JOB.find(name).map(|m| m.as_str().to_string())
}

/// Canonical `R-<n><suffix>` form of the first drawing number found in `text`.
pub fn normalize_drawing_number(text: &str) -> Option<String> {
    let found = DRAWING_NUMBER.find(text)?.as_str().to_uppercase();
    if found.starts_with("R-") {
        return Some(found);
    }
    Some(format!("R-{}", &found[1..]))
}

/// On-disk folder name for a project.
///
/// `PRO <n>_` style jobs take the project name straight after that prefix;
/// every other job is joined to the name with `"_ "`. A blank name leaves the
/// job number alone.
pub fn project_folder_name(job_number: &str, project_name: Option<&str>) -> String {
    let job_number = job_number.trim();
    let Some(project_name) = non_blank(project_name) else {
        return job_number.to_string();
    };

    match PRO_FOLDER_PREFIX.find(job_number) {
        Some(prefix) => format!("{}{project_name}", prefix.as_str()),
        None => format!("{job_number}_ {project_name}"),
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
