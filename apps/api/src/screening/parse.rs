//! Resume parsing: role-bucket detection, skill extraction, and a rough
//! years-of-experience read. Matching is deliberately lexical — the skill
//! dictionary and substring semantics define what "detected" means.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Skill dictionary per role bucket. Bucket order is the detection
/// precedence; `frontend` is the fallback.
pub const ROLE_SKILLS: &[(&str, &[&str])] = &[
    (
        "uiux",
        &[
            "figma",
            "sketch",
            "adobe xd",
            "wireframes",
            "prototyping",
            "user research",
            "usability testing",
            "design systems",
            "heuristic evaluation",
            "component libraries",
            "design tokens",
        ],
    ),
    (
        "frontend",
        &[
            "react",
            "next.js",
            "typescript",
            "javascript",
            "html",
            "css",
            "tailwind",
            "jest",
            "playwright",
            "redux",
        ],
    ),
    (
        "data",
        &[
            "sql", "python", "pandas", "numpy", "power bi", "tableau", "dashboards", "etl",
        ],
    ),
    (
        "ml",
        &[
            "python",
            "pytorch",
            "tensorflow",
            "ml pipelines",
            "feature engineering",
            "model deployment",
            "airflow",
            "mlops",
        ],
    ),
    (
        "backend",
        &[
            "java",
            "node",
            "microservices",
            "distributed systems",
            "kafka",
            "docker",
            "kubernetes",
            "postgres",
        ],
    ),
    (
        "devops",
        &[
            "ci/cd",
            "docker",
            "kubernetes",
            "terraform",
            "ansible",
            "aws",
            "gcp",
            "azure",
            "monitoring",
        ],
    ),
];

/// Skills recognized regardless of bucket.
const GENERIC_SKILLS: &[&str] = &[
    "excel",
    "sql",
    "python",
    "react",
    "figma",
    "docker",
    "kubernetes",
    "gcp",
    "aws",
    "azure",
    "pandas",
    "power bi",
    "adobe xd",
    "tableau",
    "typescript",
    "next.js",
    "wireframes",
    "prototyping",
    "user research",
    "usability testing",
    "design systems",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub skills: Vec<String>,
    pub years_exp: f64,
}

pub fn bucket_skills(bucket: &str) -> &'static [&'static str] {
    ROLE_SKILLS
        .iter()
        .find(|(name, _)| *name == bucket)
        .map(|(_, skills)| *skills)
        .unwrap_or(&[])
}

/// Detects the role bucket from the role title and JD text.
pub fn detect_role_bucket(role: &str, jd: &str) -> &'static str {
    let t = format!("{role} {jd}").to_lowercase();
    let hit = |keys: &[&str]| keys.iter().any(|k| t.contains(k));

    if hit(&["ui", "ux", "designer", "design"]) {
        return "uiux";
    }
    if hit(&["frontend", "react", "next"]) {
        return "frontend";
    }
    if hit(&["data analyst", "analytics", "bi"]) {
        return "data";
    }
    if hit(&["ml", "machine learning", "ai"]) {
        return "ml";
    }
    if hit(&["backend", "distributed", "microservices"]) {
        return "backend";
    }
    if hit(&["devops", "sre", "platform"]) {
        return "devops";
    }
    "frontend"
}

fn years_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*\+?\s*years?").expect("valid years pattern"))
}

/// Parses skills and years of experience out of resume text.
/// Years = the largest `N years` mention; skills = dictionary hits,
/// case-insensitive substring, sorted and deduplicated.
pub fn parse_resume_text(text: &str) -> ParsedResume {
    let low = text.to_lowercase();

    let mut years: f64 = 0.0;
    for capture in years_pattern().captures_iter(&low) {
        if let Ok(n) = capture[1].parse::<f64>() {
            years = years.max(n);
        }
    }

    let mut dictionary: BTreeSet<&str> = GENERIC_SKILLS.iter().copied().collect();
    for (_, skills) in ROLE_SKILLS {
        dictionary.extend(skills.iter().copied());
    }

    let skills: Vec<String> = dictionary
        .into_iter()
        .filter(|skill| low.contains(skill))
        .map(str::to_string)
        .collect();

    ParsedResume {
        skills,
        years_exp: years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_takes_the_maximum_mention() {
        let parsed = parse_resume_text("2 years at Acme, then 5+ years leading teams");
        assert_eq!(parsed.years_exp, 5.0);
    }

    #[test]
    fn test_years_absent_is_zero() {
        let parsed = parse_resume_text("fresh graduate, eager to learn");
        assert_eq!(parsed.years_exp, 0.0);
    }

    #[test]
    fn test_skills_are_sorted_and_deduplicated() {
        let parsed = parse_resume_text("Python and SQL and python again, plus Figma");
        assert_eq!(parsed.skills, vec!["figma", "python", "sql"]);
    }

    #[test]
    fn test_multiword_skills_match() {
        let parsed = parse_resume_text("ran usability testing and built design systems");
        assert!(parsed.skills.contains(&"usability testing".to_string()));
        assert!(parsed.skills.contains(&"design systems".to_string()));
    }

    #[test]
    fn test_bucket_detection_precedence() {
        assert_eq!(detect_role_bucket("UI/UX Designer", "make things pretty"), "uiux");
        assert_eq!(detect_role_bucket("Engineer", "heavy React work"), "frontend");
        assert_eq!(
            detect_role_bucket("Engineer", "terraform the devops pipeline"),
            "devops"
        );
    }

    #[test]
    fn test_bucket_detection_falls_back_to_frontend() {
        assert_eq!(detect_role_bucket("Writer", "crafting prose"), "frontend");
    }

    #[test]
    fn test_bucket_skills_lookup() {
        assert!(bucket_skills("ml").contains(&"pytorch"));
        assert!(bucket_skills("nonexistent").is_empty());
    }
}
