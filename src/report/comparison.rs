//! Markdown comparison comment.
//!
//! The comment compares the category scores of the current build with the
//! latest report of the default branch. Its first line is a hidden marker
//! so later runs can find and update the same comment.

use crate::models::{Category, LighthouseReport};
use crate::webstats::BaseReport;
use chrono::{DateTime, Utc};

/// Hidden marker the reporter's comment starts with.
pub const COMMENT_IDENTIFIER: &str = "<!---WEBSTATSREPORTERCOMMENT-->";

/// Commits and branch a comparison is made between.
#[derive(Debug, Clone)]
pub struct ComparisonTarget<'a> {
    pub current_sha: &'a str,
    pub base_sha: &'a str,
    pub default_branch: &'a str,
}

/// Render the comment for the current build and the base lookup result.
pub fn render_comment(
    current: Option<&LighthouseReport>,
    base: &BaseReport,
    target: &ComparisonTarget<'_>,
    generated_at: DateTime<Utc>,
) -> String {
    match (current, base) {
        (Some(current), BaseReport::Found(base)) => {
            let mut comment = render_comparison(current, base);
            comment.push_str(&generate_footer(target, generated_at));
            comment
        }
        _ => render_unavailable(target),
    }
}

/// Score table of `current` against `base`.
pub fn render_comparison(current: &LighthouseReport, base: &LighthouseReport) -> String {
    let mut output = String::new();

    output.push_str(COMMENT_IDENTIFIER);
    output.push('\n');
    output.push_str("| Category | Current Build | Base Build | Difference |\n");
    output.push_str("| --- | --- | --- | --- |\n");

    for category in Category::ALL {
        let current_score = current.score(category);
        let base_score = base.score(category);

        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            category,
            format_score(current_score),
            format_score(base_score),
            format_difference(current_score, base_score),
        ));
    }

    output.push('\n');
    output
}

/// Text posted when there is nothing to compare against.
pub fn render_unavailable(target: &ComparisonTarget<'_>) -> String {
    format!(
        "{}\nLighthouse comparison | Could not compare {} to {}. There is probably no report for {} on the default branch `{}`\n",
        COMMENT_IDENTIFIER,
        target.current_sha,
        target.base_sha,
        target.base_sha,
        target.default_branch,
    )
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.0}", s),
        None => "-".to_string(),
    }
}

/// Colored difference cell: green when improved, red when regressed.
pub fn format_difference(current: Option<f64>, base: Option<f64>) -> String {
    let (Some(current), Some(base)) = (current, base) else {
        return "-".to_string();
    };

    let diff = (current - base).round() as i64;
    match diff {
        d if d > 0 => format!("<span style=\"color:green;\">+{}</span>", d),
        d if d < 0 => format!("<span style=\"color:red;\">{}</span>", d),
        _ => "0".to_string(),
    }
}

fn generate_footer(target: &ComparisonTarget<'_>, generated_at: DateTime<Utc>) -> String {
    format!(
        "*Compared `{}` with `{}` (`{}`) at {}*\n",
        short_sha(target.current_sha),
        short_sha(target.base_sha),
        target.default_branch,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn report(perf: f64, a11y: f64, bp: f64, seo: f64) -> LighthouseReport {
        LighthouseReport::from_value(json!({
            "finalUrl": "https://example.com/",
            "categories": {
                "performance": { "score": perf },
                "accessibility": { "score": a11y },
                "best-practices": { "score": bp },
                "seo": { "score": seo }
            }
        }))
        .unwrap()
    }

    fn target() -> ComparisonTarget<'static> {
        ComparisonTarget {
            current_sha: "1111111aaaaaaa",
            base_sha: "2222222bbbbbbb",
            default_branch: "main",
        }
    }

    #[test]
    fn test_format_difference() {
        assert_eq!(
            format_difference(Some(95.0), Some(90.0)),
            "<span style=\"color:green;\">+5</span>"
        );
        assert_eq!(
            format_difference(Some(80.0), Some(90.0)),
            "<span style=\"color:red;\">-10</span>"
        );
        assert_eq!(format_difference(Some(90.0), Some(90.0)), "0");
        assert_eq!(format_difference(None, Some(90.0)), "-");
    }

    #[test]
    fn test_render_comparison_table() {
        let current = report(0.95, 0.9, 1.0, 0.57);
        let base = report(0.9, 0.9, 0.93, 0.6);

        let comment = render_comparison(&current, &base);

        assert!(comment.starts_with(COMMENT_IDENTIFIER));
        assert!(comment.contains("| Category | Current Build | Base Build | Difference |"));
        assert!(comment.contains("| Performance | 95 | 90 | <span style=\"color:green;\">+5</span> |"));
        assert!(comment.contains("| Accessibility | 90 | 90 | 0 |"));
        assert!(comment.contains("| Best Practices | 100 | 93 | <span style=\"color:green;\">+7</span> |"));
        assert!(comment.contains("| SEO | 57 | 60 | <span style=\"color:red;\">-3</span> |"));
        assert!(comment.contains("| PWA | - | - | - |"));

        let perf = comment.find("| Performance").unwrap();
        let pwa = comment.find("| PWA").unwrap();
        assert!(perf < pwa);
    }

    #[test]
    fn test_render_comment_with_base() {
        let current = report(0.5, 0.5, 0.5, 0.5);
        let base = BaseReport::Found(report(0.4, 0.5, 0.5, 0.5));
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        let comment = render_comment(Some(&current), &base, &target(), at);

        assert!(comment.starts_with(COMMENT_IDENTIFIER));
        assert!(comment.contains("+10"));
        assert!(comment.contains("*Compared `1111111` with `2222222` (`main`) at 2026-10-18 12:00:00 UTC*"));
    }

    #[test]
    fn test_render_comment_falls_back() {
        let current = report(0.5, 0.5, 0.5, 0.5);
        let at = Utc::now();

        for base in [BaseReport::Missing, BaseReport::Failed] {
            let comment = render_comment(Some(&current), &base, &target(), at);
            assert!(comment.starts_with(COMMENT_IDENTIFIER));
            assert!(comment.contains(
                "Could not compare 1111111aaaaaaa to 2222222bbbbbbb. There is probably no report for 2222222bbbbbbb on the default branch `main`"
            ));
        }

        let base = BaseReport::Found(report(0.5, 0.5, 0.5, 0.5));
        let comment = render_comment(None, &base, &target(), at);
        assert!(comment.contains("Could not compare"));
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("abcdef0123"), "abcdef0");
        assert_eq!(short_sha("abc"), "abc");
    }
}
