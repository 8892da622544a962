//! Data models for Lighthouse reports.
//!
//! Only the parts of a Lighthouse result (LHR) this tool reads are typed.
//! The full document is kept as raw JSON so it can be forwarded untouched.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A Lighthouse category compared between builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
    Pwa,
}

impl Category {
    /// All compared categories, in table order.
    pub const ALL: [Category; 5] = [
        Category::Performance,
        Category::Accessibility,
        Category::BestPractices,
        Category::Seo,
        Category::Pwa,
    ];

    /// The category id used as key in `categories` of an LHR.
    pub fn id(&self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Accessibility => "accessibility",
            Category::BestPractices => "best-practices",
            Category::Seo => "seo",
            Category::Pwa => "pwa",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Performance => write!(f, "Performance"),
            Category::Accessibility => write!(f, "Accessibility"),
            Category::BestPractices => write!(f, "Best Practices"),
            Category::Seo => write!(f, "SEO"),
            Category::Pwa => write!(f, "PWA"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CategoryResult {
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AuditResult {
    #[serde(default, rename = "numericValue")]
    numeric_value: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReportFields {
    #[serde(default, rename = "finalUrl")]
    final_url: Option<String>,
    #[serde(default, rename = "finalDisplayedUrl")]
    final_displayed_url: Option<String>,
    #[serde(default)]
    categories: HashMap<String, CategoryResult>,
    #[serde(default)]
    audits: HashMap<String, AuditResult>,
}

/// A single Lighthouse run.
#[derive(Debug, Clone)]
pub struct LighthouseReport {
    /// URL the run ended on, used to group runs of the same page.
    pub final_url: String,
    categories: HashMap<String, CategoryResult>,
    audits: HashMap<String, AuditResult>,
    raw: Value,
}

impl LighthouseReport {
    /// Build a report from an LHR JSON document.
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let fields = ReportFields::deserialize(&raw)?;
        let final_url = fields
            .final_url
            .or(fields.final_displayed_url)
            .unwrap_or_default();

        Ok(Self {
            final_url,
            categories: fields.categories,
            audits: fields.audits,
            raw,
        })
    }

    /// The untouched LHR document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Category score on the 0-100 scale Lighthouse displays.
    pub fn score(&self, category: Category) -> Option<f64> {
        self.categories
            .get(category.id())
            .and_then(|c| c.score)
            .filter(|s| s.is_finite())
            .map(|s| (s * 100.0).round())
    }

    /// Numeric value of an audit, if present and finite.
    pub fn numeric_value(&self, audit: &str) -> Option<f64> {
        self.audits
            .get(audit)
            .and_then(|a| a.numeric_value)
            .filter(|v| v.is_finite())
    }

    /// Short one-line description for logs and dry runs.
    pub fn summary(&self) -> String {
        let scores: Vec<String> = Category::ALL
            .iter()
            .map(|c| match self.score(*c) {
                Some(s) => format!("{}={}", c.id(), s),
                None => format!("{}=-", c.id()),
            })
            .collect();
        format!("{} [{}]", self.final_url, scores.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_titles() {
        assert_eq!(Category::BestPractices.to_string(), "Best Practices");
        assert_eq!(Category::BestPractices.id(), "best-practices");
        assert_eq!(Category::Seo.to_string(), "SEO");
    }

    #[test]
    fn test_scores_are_scaled_and_rounded() {
        let report = LighthouseReport::from_value(json!({
            "finalUrl": "https://example.com/",
            "categories": {
                "performance": { "score": 0.57 },
                "seo": { "score": null }
            }
        }))
        .unwrap();

        assert_eq!(report.score(Category::Performance), Some(57.0));
        assert_eq!(report.score(Category::Seo), None);
        assert_eq!(report.score(Category::Pwa), None);
    }

    #[test]
    fn test_final_displayed_url_fallback() {
        let report = LighthouseReport::from_value(json!({
            "finalDisplayedUrl": "https://example.com/a"
        }))
        .unwrap();
        assert_eq!(report.final_url, "https://example.com/a");
    }

    #[test]
    fn test_numeric_value() {
        let report = LighthouseReport::from_value(json!({
            "finalUrl": "https://example.com/",
            "audits": {
                "interactive": { "numericValue": 1234.5 },
                "first-contentful-paint": {}
            }
        }))
        .unwrap();

        assert_eq!(report.numeric_value("interactive"), Some(1234.5));
        assert_eq!(report.numeric_value("first-contentful-paint"), None);
        assert_eq!(report.numeric_value("speed-index"), None);
    }

    #[test]
    fn test_parse_saved_run_fixture() {
        let raw: Value =
            serde_json::from_str(include_str!("../fixtures/lhr-1700000000000.json")).unwrap();
        let report = LighthouseReport::from_value(raw).unwrap();

        assert_eq!(report.final_url, "https://example.com/");
        assert_eq!(report.score(Category::BestPractices), Some(100.0));
        assert_eq!(report.score(Category::Pwa), Some(30.0));
        assert_eq!(report.numeric_value("first-contentful-paint"), Some(912.4));
        assert_eq!(
            report.summary(),
            "https://example.com/ [performance=93, accessibility=87, best-practices=100, seo=91, pwa=30]"
        );
    }

    #[test]
    fn test_raw_is_preserved() {
        let doc = json!({ "finalUrl": "https://example.com/", "lighthouseVersion": "11.0.0" });
        let report = LighthouseReport::from_value(doc.clone()).unwrap();
        assert_eq!(report.raw(), &doc);
    }
}
