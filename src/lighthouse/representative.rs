//! Representative run selection.
//!
//! Lighthouse CI usually collects several runs per URL. The run whose
//! first-contentful-paint and time-to-interactive sit closest to the medians
//! of all runs for that URL stands in for the URL.

use crate::models::LighthouseReport;
use tracing::{debug, info};

const FCP_AUDIT: &str = "first-contentful-paint";
const TTI_AUDIT: &str = "interactive";

/// Group runs by their final URL, keeping first-seen order.
pub fn group_by_url(reports: Vec<LighthouseReport>) -> Vec<Vec<LighthouseReport>> {
    let mut groups: Vec<Vec<LighthouseReport>> = Vec::new();

    for report in reports {
        match groups
            .iter_mut()
            .find(|g| g[0].final_url == report.final_url)
        {
            Some(group) => group.push(report),
            None => groups.push(vec![report]),
        }
    }

    groups
}

/// Median of a non-empty slice; the mean of the middle pair for even lengths.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Pick the run closest to the median FCP and TTI of `runs`.
///
/// Runs without both metrics are ignored; if none has them the first run
/// is returned. Equally distant runs are ordered by the lower TTI, then
/// by input order.
pub fn compute_median_run(runs: &[LighthouseReport]) -> Option<&LighthouseReport> {
    let first = runs.first()?;

    let valid: Vec<(&LighthouseReport, f64, f64)> = runs
        .iter()
        .filter_map(|r| Some((r, r.numeric_value(FCP_AUDIT)?, r.numeric_value(TTI_AUDIT)?)))
        .collect();

    match valid.len() {
        0 => {
            debug!("No run of {} has FCP and TTI, using the first run", first.final_url);
            return Some(first);
        }
        1 => return Some(valid[0].0),
        _ => {}
    }

    let fcps: Vec<f64> = valid.iter().map(|(_, fcp, _)| *fcp).collect();
    let ttis: Vec<f64> = valid.iter().map(|(_, _, tti)| *tti).collect();
    let median_fcp = median(&fcps);
    let median_tti = median(&ttis);

    let distance = |fcp: f64, tti: f64| {
        let d_fcp = median_fcp - fcp;
        let d_tti = median_tti - tti;
        d_fcp * d_fcp + d_tti * d_tti
    };

    let mut best = valid[0];
    let mut best_distance = distance(best.1, best.2);
    for candidate in &valid[1..] {
        let d = distance(candidate.1, candidate.2);
        if d < best_distance || (d == best_distance && candidate.2 < best.2) {
            best = *candidate;
            best_distance = d;
        }
    }

    Some(best.0)
}

/// One representative run per non-empty group, in group order.
pub fn compute_representative_runs(groups: &[Vec<LighthouseReport>]) -> Vec<LighthouseReport> {
    groups
        .iter()
        .filter_map(|runs| compute_median_run(runs).cloned())
        .collect()
}

/// The representative run of the first audited URL.
pub fn representative_report(reports: Vec<LighthouseReport>) -> Option<LighthouseReport> {
    let total = reports.len();
    let groups = group_by_url(reports);
    info!("Loaded {} Lighthouse runs for {} URLs", total, groups.len());

    let mut representatives = compute_representative_runs(&groups).into_iter();
    let selected = representatives.next()?;

    for skipped in representatives {
        debug!("Not posting representative run of {}", skipped.final_url);
    }

    Some(selected)
}
