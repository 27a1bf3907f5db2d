//! Monthly production profile models.
//!
//! A profile fills `oil_profile` / `liq_profile` with tonnes per calendar
//! month, from the well launch up to the planning horizon. The first and
//! last months are prorated by the days actually inside the window.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::core::plan::{month_start, next_month};
use crate::core::WellPlanContext;
use crate::data::profiles::WellProfile;

/// Fill a context with its monthly production profiles.
pub trait ProductionProfile: Send + Sync {
    fn compute(&self, context: &mut WellPlanContext);
}

/// Calendar months between `start` and `end` with the number of producing
/// days in each.
fn producing_months(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, i64)> {
    let mut out = Vec::new();
    let mut current = month_start(start);
    while current <= end {
        let month_end = next_month(current) - chrono::Duration::days(1);
        let period_start = start.max(current);
        let period_end = end.min(month_end);
        let days = (period_end - period_start).num_days() + 1;
        if days > 0 {
            out.push((current, days));
        }
        current = next_month(current);
    }
    out
}

/// Constant-rate profile: nameplate rate times producing days.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearProfile;

impl ProductionProfile for LinearProfile {
    fn compute(&self, context: &mut WellPlanContext) {
        let start = context.next_available_date().date();
        let end = context.end.date();
        let well = &context.well;

        let mut oil = Vec::new();
        let mut liq = Vec::new();
        for (_, days) in producing_months(start, end) {
            oil.push(well.oil_rate * days as f64);
            liq.push(well.liq_rate * days as f64);
        }
        context.oil_profile = oil;
        context.liq_profile = liq;
    }
}

/// Hyperbolic Arps decline: `q(t) = q0 / (1 + b * D * t)^(1/b)`.
#[derive(Debug, Clone, Copy)]
pub struct ArpsDeclineProfile {
    pub decline: f64,
    pub b: f64,
}

impl Default for ArpsDeclineProfile {
    fn default() -> Self {
        Self {
            decline: 0.175,
            b: 1.548,
        }
    }
}

impl ArpsDeclineProfile {
    pub fn new(decline: f64, b: f64) -> Self {
        Self { decline, b }
    }

    fn rate_factor(&self, t_years: f64) -> f64 {
        1.0 / (1.0 + self.b * self.decline * t_years).powf(1.0 / self.b)
    }
}

impl ProductionProfile for ArpsDeclineProfile {
    fn compute(&self, context: &mut WellPlanContext) {
        let start = context.next_available_date().date();
        let end = context.end.date();
        let well = &context.well;

        let mut oil = Vec::new();
        let mut liq = Vec::new();
        for (month, days) in producing_months(start, end) {
            let t_years = (month - start).num_days() as f64 / 365.0;
            let factor = self.rate_factor(t_years);
            oil.push(well.oil_rate * factor * days as f64);
            liq.push(well.liq_rate * factor * days as f64);
        }
        context.oil_profile = oil;
        context.liq_profile = liq;
    }
}

/// Measured per-well monthly rates loaded from disk, with Arps fallback
/// for wells without a profile.
pub struct FileProfile {
    profiles: HashMap<String, WellProfile>,
    fallback: ArpsDeclineProfile,
}

impl FileProfile {
    pub fn new(profiles: HashMap<String, WellProfile>) -> Self {
        Self {
            profiles,
            fallback: ArpsDeclineProfile::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: ArpsDeclineProfile) -> Self {
        self.fallback = fallback;
        self
    }

    fn resize(rates: &[f64], len: usize) -> Vec<f64> {
        let mut out = rates.to_vec();
        out.resize(len, 0.0);
        out.truncate(len);
        out
    }
}

impl ProductionProfile for FileProfile {
    fn compute(&self, context: &mut WellPlanContext) {
        let Some(profile) = self.profiles.get(&context.well.name) else {
            debug!(well = %context.well.name, "no measured profile, using Arps decline");
            self.fallback.compute(context);
            return;
        };

        let start = context.next_available_date().date();
        let end = context.end.date();
        let n_month = ((end.year() - start.year()) * 12 + end.month() as i32
            - start.month() as i32
            + 1)
        .max(0) as usize;

        let oil_rates = Self::resize(&profile.oil, n_month);
        let liq_rates = Self::resize(&profile.liquid, n_month);

        let mut month = month_start(start);
        let mut oil = Vec::with_capacity(n_month);
        let mut liq = Vec::with_capacity(n_month);
        for i in 0..n_month {
            let days = (next_month(month) - month).num_days() as f64;
            oil.push(oil_rates[i] * days);
            liq.push(liq_rates[i] * days);
            month = next_month(month);
        }
        context.oil_profile = oil;
        context.liq_profile = liq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::well::test_support::well;
    use chrono::NaiveDateTime;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn producing_months_prorates_edges() {
        let months = producing_months(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        );
        // Jan 15-31 = 17 days, all of Feb = 28, Mar 1-10 = 10.
        assert_eq!(
            months,
            vec![
                (NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 17),
                (NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), 28),
                (NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 10),
            ]
        );
    }

    #[test]
    fn linear_profile_uses_nameplate_rate() {
        let mut ctx = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 1, 1), dt(2025, 2, 28));
        LinearProfile.compute(&mut ctx);
        assert_eq!(ctx.oil_profile, vec![100.0 * 31.0, 100.0 * 28.0]);
        assert_eq!(ctx.liq_profile, vec![150.0 * 31.0, 150.0 * 28.0]);
    }

    #[test]
    fn arps_profile_declines_monotonically() {
        let mut ctx = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 1, 1), dt(2027, 12, 31));
        ArpsDeclineProfile::default().compute(&mut ctx);
        assert_eq!(ctx.oil_profile.len(), 36);
        // Compare per-day rates to factor out month lengths.
        let first = ctx.oil_profile[1] / 28.0;
        let last = ctx.oil_profile[35] / 31.0;
        assert!(first > last);
    }

    #[test]
    fn file_profile_resizes_and_falls_back() {
        let profiles = HashMap::from([(
            "W-1".to_string(),
            WellProfile {
                oil: vec![10.0],
                liquid: vec![12.0],
            },
        )]);
        let profile = FileProfile::new(profiles);

        let mut known = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 1, 1), dt(2025, 3, 31));
        profile.compute(&mut known);
        // One measured month, zero-padded to the 3-month horizon.
        assert_eq!(known.oil_profile, vec![310.0, 0.0, 0.0]);
        assert_eq!(known.liq_profile, vec![372.0, 0.0, 0.0]);

        let mut unknown = WellPlanContext::new(well("W-2", "K-1", "ГС"), dt(2025, 1, 1), dt(2025, 3, 31));
        profile.compute(&mut unknown);
        assert_eq!(unknown.oil_profile.len(), 3);
        assert!(unknown.oil_profile[0] > 0.0);
    }
}
