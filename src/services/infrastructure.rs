//! Pad infrastructure readiness gates.

use chrono::NaiveDateTime;

use crate::core::Well;

/// When the surface infrastructure for a well is ready for a crew.
pub trait Infrastructure: Send + Sync {
    /// Earliest date work may start, or `None` when there is no gate.
    fn ready_date(&self, well: &Well) -> Option<NaiveDateTime>;
}

/// Takes the readiness date straight from the inventory record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleInfrastructure;

impl Infrastructure for SimpleInfrastructure {
    fn ready_date(&self, well: &Well) -> Option<NaiveDateTime> {
        well.readiness_date.and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::well::test_support::well;
    use chrono::NaiveDate;

    #[test]
    fn readiness_date_is_passed_through() {
        let mut w = well("W-1", "K-1", "ГС");
        assert_eq!(SimpleInfrastructure.ready_date(&w), None);

        w.readiness_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert_eq!(
            SimpleInfrastructure.ready_date(&w),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
    }
}
