//! Geological risk strategies.
//!
//! A risk strategy may degrade the expected production of candidate wells.
//! `define_risk` is called when a well is committed to the plan and may
//! update internal risk state; `apply_risk` projects the current state
//! onto a candidate.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{meta, WellPlanContext};

pub trait RiskStrategy: Send {
    /// Degrade a candidate's profile according to the current risk state.
    fn apply_risk(&self, context: &mut WellPlanContext);

    /// Update risk state after a well is committed, and apply it.
    fn define_risk(&mut self, context: &mut WellPlanContext);
}

/// Random cluster-wide production degradation.
///
/// Each committed well triggers, with `trigger_chance`, an additional
/// `impact` reduction for every later well on the same pad, accumulating
/// up to a full write-off.
pub struct ClusterRandomRisk {
    trigger_chance: f64,
    impact: f64,
    affected_clusters: HashMap<String, f64>,
    rng: StdRng,
}

impl ClusterRandomRisk {
    pub fn new(trigger_chance: f64, impact: f64) -> Self {
        Self::with_rng(trigger_chance, impact, StdRng::from_entropy())
    }

    pub fn with_rng(trigger_chance: f64, impact: f64, rng: StdRng) -> Self {
        Self {
            trigger_chance,
            impact,
            affected_clusters: HashMap::new(),
            rng,
        }
    }

    /// Current reduction for a cluster, 0.0 when unaffected.
    pub fn cluster_reduction(&self, cluster: &str) -> f64 {
        self.affected_clusters.get(cluster).copied().unwrap_or(0.0)
    }
}

impl RiskStrategy for ClusterRandomRisk {
    fn apply_risk(&self, context: &mut WellPlanContext) {
        if let Some(reduction) = self.affected_clusters.get(&context.well.cluster) {
            for oil in &mut context.oil_profile {
                *oil *= 1.0 - reduction;
            }
            context
                .metadata
                .insert(meta::APPLIED_RISK.to_string(), *reduction);
        }
    }

    fn define_risk(&mut self, context: &mut WellPlanContext) {
        if self.rng.gen::<f64>() < self.trigger_chance {
            let current = self
                .affected_clusters
                .entry(context.well.cluster.clone())
                .or_insert(0.0);
            let remaining = 1.0 - *current;
            if remaining > 0.0 {
                *current = (*current + self.impact.min(remaining)).min(1.0);
            }
            self.apply_risk(context);
        }
    }
}
