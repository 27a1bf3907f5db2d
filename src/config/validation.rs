//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for PlanConfig.
///
/// This is maintained manually to match the struct hierarchy in
/// plan_config.rs. Any new field added there must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [project]
        "project",
        "project.name",
        "project.start",
        "project.horizon_years",
        // [server]
        "server",
        "server.addr",
        // [data]
        "data",
        "data.wells_path",
        "data.profiles_dir",
        "data.export_path",
        // [economics]
        "economics",
        "economics.oil_price_per_tonne",
        "economics.oil_cost_per_tonne",
        "economics.water_cost_per_tonne",
        "economics.repair_per_year",
        "economics.maintain_per_year",
        "economics.equipment_cost",
        "economics.discount_rate",
        "economics.travel_cost_per_day",
        "economics.build_cost_per_metre",
        // [teams]
        "teams",
        "teams.groups",
        "teams.limits",
        "teams.count_colocated",
        // [movement]
        "movement",
        "movement.model",
        "movement.same_cluster_move_days",
        "movement.min_days_between_clusters",
        "movement.team_speed_kmh",
        "movement.clusters",
        // [production]
        "production",
        "production.profile",
        "production.arps_decline",
        "production.arps_b",
        // [risk]
        "risk",
        "risk.enabled",
        "risk.trigger_chance",
        "risk.impact",
        // [selection]
        "selection",
        "selection.initial_temp",
        "selection.cooling_rate",
        "selection.min_temp",
        "selection.iterations_per_temp",
        "selection.keep_order",
        "selection.cluster_ordered",
        "selection.drill_team_penalty",
        // [annealing]
        "annealing",
        "annealing.enabled",
        "annealing.initial_temp",
        "annealing.cooling_rate",
        "annealing.min_temp",
        "annealing.iterations",
        // [constraints]
        "constraints",
        "constraints.oil",
        "constraints.capex",
    ];
    keys.iter().copied().collect()
}

/// Prefixes whose children are user-chosen names (well types, years, pads),
/// not config fields. Keys under them are never "unknown".
const DYNAMIC_TABLE_PREFIXES: &[&str] = &[
    "economics.build_cost_per_metre.",
    "teams.limits.",
    "movement.clusters.",
];

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((k, dist)),
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys — it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if DYNAMIC_TABLE_PREFIXES.iter().any(|p| key.starts_with(p)) {
            continue;
        }
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            warnings.push(ValidationWarning {
                field: key.clone(),
                message: format!("Unknown config key '{key}'"),
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed PlanConfig.
///
/// Returns error strings for values that would break the planner; the
/// caller decides whether they prevent startup.
pub fn validate_physical_ranges(config: &super::PlanConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let p = &config.project;
    if p.horizon_years == 0 || p.horizon_years > 50 {
        errors.push(format!(
            "project.horizon_years = {} is outside the supported range (1-50)",
            p.horizon_years
        ));
    }

    let e = &config.economics;
    if e.oil_price_per_tonne <= 0.0 {
        errors.push(format!(
            "economics.oil_price_per_tonne = {:.1} must be > 0",
            e.oil_price_per_tonne
        ));
    }
    if !(0.0..1.0).contains(&e.discount_rate) {
        errors.push(format!(
            "economics.discount_rate = {:.3} must be in [0, 1)",
            e.discount_rate
        ));
    }
    if e.travel_cost_per_day < 0.0 {
        errors.push(format!(
            "economics.travel_cost_per_day = {:.1} cannot be negative",
            e.travel_cost_per_day
        ));
    }
    for (well_type, cost) in &e.build_cost_per_metre {
        if *cost <= 0.0 {
            errors.push(format!(
                "economics.build_cost_per_metre['{well_type}'] = {cost:.1} must be > 0"
            ));
        }
    }

    let m = &config.movement;
    if m.team_speed_kmh <= 0.0 {
        // Used as a divisor in the distance model.
        errors.push(format!(
            "movement.team_speed_kmh = {:.1} must be > 0",
            m.team_speed_kmh
        ));
    }
    if m.same_cluster_move_days < 0.0 {
        errors.push(format!(
            "movement.same_cluster_move_days = {:.1} cannot be negative",
            m.same_cluster_move_days
        ));
    }
    if m.min_days_between_clusters < 0.0 {
        errors.push(format!(
            "movement.min_days_between_clusters = {:.1} cannot be negative",
            m.min_days_between_clusters
        ));
    }

    let pr = &config.production;
    if pr.arps_decline <= 0.0 {
        errors.push(format!(
            "production.arps_decline = {:.3} must be > 0",
            pr.arps_decline
        ));
    }
    if pr.arps_b <= 0.0 {
        errors.push(format!("production.arps_b = {:.3} must be > 0", pr.arps_b));
    }

    let r = &config.risk;
    if !(0.0..=1.0).contains(&r.trigger_chance) {
        errors.push(format!(
            "risk.trigger_chance = {:.2} must be in [0, 1]",
            r.trigger_chance
        ));
    }
    if !(0.0..=1.0).contains(&r.impact) {
        errors.push(format!("risk.impact = {:.2} must be in [0, 1]", r.impact));
    }

    for (name, s) in [
        ("selection", (config.selection.initial_temp, config.selection.cooling_rate, config.selection.min_temp)),
        ("annealing", (config.annealing.initial_temp, config.annealing.cooling_rate, config.annealing.min_temp)),
    ] {
        let (initial_temp, cooling_rate, min_temp) = s;
        if initial_temp <= 0.0 || min_temp <= 0.0 {
            errors.push(format!("{name} temperatures must be > 0"));
        }
        if !(0.0..1.0).contains(&cooling_rate) {
            errors.push(format!(
                "{name}.cooling_rate = {cooling_rate:.2} must be in (0, 1) or the anneal never cools"
            ));
        }
    }

    errors
}
