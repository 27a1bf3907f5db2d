//! Planning services: economics, production, crews, risk and constraints.

pub mod constraint;
pub mod cost;
pub mod infrastructure;
pub mod movement;
pub mod production;
pub mod risk;
pub mod teams;

pub use constraint::{
    applicable_bound, CapexConstraint, Constraint, ConstraintBound, ConstraintManager,
    OilConstraint,
};
pub use cost::{BaseCapex, BaseOpex, CapitalCost, CostError, CostFunction, Npv, OperationalCost};
pub use infrastructure::{Infrastructure, SimpleInfrastructure};
pub use movement::{Coordinate, DistanceMovement, Movement, SimpleMovement};
pub use production::{ArpsDeclineProfile, FileProfile, LinearProfile, ProductionProfile};
pub use risk::{ClusterRandomRisk, RiskStrategy};
pub use teams::{TeamError, TeamManager, YearlyLimits};
