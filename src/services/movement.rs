//! Crew mobilization models.
//!
//! Moving a crew between pads costs time. The simple model uses flat
//! durations; the distance model derives travel time from surveyed pad
//! coordinates.

use std::collections::HashMap;

/// Days a crew spends relocating between clusters.
pub trait Movement: Send + Sync {
    fn move_days(&self, from_cluster: Option<&str>, to_cluster: &str) -> f64;
}

/// Flat travel times: one day on the same pad, two weeks between pads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMovement;

impl Movement for SimpleMovement {
    fn move_days(&self, from_cluster: Option<&str>, to_cluster: &str) -> f64 {
        if from_cluster == Some(to_cluster) {
            1.0
        } else {
            14.0
        }
    }
}

/// Surveyed pad position, metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }
}

/// Travel time from inter-pad distance plus a fixed rig-move floor.
///
/// Unknown pads fall back to the floor alone.
#[derive(Debug, Clone)]
pub struct DistanceMovement {
    cluster_coordinates: HashMap<String, Coordinate>,
    pub min_days_between_clusters: f64,
    pub team_speed_kmh: f64,
    pub same_cluster_move_days: f64,
}

impl DistanceMovement {
    pub fn new(cluster_coordinates: HashMap<String, Coordinate>) -> Self {
        Self {
            cluster_coordinates,
            min_days_between_clusters: 90.0,
            team_speed_kmh: 15.0,
            same_cluster_move_days: 1.0,
        }
    }

    pub fn with_floor(mut self, min_days: f64) -> Self {
        self.min_days_between_clusters = min_days;
        self
    }

    pub fn with_speed(mut self, kmh: f64) -> Self {
        self.team_speed_kmh = kmh;
        self
    }

    pub fn with_same_cluster_days(mut self, days: f64) -> Self {
        self.same_cluster_move_days = days;
        self
    }
}

impl Movement for DistanceMovement {
    fn move_days(&self, from_cluster: Option<&str>, to_cluster: &str) -> f64 {
        if from_cluster == Some(to_cluster) {
            return self.same_cluster_move_days;
        }

        let Some(from) = from_cluster else {
            return self.min_days_between_clusters;
        };

        match (
            self.cluster_coordinates.get(from),
            self.cluster_coordinates.get(to_cluster),
        ) {
            (Some(a), Some(b)) => {
                let distance_m = a.distance_to(b);
                let travel_days = (distance_m / (self.team_speed_kmh * 1000.0)) / 24.0;
                self.min_days_between_clusters + travel_days
            }
            _ => self.min_days_between_clusters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_movement_distinguishes_same_pad() {
        let m = SimpleMovement;
        assert_eq!(m.move_days(Some("K-1"), "K-1"), 1.0);
        assert_eq!(m.move_days(Some("K-1"), "K-2"), 14.0);
        assert_eq!(m.move_days(None, "K-2"), 14.0);
    }

    #[test]
    fn distance_movement_adds_travel_to_floor() {
        // 360 km apart at 15 km/h: 24 h of driving = 1 extra day.
        let coords = HashMap::from([
            (
                "A".to_string(),
                Coordinate {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
            ),
            (
                "B".to_string(),
                Coordinate {
                    x: 360_000.0,
                    y: 0.0,
                    z: 0.0,
                },
            ),
        ]);
        let m = DistanceMovement::new(coords).with_floor(90.0);
        let days = m.move_days(Some("A"), "B");
        assert!((days - 91.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_pad_falls_back_to_floor() {
        let m = DistanceMovement::new(HashMap::new()).with_floor(90.0);
        assert_eq!(m.move_days(Some("A"), "B"), 90.0);
        assert_eq!(m.move_days(None, "B"), 90.0);
        assert_eq!(m.move_days(Some("B"), "B"), 1.0);
    }
}
