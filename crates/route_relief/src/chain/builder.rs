//! Conversion of a directions response into [`Chain`]s.
//!
//! Every leg of every route yields at most one chain: the decoded points of its kept
//! steps, concatenated in order. Elapsed duration accumulates over the kept steps of a
//! route and is spread linearly across each step's points by point index.
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::Chain;
use crate::directions::polyline;
use crate::directions::response::{DirectionsResponse, Leg, Step};
use crate::error::Result;

/// Approximately one mile, in the provider's distance unit (metres).
pub const ARRIVAL_MAX_DISTANCE: f64 = 1609.0;
/// Arrival steps are shorter than two minutes, in the provider's duration unit (seconds).
pub const ARRIVAL_MAX_DURATION: f64 = 120.0;
/// Leading steps of a leg that arrival trimming never removes.
pub const ARRIVAL_PROTECTED_STEPS: usize = 5;

/// Options controlling which steps become chain points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainOptions {
    /// Travel-mode tags whose steps are kept.
    pub travel_modes: Vec<String>,
    /// Drop short trailing "arrival" steps of each leg.
    pub trim_arrival: bool,
    pub arrival_max_duration: f64,
    pub arrival_max_distance: f64,
    pub arrival_protected_steps: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            travel_modes: vec!["DRIVING".to_string()],
            trim_arrival: false,
            arrival_max_duration: ARRIVAL_MAX_DURATION,
            arrival_max_distance: ARRIVAL_MAX_DISTANCE,
            arrival_protected_steps: ARRIVAL_PROTECTED_STEPS,
        }
    }
}

impl ChainOptions {
    pub fn with_travel_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.travel_modes = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trim_arrival(mut self, trim_arrival: bool) -> Self {
        self.trim_arrival = trim_arrival;
        self
    }

    fn keeps(&self, step: &Step) -> bool {
        self.travel_modes.iter().any(|m| *m == step.travel_mode)
    }

    fn is_arrival(&self, step: &Step) -> bool {
        step.duration.value < self.arrival_max_duration
            && step.distance.value < self.arrival_max_distance
    }
}

/// Builds chains from directions responses.
#[derive(Clone, Debug, Default)]
pub struct ChainBuilder {
    options: ChainOptions,
}

impl ChainBuilder {
    pub fn new(options: ChainOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    /// Number of leading steps of `leg` that survive arrival trimming.
    pub fn trimmed_len(&self, leg: &Leg) -> usize {
        let mut end = leg.steps.len();
        if !self.options.trim_arrival {
            return end;
        }
        while end > self.options.arrival_protected_steps
            && self.options.is_arrival(&leg.steps[end - 1])
        {
            end -= 1;
        }
        end
    }

    /// Convert every route leg into a chain. Legs without kept points are dropped.
    pub fn build(&self, response: &DirectionsResponse) -> Result<Vec<Chain>> {
        let mut chains = Vec::new();

        for route in &response.routes {
            let mut elapsed = 0.0;
            for (leg_index, leg) in route.legs.iter().enumerate() {
                let end = self.trimmed_len(leg);
                if end < leg.steps.len() {
                    debug!(
                        "Trimmed {} arrival steps from leg {} of route '{}'.",
                        leg.steps.len() - end,
                        leg_index,
                        route.summary
                    );
                }

                let mut points: Vec<DVec3> = Vec::new();
                for step in leg.steps[..end].iter().filter(|s| self.options.keeps(s)) {
                    let decoded = polyline::decode(&step.polyline.points)?;
                    let per_point = if decoded.len() > 1 {
                        step.duration.value / (decoded.len() - 1) as f64
                    } else {
                        0.0
                    };
                    for (i, p) in decoded.iter().enumerate() {
                        let point = DVec3::new(p.lng, p.lat, elapsed + per_point * i as f64);
                        if points.last() != Some(&point) {
                            points.push(point);
                        }
                    }
                    elapsed += step.duration.value;
                }

                if points.is_empty() {
                    debug!(
                        "Dropping leg {} of route '{}': no kept points.",
                        leg_index, route.summary
                    );
                    continue;
                }
                chains.push(Chain::new(points)?);
            }
        }

        Ok(chains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::response::{EncodedPolyline, Route, TextValue};

    // Encodes (38.5, -120.2), (40.7, -120.95), (43.252, -126.453).
    const THREE_POINTS: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";
    // Encodes (43.252, -126.453), (44.0, -127.0).
    const CONTINUATION: &str = "_t~fGfzxbW_bqCvyiB";

    fn step(mode: &str, duration: f64, distance: f64, points: &str) -> Step {
        Step {
            travel_mode: mode.into(),
            duration: TextValue {
                value: duration,
                text: String::new(),
            },
            distance: TextValue {
                value: distance,
                text: String::new(),
            },
            polyline: EncodedPolyline {
                points: points.into(),
            },
            ..Default::default()
        }
    }

    fn response(legs: Vec<Vec<Step>>) -> DirectionsResponse {
        DirectionsResponse {
            status: "OK".into(),
            error_message: None,
            routes: vec![Route {
                summary: "test".into(),
                legs: legs
                    .into_iter()
                    .map(|steps| Leg {
                        steps,
                        ..Default::default()
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn interpolates_duration_by_point_index() {
        let chains = ChainBuilder::default()
            .build(&response(vec![vec![step("DRIVING", 100.0, 5000.0, THREE_POINTS)]]))
            .unwrap();
        assert_eq!(chains.len(), 1);
        let pts = chains[0].points();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[0].z, 0.0);
        assert_eq!(pts[1].z, 50.0);
        assert_eq!(pts[2].z, 100.0);
        // x is longitude, y is latitude.
        assert!((pts[0].x - -120.2).abs() < 1e-9);
        assert!((pts[0].y - 38.5).abs() < 1e-9);
    }

    #[test]
    fn concatenates_steps_and_merges_shared_endpoints() {
        let chains = ChainBuilder::default()
            .build(&response(vec![vec![
                step("DRIVING", 100.0, 5000.0, THREE_POINTS),
                step("DRIVING", 30.0, 2000.0, CONTINUATION),
            ]]))
            .unwrap();
        let pts = chains[0].points();
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[2].z, 100.0);
        assert_eq!(pts[3].z, 130.0);
    }

    #[test]
    fn non_vehicular_steps_add_neither_points_nor_time() {
        let chains = ChainBuilder::default()
            .build(&response(vec![vec![
                step("WALKING", 500.0, 300.0, THREE_POINTS),
                step("DRIVING", 30.0, 2000.0, CONTINUATION),
            ]]))
            .unwrap();
        let pts = chains[0].points();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].z, 0.0);
        assert_eq!(pts[1].z, 30.0);
    }

    #[test]
    fn legs_without_points_are_dropped_and_time_carries_across_legs() {
        let chains = ChainBuilder::default()
            .build(&response(vec![
                vec![step("DRIVING", 100.0, 5000.0, THREE_POINTS)],
                vec![step("TRANSIT", 10.0, 10.0, CONTINUATION)],
                vec![step("DRIVING", 30.0, 2000.0, CONTINUATION)],
            ]))
            .unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[1].first().z, 100.0);
        assert_eq!(chains[1].last().z, 130.0);
    }

    #[test]
    fn configurable_travel_modes() {
        let builder = ChainBuilder::new(ChainOptions::default().with_travel_modes(["BICYCLING"]));
        let chains = builder
            .build(&response(vec![vec![
                step("DRIVING", 100.0, 5000.0, THREE_POINTS),
                step("BICYCLING", 30.0, 2000.0, CONTINUATION),
            ]]))
            .unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 2);
    }

    #[test]
    fn arrival_trim_only_removes_short_tail_after_protected_steps() {
        let builder = ChainBuilder::new(ChainOptions::default().with_trim_arrival(true));
        let mut steps: Vec<Step> = (0..5)
            .map(|_| step("DRIVING", 10.0, 10.0, THREE_POINTS))
            .collect();
        steps.push(step("DRIVING", 600.0, 9000.0, THREE_POINTS));
        steps.push(step("DRIVING", 60.0, 100.0, THREE_POINTS));
        steps.push(step("DRIVING", 30.0, 50.0, THREE_POINTS));
        let leg = Leg {
            steps,
            ..Default::default()
        };
        // The long sixth step stops the trim; the short protected steps stay.
        assert_eq!(builder.trimmed_len(&leg), 6);

        let short_only = Leg {
            steps: (0..7)
                .map(|_| step("DRIVING", 10.0, 10.0, THREE_POINTS))
                .collect(),
            ..Default::default()
        };
        assert_eq!(builder.trimmed_len(&short_only), ARRIVAL_PROTECTED_STEPS);
        assert_eq!(ChainBuilder::default().trimmed_len(&short_only), 7);
    }

    #[test]
    fn malformed_polyline_fails_the_response() {
        let err = ChainBuilder::default()
            .build(&response(vec![vec![step("DRIVING", 10.0, 10.0, "_p~iF")]]))
            .unwrap_err();
        assert!(err.is_query_failure());
    }

    #[test]
    fn single_point_step_keeps_elapsed_time() {
        // Encodes the single point (38.5, -120.2).
        let chains = ChainBuilder::default()
            .build(&response(vec![vec![
                step("DRIVING", 40.0, 100.0, "_p~iF~ps|U"),
                step("DRIVING", 100.0, 5000.0, THREE_POINTS),
            ]]))
            .unwrap();
        let pts = chains[0].points();
        assert_eq!(pts[0].z, 0.0);
        assert_eq!(pts[1].z, 40.0);
        assert_eq!(pts.len(), 4);
    }
}
