//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};
use tumble_contact::TickOutcome;
use tumble_telemetry::EventKind;

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    pub bodies: usize,
    /// Ticks executed.
    pub ticks: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per tick, all bodies (seconds).
    pub avg_tick_time: f64,
    pub min_tick_time: f64,
    pub max_tick_time: f64,
    /// Average sub-steps per body tick.
    pub avg_substeps: f64,
    /// Most cancellation passes any call needed.
    pub max_cancel_passes: u32,
    /// Bounce effects emitted.
    pub bounces: u32,
    /// Sphere-sphere contacts reported.
    pub body_collisions: u32,
    /// Body ticks cut short by a sub-step cap.
    pub capped_ticks: u32,
    /// Geometry queries issued.
    pub queries: u64,
    /// Kinetic energy summed over bodies at the end.
    pub final_kinetic_energy: f64,
    /// Highest end-of-tick speed of any body.
    pub max_speed: f64,
    /// Lowest end-of-tick center height of any body.
    pub min_height: f64,
}

impl BenchmarkMetrics {
    /// Folds one body tick into the counters.
    pub fn record(&mut self, outcome: &TickOutcome) {
        self.avg_substeps += f64::from(outcome.substeps);
        self.max_cancel_passes = self.max_cancel_passes.max(outcome.max_cancel_passes);
        if outcome.truncated() {
            self.capped_ticks += 1;
        }
        for event in &outcome.events {
            match event.kind {
                EventKind::Bounce { .. } => self.bounces += 1,
                EventKind::BodyCollision { .. } => self.body_collisions += 1,
                _ => {}
            }
        }
    }

    /// CSV header line.
    pub fn to_csv_header() -> String {
        "scenario,bodies,ticks,total_wall_time_s,avg_tick_ms,min_tick_ms,max_tick_ms,avg_substeps,max_cancel_passes,bounces,body_collisions,capped_ticks,queries,final_ke,max_speed,min_height".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{:.6},{:.4},{:.4},{:.4},{:.2},{},{},{},{},{},{:.6e},{:.4},{:.4}",
            self.scenario,
            self.bodies,
            self.ticks,
            self.total_wall_time,
            self.avg_tick_time * 1000.0,
            self.min_tick_time * 1000.0,
            self.max_tick_time * 1000.0,
            self.avg_substeps,
            self.max_cancel_passes,
            self.bounces,
            self.body_collisions,
            self.capped_ticks,
            self.queries,
            self.final_kinetic_energy,
            self.max_speed,
            self.min_height,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
