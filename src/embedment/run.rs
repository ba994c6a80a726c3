//! Full embedment run for a project: vertical table, horizontal table,
//! apportionment and summary
//!
//! Positions are independent and are evaluated in parallel. A failure in
//! one position or layer is recorded in its row; only invalid global input
//! stops the run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::config::{ConfigError, SolverConfig};
use crate::embedment::apportionment::*;
use crate::embedment::horizontal::*;
use crate::embedment::summary::*;
use crate::physics::shaft_friction::{single_layer_table, VerticalError, VerticalTable};
use crate::soil::{DesignFactors, LoadCase, PileGeometry, SoilLayer, WallFriction};
use crate::trace::Protocol;
use crate::types::*;

/// Everything one run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedmentRequest {
    pub layers: Vec<SoilLayer>,
    /// Characteristic loads, one per support position
    pub loads: Vec<LoadCase>,
    pub factors: DesignFactors,
    pub pile: PileGeometry,
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedmentError {
    #[error("Pile {field} = {value} must be finite and > 0")]
    InvalidGeometry { field: &'static str, value: DisplayLength },

    #[error("Design factor {name} = {value} must be finite and > 0")]
    InvalidFactor { name: &'static str, value: f64 },

    #[error("Wall friction angle δ = {value} must be finite")]
    InvalidWallFriction { value: DisplayAngle },

    #[error("No soil layers given")]
    NoLayers,

    #[error("No load positions given")]
    NoLoads,

    #[error("Solver settings: {0}")]
    Config(#[from] ConfigError),

    #[error("Vertical table: {0}")]
    Vertical(#[from] VerticalError),
}

/// Results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedmentReport {
    pub horizontal: Vec<HorizontalRow>,
    pub vertical: VerticalTable,
    pub apportionments: Vec<ApportionmentResult>,
    pub summaries: Vec<PositionSummary>,
    pub envelopes: Vec<SupportEnvelope>,
    pub protocol: Protocol,
}

fn validate_request(request: &EmbedmentRequest) -> Result<(), EmbedmentError> {
    if request.layers.is_empty() {
        return Err(EmbedmentError::NoLayers);
    }
    if request.loads.is_empty() {
        return Err(EmbedmentError::NoLoads);
    }
    for (field, length) in [("width b", request.pile.width), ("perimeter U", request.pile.perimeter)] {
        let value = length.get::<meter>();
        if !(value.is_finite() && value > 0.0) {
            return Err(EmbedmentError::InvalidGeometry {
                field,
                value: DisplayLength(length),
            });
        }
    }
    if let Some((name, value)) = request.factors.first_invalid() {
        return Err(EmbedmentError::InvalidFactor { name, value });
    }
    if let WallFriction::Fixed(delta) = request.factors.wall_friction {
        if !delta.get::<degree>().is_finite() {
            return Err(EmbedmentError::InvalidWallFriction {
                value: DisplayAngle(delta),
            });
        }
    }
    Ok(())
}

/// Per-position work: horizontal rows for every layer, then apportionment
fn evaluate_position(
    load: &LoadCase,
    request: &EmbedmentRequest,
    vertical: &VerticalTable,
    config: &SolverConfig,
) -> (Vec<HorizontalRow>, ApportionmentResult) {
    let rows: Vec<HorizontalRow> = request
        .layers
        .iter()
        .enumerate()
        .map(|(index, layer)| solve_for_layer(layer, index, load, &request.factors, &request.pile, config))
        .collect();

    let demands = governing_depths(&request.layers, &load.position, &rows, vertical);
    let block = apportion(load, &request.layers, &demands, config.apportionment_tolerance);
    (rows, block)
}

fn apportionment_lines(protocol: &mut Protocol, block: &ApportionmentResult) {
    protocol.line(format!("Position {} ({}, {} zone)", block.position, block.support, block.zone));
    for row in &block.rows {
        let share = row
            .share_pct
            .map_or_else(|| "—".to_string(), |p| format_decimal_de(p, 1));
        protocol.line(format!(
            "  {} – {}: d = {} m | L = {} m | share = {} % | rest = {} % | used = {} m",
            row.layer_index + 1,
            row.layer,
            format_decimal_de(row.thickness_m, 2),
            format_decimal_de(row.governing_depth_m, 2),
            share,
            format_decimal_de(row.remaining_pct, 1),
            format_decimal_de(row.depth_used_m, 2),
        ));
    }
    protocol.line(format!(
        "  Required embedment depth = {} m{}",
        format_decimal_de(block.total_depth_m, 2),
        if block.is_under_satisfied() {
            " (profile too thin, demand not covered)"
        } else if block.has_failed_mechanism() {
            " (incomplete, horizontal check failed in a layer used)"
        } else {
            ""
        }
    ));
    protocol.blank();
}

/// Run all checks for a project
pub fn run(request: &EmbedmentRequest, config: &SolverConfig) -> Result<EmbedmentReport, EmbedmentError> {
    config.validate()?;
    validate_request(request)?;

    let vertical_traced = single_layer_table(&request.layers, &request.loads, &request.factors, &request.pile);
    let mut protocol = Protocol::new();
    protocol.extend(vertical_traced.protocol);
    let vertical = vertical_traced.outcome?;

    let per_position: Vec<(Vec<HorizontalRow>, ApportionmentResult)> = request
        .loads
        .par_iter()
        .map(|load| evaluate_position(load, request, &vertical, config))
        .collect();

    protocol.blank();
    protocol.heading("Horizontal loads (Vogt 1988), per load position × per layer");
    protocol.blank();
    let mut horizontal = Vec::with_capacity(request.loads.len() * request.layers.len());
    let mut apportionments = Vec::with_capacity(request.loads.len());
    for (rows, block) in per_position {
        for row in &rows {
            protocol.extend_indented(&row.protocol, "  ");
            protocol.blank();
        }
        horizontal.extend(rows);
        apportionments.push(block);
    }

    protocol.heading("Apportionment across the layer profile");
    protocol.blank();
    for block in &apportionments {
        apportionment_lines(&mut protocol, block);
    }

    let summaries = summarize(&apportionments, config.recommended_allowance_m);
    let envelopes = envelope_by_support(&summaries);

    let failed = horizontal.iter().filter(|row| row.is_failed()).count();
    let under = apportionments.iter().filter(|b| b.is_under_satisfied()).count();
    tracing::info!(
        positions = request.loads.len(),
        layers = request.layers.len(),
        failed_horizontal = failed,
        under_satisfied = under,
        "embedment run complete"
    );

    Ok(EmbedmentReport {
        horizontal,
        vertical,
        apportionments,
        summaries,
        envelopes,
        protocol,
    })
}

impl EmbedmentReport {
    pub fn summary_for(&self, position: &str) -> Option<&PositionSummary> {
        self.summaries.iter().find(|s| s.position == position)
    }

    pub fn apportionment_for(&self, position: &str) -> Option<&ApportionmentResult> {
        self.apportionments.iter().find(|b| b.position == position)
    }

    /// Positions whose profile is too thin
    pub fn under_satisfied(&self) -> impl Iterator<Item = &PositionSummary> {
        self.summaries
            .iter()
            .filter(|s| s.status == DepthStatus::UnderSatisfied)
    }

    /// Positions whose depth leans on a layer without horizontal result
    pub fn incomplete(&self) -> impl Iterator<Item = &PositionSummary> {
        self.summaries.iter().filter(|s| s.status == DepthStatus::Incomplete)
    }

    /// Human-readable summary table
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "EMBEDMENT DEPTH SUMMARY");
        let _ = writeln!(out, "{}", "─".repeat(72));
        let _ = writeln!(
            out,
            "{:<16} {:<14} {:<7} {:>10} {:>12}  {}",
            "Position", "Support", "Zone", "L req [m]", "L rec [m]", "Status"
        );
        for s in &self.summaries {
            let _ = writeln!(
                out,
                "{:<16} {:<14} {:<7} {:>10} {:>12}  {}",
                s.position,
                s.support.to_string(),
                s.zone.to_string(),
                format_decimal_de(s.required_depth_m, 2),
                format_decimal_de(s.recommended_depth_m, 2),
                s.status
            );
        }
        if !self.envelopes.is_empty() {
            let _ = writeln!(out, "{}", "─".repeat(72));
            for e in &self.envelopes {
                let _ = writeln!(
                    out,
                    "{}: deepest {} at {} m (worst zone {}){}{}",
                    e.support,
                    e.position,
                    format_decimal_de(e.required_depth_m, 2),
                    e.worst_zone,
                    if e.any_under_satisfied { ", profile too thin somewhere" } else { "" },
                    if e.any_incomplete { ", horizontal check missing somewhere" } else { "" }
                );
            }
        }

        let failures: Vec<&HorizontalRow> = self.horizontal.iter().filter(|r| r.is_failed()).collect();
        if !failures.is_empty() {
            let _ = writeln!(out, "\nHorizontal checks without result:");
            for row in failures {
                if let Some(e) = row.error() {
                    let _ = writeln!(out, "  • {} / {}: {}", row.position, row.layer, e);
                }
            }
        }
        out
    }
}
