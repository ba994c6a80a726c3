//! Required and recommended depth per position

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::embedment::apportionment::{ApportionmentResult, Mechanism};
use crate::soil::{Support, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthStatus {
    /// Demand fully covered by the profile
    Sufficient,
    /// Layers ran out before the demand was covered
    UnderSatisfied,
    /// Covered, but a layer that supplied depth has no horizontal result
    Incomplete,
    /// No load needs embedment
    NoDemand,
    /// No layer could be evaluated
    NotComputed,
}

impl fmt::Display for DepthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthStatus::Sufficient => write!(f, "sufficient"),
            DepthStatus::UnderSatisfied => write!(f, "UNDER-SATISFIED (profile too thin)"),
            DepthStatus::Incomplete => write!(f, "INCOMPLETE (horizontal check failed)"),
            DepthStatus::NoDemand => write!(f, "no demand"),
            DepthStatus::NotComputed => write!(f, "not computed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub position: String,
    pub support: Support,
    pub zone: Zone,
    /// Mechanism of the layer contributing the most depth
    pub governing: Option<Mechanism>,
    /// Realized depth from the apportionment
    pub required_depth_m: f64,
    /// Required depth plus the flat allowance
    pub recommended_depth_m: f64,
    pub status: DepthStatus,
}

fn status_of(block: &ApportionmentResult) -> DepthStatus {
    if block.demanded {
        if !block.satisfied {
            DepthStatus::UnderSatisfied
        } else if block.has_failed_mechanism() {
            DepthStatus::Incomplete
        } else {
            DepthStatus::Sufficient
        }
    } else if block.has_unknown_layers() {
        DepthStatus::NotComputed
    } else {
        DepthStatus::NoDemand
    }
}

/// One summary line per position, ordered short before long, then by zone and id
pub fn summarize(blocks: &[ApportionmentResult], allowance_m: f64) -> Vec<PositionSummary> {
    let mut summaries: Vec<PositionSummary> = blocks
        .iter()
        .map(|block| {
            let status = status_of(block);
            let (required, recommended) = match status {
                DepthStatus::NotComputed => (f64::NAN, f64::NAN),
                _ => (block.total_depth_m, block.total_depth_m + allowance_m),
            };
            let governing = block
                .rows
                .iter()
                .filter(|row| row.depth_used_m > 0.0)
                .max_by(|a, b| a.depth_used_m.total_cmp(&b.depth_used_m))
                .and_then(|row| row.mechanism);

            PositionSummary {
                position: block.position.clone(),
                support: block.support,
                zone: block.zone,
                governing,
                required_depth_m: required,
                recommended_depth_m: recommended,
                status,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.support
            .rank()
            .cmp(&b.support.rank())
            .then(a.zone.rank().cmp(&b.zone.rank()))
            .then_with(|| a.position.cmp(&b.position))
    });
    summaries
}

/// Deepest position per support type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportEnvelope {
    pub support: Support,
    /// Most exposed zone among the positions
    pub worst_zone: Zone,
    pub position: String,
    pub required_depth_m: f64,
    pub recommended_depth_m: f64,
    /// Some position of this support is under-satisfied
    pub any_under_satisfied: bool,
    /// Some position of this support lacks a horizontal result
    pub any_incomplete: bool,
}

pub fn envelope_by_support(summaries: &[PositionSummary]) -> Vec<SupportEnvelope> {
    let mut groups: HashMap<Support, Vec<&PositionSummary>> = HashMap::new();
    for summary in summaries {
        groups.entry(summary.support).or_default().push(summary);
    }

    let mut envelopes: Vec<SupportEnvelope> = groups
        .into_iter()
        .filter_map(|(support, members)| {
            let worst_zone = Zone::worst(members.iter().map(|s| s.zone))?;
            let deepest = members
                .iter()
                .filter(|s| s.required_depth_m.is_finite())
                .max_by(|a, b| a.required_depth_m.total_cmp(&b.required_depth_m))?;
            Some(SupportEnvelope {
                support,
                worst_zone,
                position: deepest.position.clone(),
                required_depth_m: deepest.required_depth_m,
                recommended_depth_m: deepest.recommended_depth_m,
                any_under_satisfied: members.iter().any(|s| s.status == DepthStatus::UnderSatisfied),
                any_incomplete: members.iter().any(|s| s.status == DepthStatus::Incomplete),
            })
        })
        .collect();

    envelopes.sort_by_key(|e| e.support.rank());
    envelopes
}
