//! Form records as the input screens send them
//!
//! Every value is the string the user typed, with the field names of the
//! project payload. `into_request` turns them into typed domain values.
//! A bad layer value becomes NaN so the solvers flag that layer; a bad
//! global value (factors, pile) is an error.

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::embedment::EmbedmentRequest;
use crate::soil::*;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Field '{field}': {source}")]
    InvalidValue {
        field: &'static str,
        #[source]
        source: DecimalError,
    },

    #[error("Field '{field}': unknown choice '{value}'")]
    UnknownChoice { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerInput {
    pub name: String,
    pub thickness_m: String,
    /// `"0_15"` or `"gt_15"`
    #[serde(rename = "slopeMode")]
    pub slope_mode: String,
    pub slope_deg: String,
    #[serde(rename = "unitWeight_kN_m3")]
    pub unit_weight_kn_m3: String,
    #[serde(rename = "shaftFriction_kN_m2")]
    pub shaft_friction_kn_m2: String,
    pub phi_deg: String,
    #[serde(rename = "cohesion_kN_m2")]
    pub cohesion_kn_m2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadInput {
    pub id: String,
    /// `"kurz"` or `"lang"`
    pub stuetze: String,
    /// `"gruen"`, `"gelb"` or `"rot"`
    pub bereich: String,
    #[serde(rename = "compression_kN")]
    pub compression_kn: String,
    #[serde(rename = "tension_kN")]
    pub tension_kn: String,
    #[serde(rename = "H_kN")]
    pub h_kn: String,
    #[serde(rename = "M_kNm")]
    pub m_knm: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorsInput {
    #[serde(rename = "gammaD")]
    pub gamma_d: String,
    #[serde(rename = "gammaZ")]
    pub gamma_z: String,
    #[serde(rename = "alphaC", skip_serializing_if = "Option::is_none")]
    pub alpha_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    /// `"half_phi"` or `"input"`
    #[serde(rename = "deltaMode", skip_serializing_if = "Option::is_none")]
    pub delta_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_deg: Option<String>,
    #[serde(rename = "tStart_m", skip_serializing_if = "Option::is_none")]
    pub t_start_m: Option<String>,
    #[serde(rename = "dtStart_m", skip_serializing_if = "Option::is_none")]
    pub dt_start_m: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PileInput {
    pub b_m: String,
    #[serde(rename = "U_m")]
    pub u_m: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    pub layers: Vec<LayerInput>,
    pub loads: Vec<LoadInput>,
    pub factors: FactorsInput,
    pub pile: PileInput,
}

/// Layer value, NaN when it cannot be read
fn lenient(raw: &str) -> f64 {
    parse_decimal(raw).unwrap_or(f64::NAN)
}

/// Load value: blank is zero, unreadable is NaN
fn load_value(raw: &str) -> f64 {
    match parse_decimal(raw) {
        Ok(value) => value,
        Err(DecimalError::Empty) => 0.0,
        Err(_) => f64::NAN,
    }
}

fn required(field: &'static str, raw: &str) -> Result<f64, InputError> {
    parse_decimal(raw).map_err(|source| InputError::InvalidValue { field, source })
}

fn optional(field: &'static str, raw: Option<&String>, default: f64) -> Result<f64, InputError> {
    parse_decimal_or(raw.map(String::as_str), default).map_err(|source| InputError::InvalidValue { field, source })
}

pub fn parse_support(raw: &str) -> Result<Support, InputError> {
    match raw.trim() {
        "kurz" => Ok(Support::Short),
        "lang" => Ok(Support::Long),
        other => Err(InputError::UnknownChoice {
            field: "stuetze",
            value: other.to_string(),
        }),
    }
}

pub fn parse_zone(raw: &str) -> Result<Zone, InputError> {
    match raw.trim() {
        "gruen" | "grün" => Ok(Zone::Green),
        "gelb" => Ok(Zone::Yellow),
        "rot" => Ok(Zone::Red),
        other => Err(InputError::UnknownChoice {
            field: "bereich",
            value: other.to_string(),
        }),
    }
}

impl LayerInput {
    pub fn to_layer(&self) -> SoilLayer {
        let slope = match self.slope_mode.trim() {
            "gt_15" => SlopeMode::Steeper(degrees(lenient(&self.slope_deg))),
            _ => SlopeMode::UpTo15,
        };
        SoilLayer::new(self.name.trim(), meters(lenient(&self.thickness_m)))
            .with_slope(slope)
            .with_unit_weight(UnitWeight(lenient(&self.unit_weight_kn_m3)))
            .with_friction_angle(degrees(lenient(&self.phi_deg)))
            .with_cohesion(kn_per_m2(lenient(&self.cohesion_kn_m2)))
            .with_shaft_friction(kn_per_m2(lenient(&self.shaft_friction_kn_m2)))
    }
}

impl LoadInput {
    /// Position id as `"{support}_{id}"`
    pub fn position_key(&self) -> Result<String, InputError> {
        Ok(format!("{}_{}", parse_support(&self.stuetze)?.key(), self.id.trim()))
    }

    pub fn to_load_case(&self) -> Result<LoadCase, InputError> {
        let support = parse_support(&self.stuetze)?;
        let zone = parse_zone(&self.bereich)?;
        Ok(LoadCase::new(self.position_key()?, support, zone)
            .with_vertical(
                kilonewtons(load_value(&self.compression_kn)),
                kilonewtons(load_value(&self.tension_kn)),
            )
            .with_horizontal(
                kilonewtons(load_value(&self.h_kn)),
                kilonewton_meters(load_value(&self.m_knm)),
            ))
    }
}

impl FactorsInput {
    pub fn to_factors(&self) -> Result<DesignFactors, InputError> {
        let mut factors = DesignFactors::new(required("gammaD", &self.gamma_d)?, required("gammaZ", &self.gamma_z)?);
        factors.alpha_c = optional("alphaC", self.alpha_c.as_ref(), DesignFactors::DEFAULT_ALPHA_C)?;
        factors.eta = optional("eta", self.eta.as_ref(), DesignFactors::DEFAULT_ETA)?;

        factors.wall_friction = match self.delta_mode.as_deref().map(str::trim) {
            None | Some("") | Some("half_phi") => WallFriction::HalfPhi,
            Some("input") => match self.delta_deg.as_deref().map(parse_decimal) {
                Some(Ok(delta)) => WallFriction::Fixed(degrees(delta)),
                _ => {
                    tracing::warn!("deltaMode 'input' without a readable delta_deg, using δ = φ/2");
                    WallFriction::HalfPhi
                }
            },
            Some(other) => {
                return Err(InputError::UnknownChoice {
                    field: "deltaMode",
                    value: other.to_string(),
                });
            }
        };
        Ok(factors)
    }
}

impl PileInput {
    pub fn to_geometry(&self) -> Result<PileGeometry, InputError> {
        Ok(PileGeometry::new(
            meters(required("b_m", &self.b_m)?),
            meters(required("U_m", &self.u_m)?),
        ))
    }
}

impl ProjectInput {
    pub fn into_request(&self) -> Result<EmbedmentRequest, InputError> {
        Ok(EmbedmentRequest {
            layers: self.layers.iter().map(LayerInput::to_layer).collect(),
            loads: self
                .loads
                .iter()
                .map(LoadInput::to_load_case)
                .collect::<Result<_, _>>()?,
            factors: self.factors.to_factors()?,
            pile: self.pile.to_geometry()?,
        })
    }

    /// Solver settings with this project's start depth and step, if given
    pub fn solver_config(&self, base: &SolverConfig) -> Result<SolverConfig, InputError> {
        let start = optional("tStart_m", self.factors.t_start_m.as_ref(), base.depth_start_m)?;
        let step = optional("dtStart_m", self.factors.dt_start_m.as_ref(), base.depth_step_m)?;
        Ok(base.with_depth_seed(start, step))
    }
}
