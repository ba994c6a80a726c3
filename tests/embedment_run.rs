use approx::assert_relative_eq;
use pile_core::config::SolverConfig;
use pile_core::embedment::*;
use pile_core::physics::shaft_friction::GoverningCase;
use pile_core::soil::*;
use pile_core::types::*;

fn flat_sand(thickness: f64) -> SoilLayer {
    SoilLayer::new("Sand", meters(thickness))
        .with_slope(SlopeMode::Steeper(degrees(0.0)))
        .with_unit_weight(UnitWeight(19.0))
        .with_friction_angle(degrees(30.0))
        .with_cohesion(kn_per_m2(0.0))
        .with_shaft_friction(kn_per_m2(25.0))
}

fn topsoil(thickness: f64) -> SoilLayer {
    SoilLayer::new("Topsoil", meters(thickness))
        .with_unit_weight(UnitWeight(17.0))
        .with_friction_angle(degrees(27.5))
        .with_cohesion(kn_per_m2(2.0))
        .with_shaft_friction(kn_per_m2(5.0))
}

fn pile() -> PileGeometry {
    PileGeometry::new(meters(0.19), meters(0.5978))
}

fn request(layers: Vec<SoilLayer>, loads: Vec<LoadCase>) -> EmbedmentRequest {
    EmbedmentRequest {
        layers,
        loads,
        factors: DesignFactors::new(1.3, 1.5),
        pile: pile(),
    }
}

#[test]
fn horizontal_demand_in_a_thick_layer() {
    let load = LoadCase::new("kurz_1", Support::Short, Zone::Green)
        .with_horizontal(kilonewtons(10.0), kilonewton_meters(5.0));
    let report = run(&request(vec![flat_sand(5.0)], vec![load]), &SolverConfig::default()).unwrap();

    let block = report.apportionment_for("kurz_1").unwrap();
    assert!(block.satisfied);
    assert_relative_eq!(block.total_depth_m, 1.86181, epsilon = 1e-4);
    assert_eq!(block.rows[0].mechanism, Some(Mechanism::Horizontal));

    let summary = report.summary_for("kurz_1").unwrap();
    assert_eq!(summary.status, DepthStatus::Sufficient);
    assert_eq!(summary.governing, Some(Mechanism::Horizontal));
}

#[test]
fn vertical_demand_spreads_over_equal_layers() {
    // τ = 5 kN/m², U = 0.5978 m, N_Ed = 20.1 · 1.3 gives L_v ≈ 8.742 m in each layer
    let load = LoadCase::new("kurz_1", Support::Short, Zone::Green).with_vertical(kilonewtons(20.1), kilonewtons(0.0));
    let report = run(
        &request(vec![topsoil(1.8), topsoil(10.0)], vec![load]),
        &SolverConfig::default(),
    )
    .unwrap();

    let row = &report.vertical.rows[0];
    assert_relative_eq!(row.resistance_per_m_kn, 2.989, epsilon = 1e-9);
    assert_relative_eq!(row.compression_depth_m, 8.742, epsilon = 1e-2);
    assert_eq!(row.governing, GoverningCase::Compression);

    assert!(report.horizontal.iter().all(|h| h.outcome == HorizontalOutcome::NoDemand));

    let block = report.apportionment_for("kurz_1").unwrap();
    assert_relative_eq!(block.rows[0].depth_used_m, 1.8, epsilon = 1e-12);
    assert_relative_eq!(block.total_depth_m, row.governing_depth_m, epsilon = 1e-9);
    assert!(block.remaining_fraction <= 1e-12);
}

#[test]
fn thin_profile_is_flagged() {
    let load = LoadCase::new("lang_1", Support::Long, Zone::Red).with_vertical(kilonewtons(20.1), kilonewtons(0.0));
    let report = run(
        &request(vec![topsoil(1.0), topsoil(2.0)], vec![load]),
        &SolverConfig::default(),
    )
    .unwrap();

    let block = report.apportionment_for("lang_1").unwrap();
    assert!(block.is_under_satisfied());
    assert_relative_eq!(block.total_depth_m, 3.0, epsilon = 1e-12);
    assert_eq!(report.under_satisfied().count(), 1);
    assert!(report.summary().contains("UNDER-SATISFIED"));
    assert!(report.envelopes[0].any_under_satisfied);
}

#[test]
fn failed_layer_does_not_stop_the_batch() {
    let unknown = SoilLayer::new("Unknown", meters(2.0))
        .with_unit_weight(UnitWeight(18.0))
        .with_shaft_friction(kn_per_m2(10.0));
    let loads = vec![
        LoadCase::new("kurz_1", Support::Short, Zone::Green)
            .with_vertical(kilonewtons(10.0), kilonewtons(0.0))
            .with_horizontal(kilonewtons(5.0), kilonewton_meters(2.0)),
        LoadCase::new("kurz_2", Support::Short, Zone::Yellow)
            .with_vertical(kilonewtons(12.0), kilonewtons(0.0))
            .with_horizontal(kilonewtons(6.0), kilonewton_meters(2.0)),
    ];
    let report = run(&request(vec![unknown, flat_sand(4.0)], loads), &SolverConfig::default()).unwrap();

    assert_eq!(report.horizontal.len(), 4);
    let failed: Vec<_> = report.horizontal.iter().filter(|h| h.is_failed()).collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|h| h.layer == "Unknown"));
    assert!(report.horizontal.iter().any(|h| h.layer == "Sand" && !h.is_failed()));

    for block in &report.apportionments {
        // the unknown layer still carries its vertical depth
        assert!(block.rows[0].governing_depth_m.is_finite());
        assert_eq!(block.rows[0].mechanism, Some(Mechanism::Vertical));
    }
    assert!(report.summary().contains("Horizontal checks without result"));

    // both positions draw depth from the unknown layer on L_v alone
    assert_eq!(report.incomplete().count(), 2);
    assert!(report.summary().contains("INCOMPLETE"));
}

#[test]
fn failed_horizontal_check_is_not_reported_as_sufficient() {
    let no_phi = SoilLayer::new("Fill", meters(5.0))
        .with_unit_weight(UnitWeight(19.0))
        .with_shaft_friction(kn_per_m2(25.0));
    let load = LoadCase::new("kurz_1", Support::Short, Zone::Green)
        .with_vertical(kilonewtons(1.0), kilonewtons(0.0))
        .with_horizontal(kilonewtons(20.0), kilonewton_meters(10.0));
    let report = run(&request(vec![no_phi], vec![load]), &SolverConfig::default()).unwrap();

    assert!(report.horizontal[0].is_failed());
    let summary = report.summary_for("kurz_1").unwrap();
    // 1.3 kN over τ·U = 14.945 kN/m
    assert_relative_eq!(summary.required_depth_m, 0.08699, epsilon = 1e-4);
    assert_eq!(summary.status, DepthStatus::Incomplete);
    assert!(report.envelopes[0].any_incomplete);
}

#[test]
fn layer_without_unit_weight_adds_no_depth() {
    let no_gamma = topsoil(2.0).with_unit_weight(UnitWeight(0.0));
    let load = LoadCase::new("kurz_1", Support::Short, Zone::Green).with_vertical(kilonewtons(20.1), kilonewtons(0.0));
    let report = run(
        &request(vec![no_gamma, typical_layers::stiff_clay(20.0)], vec![load]),
        &SolverConfig::default(),
    )
    .unwrap();

    // the vertical table still lists the layer, the apportionment does not use it
    assert!(report.vertical.rows.iter().any(|r| r.layer_index == 0));
    let block = report.apportionment_for("kurz_1").unwrap();
    assert!(block.rows[0].is_skipped());
    assert_eq!(block.rows[0].depth_used_m, 0.0);
    // 26.13 kN over τ·U = 20 · 0.5978 kN/m
    assert_relative_eq!(block.total_depth_m, 2.18551, epsilon = 1e-4);
    assert_eq!(report.summary_for("kurz_1").unwrap().status, DepthStatus::Sufficient);
}

#[test]
fn excluded_shaft_friction_layer_keeps_horizontal_depth() {
    let no_friction = flat_sand(3.0).with_shaft_friction(kn_per_m2(0.0));
    let load = LoadCase::new("kurz_1", Support::Short, Zone::Green)
        .with_vertical(kilonewtons(10.0), kilonewtons(0.0))
        .with_horizontal(kilonewtons(10.0), kilonewton_meters(5.0));
    let report = run(
        &request(vec![no_friction, topsoil(10.0)], vec![load]),
        &SolverConfig::default(),
    )
    .unwrap();

    assert_eq!(report.vertical.excluded_layers.len(), 1);
    assert!(report.vertical.rows.iter().all(|r| r.layer_index == 1));

    let block = report.apportionment_for("kurz_1").unwrap();
    assert_eq!(block.rows[0].mechanism, Some(Mechanism::Horizontal));
    assert_relative_eq!(block.rows[0].governing_depth_m, 1.86181, epsilon = 1e-4);
}

#[test]
fn runs_are_repeatable_and_ordered() {
    let loads: Vec<LoadCase> = (1..=8)
        .map(|i| {
            let support = if i % 2 == 0 { Support::Long } else { Support::Short };
            let zone = [Zone::Red, Zone::Green, Zone::Yellow][i % 3];
            LoadCase::new(format!("{}_{i}", support.key()), support, zone)
                .with_vertical(kilonewtons(5.0 + i as f64), kilonewtons(2.0 * i as f64))
                .with_horizontal(kilonewtons(1.0 + 0.5 * i as f64), kilonewton_meters(0.8 * i as f64))
        })
        .collect();
    let req = request(
        vec![topsoil(1.2), typical_layers::medium_dense_sand(2.5), topsoil(6.0)],
        loads,
    );

    let first = run(&req, &SolverConfig::default()).unwrap();
    let second = run(&req, &SolverConfig::default()).unwrap();
    assert_eq!(first.apportionments, second.apportionments);
    assert_eq!(first.protocol, second.protocol);

    // apportionment blocks follow the input order
    let order: Vec<_> = first.apportionments.iter().map(|b| b.position.clone()).collect();
    let expected: Vec<_> = req.loads.iter().map(|l| l.position.clone()).collect();
    assert_eq!(order, expected);

    // summaries: short before long, then green, yellow, red
    for pair in first.summaries.windows(2) {
        let key = |s: &PositionSummary| (s.support.rank(), s.zone.rank());
        assert!(key(&pair[0]) <= key(&pair[1]));
    }

    for block in &first.apportionments {
        let used: f64 = block.rows.iter().map(|r| r.depth_used_m).sum();
        assert_relative_eq!(used, block.total_depth_m, epsilon = 1e-9);
    }
}

#[test]
fn report_serializes_to_json() {
    let load = LoadCase::new("kurz_1", Support::Short, Zone::Green).with_vertical(kilonewtons(20.1), kilonewtons(5.0));
    let report = run(&request(vec![topsoil(1.8), topsoil(3.4)], vec![load]), &SolverConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["summaries"][0]["required_depth_m"].is_number());
    assert!(json["protocol"].as_array().is_some_and(|lines| !lines.is_empty()));
}
