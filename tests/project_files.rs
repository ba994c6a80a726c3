use approx::assert_relative_eq;
use pile_core::config::SolverConfig;
use pile_core::embedment::run;
use pile_core::input::*;
use pile_core::project_file::*;
use std::fs;

fn project() -> ProjectInput {
    ProjectInput {
        layers: vec![
            LayerInput {
                name: "S1".into(),
                thickness_m: "1,80".into(),
                slope_mode: "0_15".into(),
                unit_weight_kn_m3: "17".into(),
                shaft_friction_kn_m2: "5".into(),
                phi_deg: "27,5".into(),
                cohesion_kn_m2: "2".into(),
                ..LayerInput::default()
            },
            LayerInput {
                name: "S2".into(),
                thickness_m: "3,40".into(),
                slope_mode: "gt_15".into(),
                slope_deg: "20".into(),
                unit_weight_kn_m3: "20".into(),
                shaft_friction_kn_m2: "5".into(),
                phi_deg: "22,5".into(),
                cohesion_kn_m2: "10".into(),
            },
        ],
        loads: vec![LoadInput {
            id: "1".into(),
            stuetze: "kurz".into(),
            bereich: "gruen".into(),
            compression_kn: "20,1".into(),
            tension_kn: "0".into(),
            h_kn: "0".into(),
            m_knm: "0".into(),
        }],
        factors: FactorsInput {
            gamma_d: "1,3".into(),
            gamma_z: "1,5".into(),
            t_start_m: Some("2,5".into()),
            ..FactorsInput::default()
        },
        pile: PileInput {
            b_m: "0,19".into(),
            u_m: "0,5978".into(),
        },
    }
}

#[test]
fn project_round_trips_through_json_and_toml() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["project.json", "project.toml"] {
        let path = dir.path().join(name);
        save_project(&path, &project()).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded, project(), "{name}");
    }
}

#[test]
fn unreadable_project_reports_the_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_project(&path), Err(ProjectFileError::JsonError(_))));

    let missing = dir.path().join("missing.toml");
    assert!(matches!(load_project(&missing), Err(ProjectFileError::IoError(_))));
}

#[test]
fn layers_from_csv_feed_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("layers.csv");
    fs::write(
        &csv_path,
        "name;thickness_m;slopeMode;slope_deg;unitWeight_kN_m3;shaftFriction_kN_m2;phi_deg;cohesion_kN_m2\n\
         S1;1,80;0_15;;17;5;27,5;2\n\
         S2;3,40;gt_15;20;20;5;22,5;10\n",
    )
    .unwrap();

    let mut input = project();
    input.layers = read_layers_csv_file(&csv_path).unwrap();
    assert_eq!(input.layers, project().layers);

    let request = input.into_request().unwrap();
    let config = input.solver_config(&SolverConfig::default()).unwrap();
    assert_relative_eq!(config.depth_start_m, 2.5, epsilon = 1e-12);

    let report = run(&request, &config).unwrap();
    let block = &report.apportionments[0];
    // both layers need 8.742 m alone, the 5.2 m profile covers 59.5 %
    assert!(block.is_under_satisfied());
    assert_relative_eq!(block.total_depth_m, 5.2, epsilon = 1e-9);

    let out_path = dir.path().join("apportionment.csv");
    write_apportionment_csv_file(&out_path, &report.apportionments).unwrap();
    let written = fs::read_to_string(&out_path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some(
            "position;support;zone;layer_no;layer;thickness_m;governing_depth_m;share_pct;remaining_pct;depth_used_m;cumulative_depth_m"
        )
    );
    assert_eq!(lines.next(), Some("kurz_1;kurz;green;1;S1;1,80;8,74;20,6;79,4;1,80;1,80"));
    assert_eq!(lines.count(), 1);
}
