use pile_core::config::SolverConfig;
use pile_core::embedment::*;
use pile_core::input::*;
use pile_core::physics::shaft_friction::GoverningCase;

fn project() -> ProjectInput {
    let layer = |name: &str, thickness: &str, gamma: &str, tau: &str, phi: &str, c: &str| LayerInput {
        name: name.into(),
        thickness_m: thickness.into(),
        slope_mode: "0_15".into(),
        unit_weight_kn_m3: gamma.into(),
        shaft_friction_kn_m2: tau.into(),
        phi_deg: phi.into(),
        cohesion_kn_m2: c.into(),
        ..LayerInput::default()
    };
    let load = |id: &str, support: &str, zone: &str, nd: &str, nz: &str, h: &str, m: &str| LoadInput {
        id: id.into(),
        stuetze: support.into(),
        bereich: zone.into(),
        compression_kn: nd.into(),
        tension_kn: nz.into(),
        h_kn: h.into(),
        m_knm: m.into(),
    };

    ProjectInput {
        layers: vec![
            layer("Topsoil", "1,80", "17", "5", "27,5", "2"),
            layer("Loam, stiff", "3,40", "20", "20", "22,5", "10"),
        ],
        loads: vec![
            load("1", "kurz", "gruen", "20,1", "12,4", "3,2", "1,6"),
            load("2", "kurz", "rot", "26,8", "18,9", "4,1", "2,0"),
            load("1", "lang", "gelb", "14,0", "9,7", "2,8", "1,9"),
        ],
        factors: FactorsInput {
            gamma_d: "1,3".into(),
            gamma_z: "1,5".into(),
            ..FactorsInput::default()
        },
        pile: PileInput {
            b_m: "0,19".into(),
            u_m: "0,5978".into(),
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Pile Embedment Depth ===\n");

    let project = project();
    let request = match project.into_request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Input error: {e}");
            return;
        }
    };
    let config = match project.solver_config(&SolverConfig::default()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Input error: {e}");
            return;
        }
    };

    let report = match run(&request, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Run failed: {e}");
            return;
        }
    };

    println!("{}", report.protocol);

    println!("Single-layer depths");
    println!("{}", "-".repeat(50));
    for row in &report.vertical.rows {
        let l_h = report
            .horizontal
            .iter()
            .find(|h| h.position == row.position && h.layer_index == row.layer_index)
            .map(|h| h.required_depth_m())
            .unwrap_or(f64::NAN);
        let case = match row.governing {
            GoverningCase::Compression => "D",
            GoverningCase::Tension => "Z",
            GoverningCase::None => "-",
        };
        println!(
            "{:<10} {:<14} L_h = {:>6.2} m   L_v = {:>6.2} m ({case})",
            row.position, row.layer, l_h, row.governing_depth_m
        );
    }
    println!();

    print!("{}", report.summary());

    // Standalone check, as the single-calculation screen sends it
    let single = StandaloneInput {
        beta_deg: "15".into(),
        phi_deg: "27,5".into(),
        cohesion_kn_m2: "2".into(),
        unit_weight_kn_m3: "19".into(),
        delta_deg: "13,75".into(),
        width_m: "0,19".into(),
        h_kn: "9,8".into(),
        m_knm: "4,2".into(),
        ..StandaloneInput::default()
    };
    let traced = solve_standalone(&single, &SolverConfig::default());
    println!("\n{}", traced.protocol);
    match traced.message() {
        Some(message) => println!("Standalone check failed: {message}"),
        None => {
            if let Some(result) = traced.value() {
                println!("Standalone check: L_h = {:.3} m", result.required_depth_m);
            }
        }
    }
}
