use proptest::prelude::*;

use scint_config::schema::{
    default_sim_config, DetectorShape, RuntimeControls, SimulationConfig,
};
use scint_macro::{decode_macro, macro_commands};

const RULES: [&str; 3] = [
    "min(entranceDiameter,sensorMaxWidth)",
    "entranceDiameter",
    "sensorMaxWidth",
];

proptest! {
    #[test]
    fn encode_decode_encode_is_stable(
        dim_x in 50.0_f64..400.0,
        dim_y in 50.0_f64..400.0,
        dim_z in 5.0_f64..50.0,
        scint_z in -50.0_f64..50.0,
        standoff_cm in 0.5_f64..40.0,
        thickness_mm in 0.05_f64..2.0,
        entrance_mm in 20.0_f64..60.0,
        sensor_max_mm in 10.0_f64..50.0,
        rule_idx in 0_usize..3,
        circular in any::<bool>(),
        with_source in any::<bool>(),
        beam_on in proptest::option::of(1_u64..1_000_000),
        verbose in proptest::option::of(0_u32..5),
    ) {
        let mut config = default_sim_config();
        config.scintillator.dimension_mm.x_mm = dim_x;
        config.scintillator.dimension_mm.y_mm = dim_y;
        config.scintillator.dimension_mm.z_mm = dim_z;
        config.scintillator.position_mm.z_mm = scint_z;
        config.optical.geometry.entrance_diameter_mm = entrance_mm;
        config.optical.geometry.sensor_max_width_mm = sensor_max_mm;
        let detector = &mut config.optical.sensitive_detector;
        detector.standoff_cm = standoff_cm;
        detector.thickness_mm = thickness_mm;
        detector.diameter_rule = RULES[rule_idx].to_string();
        detector.shape = if circular {
            DetectorShape::Circle
        } else {
            DetectorShape::Square
        };
        if !with_source {
            config.source = None;
        }
        if beam_on.is_some() || verbose.is_some() {
            config.simulation = Some(SimulationConfig {
                number_of_particles: beam_on,
                runtime_controls: verbose.map(|level| RuntimeControls {
                    run_verbose: Some(level),
                    tracking_verbose: Some(level),
                    ..RuntimeControls::default()
                }),
            });
        }

        let first = macro_commands(&config).unwrap();
        let mut text = first.join("\n");
        text.push('\n');
        let decoded = decode_macro(&text, &config).unwrap();
        let second = macro_commands(&decoded).unwrap();
        prop_assert_eq!(first, second);
    }
}
