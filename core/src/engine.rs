//! Pipeline glue (§2): wires the five components together in their
//! strictly linear data flow, `Profile → Pin Model → Dependency Analyzer →
//! Minterm Builder → Emitter`. Owns no state beyond the call itself and
//! performs no I/O — the caller supplies an already-decoded image and
//! receives rendered documents back.

use crate::dependency::analyze_dependencies;
use crate::emitter::{self, EmitOptions, EmittedDocument};
use crate::error::Result;
use crate::image::MemoryImage;
use crate::minimizer::Minimizer;
use crate::minterm::build_minterms;
use crate::pin::{build_pin_model, PinModel};
use crate::profile::DeviceProfile;

/// Run the full extraction pipeline against an already-decoded image.
///
/// `on_address` is called once per address in the Dependency Analyzer's
/// outer loop; it is a pure side effect (terminal progress reporting) and
/// never influences the result, per §5.
pub fn run(
    profile: &DeviceProfile,
    image: &MemoryImage,
    minimizer: &dyn Minimizer,
    opts: &EmitOptions,
    on_address: impl FnMut(u32, u32),
) -> Result<EmittedDocument> {
    let PinModel { inputs, mut outputs } = build_pin_model(profile)?;

    analyze_dependencies(image, &inputs, &mut outputs, on_address);
    build_minterms(profile, image, &mut outputs)?;

    let model = PinModel { inputs, outputs };
    Ok(emitter::emit(profile, &model, minimizer, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Polarity;
    use crate::minimizer::QuineMcCluskey;
    use std::collections::HashMap;

    fn profile_identity_buffer() -> DeviceProfile {
        let mut pin_names = HashMap::new();
        pin_names.insert(2, "I".to_string());
        pin_names.insert(12, "O".to_string());
        DeviceProfile {
            name: "t".into(),
            device_name: "T".into(),
            address_width: 1,
            data_width: 1,
            endianness: crate::profile::Endianness::Little,
            address_pins: vec![2],
            data_pins: vec![12],
            pin_names,
            output_pin_count: 1,
            hiz_probe_pins: 0,
        }
    }

    #[test]
    fn s1_identity_buffer_end_to_end() {
        let profile = profile_identity_buffer();
        let image = MemoryImage::decode(&profile, &[0x00, 0x01]).unwrap();
        let qm = QuineMcCluskey;
        let opts = EmitOptions {
            polarity: Polarity::Auto,
            oe_polarity: Polarity::Auto,
            input_stem: "dump".into(),
            date: "2026-07-31".into(),
            truthtable: false,
        };

        let doc = run(&profile, &image, &qm, &opts, |_, _| {}).unwrap();
        assert!(doc.equations.contains("O = I;"));
        assert!(doc.truth_table.is_none());
    }

    #[test]
    fn s3_constant_high_output_end_to_end() {
        let profile = profile_identity_buffer();
        let image = MemoryImage::decode(&profile, &[0x01, 0x01]).unwrap();
        let qm = QuineMcCluskey;
        let opts = EmitOptions {
            polarity: Polarity::Auto,
            oe_polarity: Polarity::Auto,
            input_stem: "dump".into(),
            date: "2026-07-31".into(),
            truthtable: false,
        };

        let doc = run(&profile, &image, &qm, &opts, |_, _| {}).unwrap();
        assert!(doc.equations.contains("O = 'b'1;"));
    }

    #[test]
    fn determinism_same_inputs_produce_identical_output() {
        let profile = profile_identity_buffer();
        let image = MemoryImage::decode(&profile, &[0x00, 0x01]).unwrap();
        let qm = QuineMcCluskey;
        let opts = EmitOptions {
            polarity: Polarity::Auto,
            oe_polarity: Polarity::Auto,
            input_stem: "dump".into(),
            date: "2026-07-31".into(),
            truthtable: false,
        };

        let a = run(&profile, &image, &qm, &opts, |_, _| {}).unwrap();
        let b = run(&profile, &image, &qm, &opts, |_, _| {}).unwrap();
        assert_eq!(a.equations, b.equations);
    }
}
