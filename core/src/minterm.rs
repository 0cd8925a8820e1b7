//! The Minterm Builder (§4.3): given the dependency sets discovered by the
//! Dependency Analyzer, classifies every combination of the depended-on
//! inputs as a positive, negative, or don't-care minterm for the output
//! equation, and the analogous positive/negative classification (no
//! don't-cares) for the output-enable equation.

use crate::bits::{decode_minterm, encode_minterm, submasks};
use crate::error::{PalError, Result};
use crate::image::MemoryImage;
use crate::pin::Pin;
use crate::profile::DeviceProfile;

/// Precomputed geometry for the hi-z relevance test (§4.3), shared across
/// every output pin for a given profile.
struct HizGeometry {
    input_mask: u32,
    data_mask: u32,
    shift: u32,
}

impl HizGeometry {
    fn from_profile(profile: &DeviceProfile) -> Self {
        let a = profile.address_width;
        let d = profile.data_width;
        let h = profile.hiz_probe_pins;
        let input_mask = if h == 0 { 0 } else { ((1u32 << h) - 1) << (a - h) };
        let data_mask = if d == h { 0 } else { ((1u32 << (d - h)) - 1) << h };
        Self {
            input_mask,
            data_mask,
            shift: a.saturating_sub(h),
        }
    }
}

/// Populate `positive_terms`/`negative_terms`/`dont_care_terms` and
/// `oe_positive_terms`/`oe_negative_terms` on every output pin, in place.
pub fn build_minterms(
    profile: &DeviceProfile,
    image: &MemoryImage,
    outputs: &mut [Pin],
) -> Result<()> {
    let geometry = HizGeometry::from_profile(profile);

    for op in outputs.iter_mut() {
        classify_output(op, image, &geometry)?;
        classify_oe(op, image);
    }

    Ok(())
}

fn classify_output(op: &mut Pin, image: &MemoryImage, geometry: &HizGeometry) -> Result<()> {
    let dep_bits = op.depends.bits().to_vec();
    if dep_bits.is_empty() {
        return Ok(());
    }
    let names = op.depends.pinnames().to_vec();

    for m in 0..(1u32 << dep_bits.len()) {
        let addr = decode_minterm(m, &dep_bits);
        op.conditions.push(crate::bits::render_literal_term(m, &names));

        if !is_relevant(op, image, addr, geometry) {
            op.dont_care_terms.insert(m);
            continue;
        }

        if effective_value(op, image, addr)? {
            op.positive_terms.insert(m);
        } else {
            op.negative_terms.insert(m);
        }
    }

    Ok(())
}

/// A sub-address is relevant iff some setting of the hi-z probe bits not
/// already accounted for in `op.depends` produces a probe word that
/// matches the data word actually observed there — proving the PAL's
/// response tracks the probe rather than an external override.
fn is_relevant(op: &Pin, image: &MemoryImage, addr: u32, geometry: &HizGeometry) -> bool {
    let free_probe_bits = !op.depends.bitmap() & geometry.input_mask;

    for p in submasks(free_probe_bits) {
        let addr_p = addr | p;
        let probe_value = (addr_p & geometry.input_mask) >> geometry.shift;
        let data_value = image.get(addr_p) & !geometry.data_mask;
        if probe_value == data_value {
            return true;
        }
    }
    false
}

/// The value a relevant combination actually carries: the direct reading
/// if the PAL is driving, else the value found by searching every setting
/// of `oe_depends` for an address where the pin is actively driven.
fn effective_value(op: &Pin, image: &MemoryImage, addr: u32) -> Result<bool> {
    if op.hiz_probe_bit_mask == 0 {
        return Ok(image.get(addr) & op.bit_mask != 0);
    }

    let direct = image.get(addr) & op.bit_mask;
    let toggled = image.get(addr ^ op.hiz_probe_bit_mask) & op.bit_mask;
    if direct == toggled {
        return Ok(direct != 0);
    }

    let oe_bitmap = op.oe_depends.bitmap();
    for s in submasks(oe_bitmap) {
        let addr2 = (addr & !oe_bitmap) | s;
        let d2 = image.get(addr2) & op.bit_mask;
        let t2 = image.get(addr2 ^ op.hiz_probe_bit_mask) & op.bit_mask;
        if d2 == t2 {
            return Ok(d2 != 0);
        }
    }

    Err(PalError::NoDriveForCombination {
        pin: op.name.clone(),
        sub_addr: addr,
    })
}

/// A pin is enabled at a given setting of its OE-dependency bits iff the
/// direct reading agrees with the probe-toggled reading (driven, not
/// forced). No don't-cares apply to the OE equation.
fn classify_oe(op: &mut Pin, image: &MemoryImage) {
    let dep_bits = op.oe_depends.bits().to_vec();
    if dep_bits.is_empty() {
        return;
    }

    for addr in submasks(op.oe_depends.bitmap()) {
        let m = encode_minterm(addr, &dep_bits);
        let enabled = if op.hiz_probe_bit_mask == 0 {
            true
        } else {
            (image.get(addr) & op.bit_mask) == (image.get(addr ^ op.hiz_probe_bit_mask) & op.bit_mask)
        };
        if enabled {
            op.oe_positive_terms.insert(m);
        } else {
            op.oe_negative_terms.insert(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::{build_pin_model, PinModel};
    use crate::profile::Endianness;
    use proptest::{prop_assert, prop_assert_eq};
    use std::collections::HashMap;

    fn profile_2in_1out() -> DeviceProfile {
        let mut pin_names = HashMap::new();
        pin_names.insert(2, "I0".to_string());
        pin_names.insert(3, "I1".to_string());
        pin_names.insert(12, "O".to_string());
        DeviceProfile {
            name: "t".into(),
            device_name: "T".into(),
            address_width: 2,
            data_width: 1,
            endianness: Endianness::Little,
            address_pins: vec![2, 3],
            data_pins: vec![12],
            pin_names,
            output_pin_count: 1,
            hiz_probe_pins: 0,
        }
    }

    #[test]
    fn s4_and_classification_has_no_dont_cares_and_is_closed() {
        let profile = profile_2in_1out();
        let image = MemoryImage::decode(&profile, &[0, 0, 0, 1]).unwrap();
        let PinModel { inputs, mut outputs } = build_pin_model(&profile).unwrap();
        crate::dependency::analyze_dependencies(&image, &inputs, &mut outputs, |_, _| {});
        build_minterms(&profile, &image, &mut outputs).unwrap();

        let op = &outputs[0];
        assert_eq!(op.depends.bits(), &[0b01, 0b10]);
        assert_eq!(op.positive_terms, [0b11].into_iter().collect());
        assert_eq!(
            op.negative_terms,
            [0b00, 0b01, 0b10].into_iter().collect()
        );
        assert!(op.dont_care_terms.is_empty());

        // property 3: closure and disjointness
        let k = op.depends.len() as u32;
        let universe: std::collections::BTreeSet<u32> = (0..(1 << k)).collect();
        let union: std::collections::BTreeSet<u32> = op
            .positive_terms
            .union(&op.negative_terms)
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .union(&op.dont_care_terms)
            .cloned()
            .collect();
        assert_eq!(union, universe);
        assert!(op.positive_terms.is_disjoint(&op.negative_terms));
        assert!(op.positive_terms.is_disjoint(&op.dont_care_terms));
        assert!(op.negative_terms.is_disjoint(&op.dont_care_terms));
    }

    #[test]
    fn no_drive_combination_is_reported_as_error() {
        // output pin's only address bit is its own hi-z probe; the dump
        // never shows it driven at either setting of the probe, and it
        // has no oe_depends to search for an alternate driven address.
        let mut pin_names = HashMap::new();
        pin_names.insert(12, "O".to_string());
        let profile = DeviceProfile {
            name: "t".into(),
            device_name: "T".into(),
            address_width: 1,
            data_width: 1,
            endianness: Endianness::Little,
            address_pins: vec![12],
            data_pins: vec![12],
            pin_names,
            output_pin_count: 1,
            hiz_probe_pins: 1,
        };
        // addr0=0 -> data 0 (floats low); addr1=1 -> data 1 (floats high,
        // mirroring the probe). Both addresses disagree with their
        // toggled reading, so the pin is never seen actively driven.
        let image = MemoryImage::decode(&profile, &[0, 1]).unwrap();
        let PinModel { inputs: _, mut outputs } = build_pin_model(&profile).unwrap();

        // No genuine inputs exist, so depends/oe_depends stay empty after
        // the dependency analyzer; force a synthetic dependency so the
        // minterm builder actually attempts classification.
        outputs[0].depends.add(0b1, "probe");
        outputs[0].hiz_probe_bit_mask = 0b1;

        let err = build_minterms(&profile, &image, &mut outputs).unwrap_err();
        assert!(matches!(err, PalError::NoDriveForCombination { .. }));
    }

    proptest::proptest! {
        /// Property 3 (closure/disjointness) must hold no matter which of
        /// the 16 possible truth tables a 2-input, no-hi-z output happens
        /// to encode: every sub-address lands in exactly one of positive,
        /// negative, or don't-care, and never more than one.
        #[test]
        fn closure_holds_for_random_two_input_truth_tables(table in 0u8..16) {
            let profile = profile_2in_1out();
            let bytes: Vec<u8> = (0..4).map(|addr| (table >> addr) & 1).collect();
            let image = MemoryImage::decode(&profile, &bytes).unwrap();
            let PinModel { inputs, mut outputs } = build_pin_model(&profile).unwrap();
            crate::dependency::analyze_dependencies(&image, &inputs, &mut outputs, |_, _| {});
            build_minterms(&profile, &image, &mut outputs).unwrap();

            let op = &outputs[0];
            let k = op.depends.len() as u32;
            let universe: std::collections::BTreeSet<u32> = (0..(1 << k)).collect();
            let union: std::collections::BTreeSet<u32> = op
                .positive_terms
                .union(&op.negative_terms)
                .cloned()
                .collect::<std::collections::BTreeSet<_>>()
                .union(&op.dont_care_terms)
                .cloned()
                .collect();
            prop_assert_eq!(union, universe);
            prop_assert!(op.positive_terms.is_disjoint(&op.negative_terms));
            prop_assert!(op.positive_terms.is_disjoint(&op.dont_care_terms));
            prop_assert!(op.negative_terms.is_disjoint(&op.dont_care_terms));
        }
    }
}
