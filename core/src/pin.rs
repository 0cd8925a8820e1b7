//! Pin records and the Pin Model Builder (§3, §4.1).

use std::collections::BTreeSet;

use crate::error::Result;
use crate::profile::DeviceProfile;

/// A dependency set: the inputs a pin's driven value (or OE) depends on.
///
/// Keeps `bits` sorted ascending by construction and derives `bitmap` as
/// their bitwise OR, so the three parallel views named in §3 can never
/// drift out of sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinDependencies {
    bitmap: u32,
    bits: Vec<u32>,
    pinnames: Vec<String>,
}

impl PinDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency on `ip`, idempotent by name. Re-sorts the bit
    /// sequence so `bits` stays strictly ascending.
    pub fn add(&mut self, mask: u32, name: &str) {
        if self.bits.contains(&mask) {
            return;
        }
        self.bits.push(mask);
        self.pinnames.push(name.to_string());
        self.bitmap |= mask;

        let mut pairs: Vec<(u32, String)> = self
            .bits
            .drain(..)
            .zip(self.pinnames.drain(..))
            .collect();
        pairs.sort_by_key(|(m, _)| *m);
        for (m, n) in pairs {
            self.bits.push(m);
            self.pinnames.push(n);
        }
    }

    pub fn bitmap(&self) -> u32 {
        self.bitmap
    }

    pub fn bits(&self) -> &[u32] {
        &self.bits
    }

    pub fn pinnames(&self) -> &[String] {
        &self.pinnames
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `true` iff `bits` is strictly ascending, `bitmap == OR(bits)`, and
    /// the two parallel sequences have equal length (§8 property 2).
    pub fn is_consistent(&self) -> bool {
        let sorted = self.bits.windows(2).all(|w| w[0] < w[1]);
        let or_matches = self.bits.iter().fold(0u32, |acc, b| acc | b) == self.bitmap;
        sorted && or_matches && self.bits.len() == self.pinnames.len()
    }
}

/// A candidate pin: an input or an output of the PAL under analysis.
#[derive(Debug, Clone)]
pub struct Pin {
    pub name: String,
    pub pin_number: u32,
    pub bit_position: u32,
    pub bit_mask: u32,

    /// Set only for output pins: the address bit that externally forces
    /// hi-z when toggled, if the profile wires one up for this pin.
    pub hiz_probe_bit_position: Option<u32>,
    pub hiz_probe_bit_mask: u32,

    pub seen_high: bool,
    pub seen_low: bool,

    pub depends: PinDependencies,
    pub oe_depends: PinDependencies,

    pub positive_terms: BTreeSet<u32>,
    pub negative_terms: BTreeSet<u32>,
    pub dont_care_terms: BTreeSet<u32>,

    pub oe_positive_terms: BTreeSet<u32>,
    pub oe_negative_terms: BTreeSet<u32>,

    /// Human-readable literal conjunction for minterm `i`, indexed the
    /// same way as `positive_terms`/`negative_terms`/`dont_care_terms`.
    /// Filled in by the Minterm Builder; read back by the truth-table
    /// writer so it never has to re-derive literals from raw integers.
    pub conditions: Vec<String>,
}

impl Pin {
    fn input(name: String, pin_number: u32, bit_position: u32) -> Self {
        Self {
            name,
            pin_number,
            bit_position,
            bit_mask: 1 << bit_position,
            hiz_probe_bit_position: None,
            hiz_probe_bit_mask: 0,
            seen_high: false,
            seen_low: false,
            depends: PinDependencies::new(),
            oe_depends: PinDependencies::new(),
            positive_terms: BTreeSet::new(),
            negative_terms: BTreeSet::new(),
            dont_care_terms: BTreeSet::new(),
            oe_positive_terms: BTreeSet::new(),
            oe_negative_terms: BTreeSet::new(),
            conditions: Vec::new(),
        }
    }

    fn output(
        name: String,
        pin_number: u32,
        bit_position: u32,
        hiz_probe_bit_position: Option<u32>,
    ) -> Self {
        let mut pin = Self::input(name, pin_number, bit_position);
        pin.hiz_probe_bit_position = hiz_probe_bit_position;
        pin.hiz_probe_bit_mask = hiz_probe_bit_position.map(|p| 1 << p).unwrap_or(0);
        pin
    }

}

/// Built pin sets: exactly `A` input pins and `O` output pins (§4.1).
pub struct PinModel {
    pub inputs: Vec<Pin>,
    pub outputs: Vec<Pin>,
}

/// Construct the candidate input/output pins from a profile.
///
/// Fails with `UnnamedPin` if any referenced PAL pin has no name in the
/// profile (checked already at profile-load time, but re-validated here
/// since a `DeviceProfile` can in principle be constructed by hand).
pub fn build_pin_model(profile: &DeviceProfile) -> Result<PinModel> {
    let mut inputs = Vec::with_capacity(profile.address_pins.len());
    for (bit_position, &pin_number) in profile.address_pins.iter().enumerate() {
        let name = profile.pin_name(pin_number)?.to_string();
        inputs.push(Pin::input(name, pin_number, bit_position as u32));
    }

    let mut outputs = Vec::with_capacity(profile.output_pin_count);
    for (bit_position, &pin_number) in profile
        .data_pins
        .iter()
        .take(profile.output_pin_count)
        .enumerate()
    {
        let name = profile.pin_name(pin_number)?.to_string();
        let hiz_probe_bit_position = profile
            .address_pins
            .iter()
            .position(|&p| p == pin_number)
            .map(|idx| idx as u32);
        outputs.push(Pin::output(
            name,
            pin_number,
            bit_position as u32,
            hiz_probe_bit_position,
        ));
    }

    Ok(PinModel { inputs, outputs })
}
