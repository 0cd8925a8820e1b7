//! Device profiles: the declarative description of a PAL family (§3/§4.6).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PalError, Result};

/// Byte order used to decode the memory image's data words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// On-disk shape of one profile entry in the TOML profile config (§4.6).
#[derive(Debug, Clone, Deserialize)]
struct RawProfile {
    #[serde(default)]
    device_name: Option<String>,
    address_width: u32,
    data_width: u32,
    endianness: String,
    address_pins: Vec<u32>,
    data_pins: Vec<u32>,
    pin_names: HashMap<String, String>,
    output_pin_count: usize,
    hiz_probe_pins: u32,
}

/// A declarative description of one PAL family, immutable for a run.
///
/// Invariants: every index in `address_pins`/`data_pins` resolves to a
/// unique PAL pin number; `hiz_probe_pins <= address_width`;
/// `output_pin_count <= data_width`.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub name: String,
    pub device_name: String,
    pub address_width: u32,
    pub data_width: u32,
    pub endianness: Endianness,
    pub address_pins: Vec<u32>,
    pub data_pins: Vec<u32>,
    pub pin_names: HashMap<u32, String>,
    pub output_pin_count: usize,
    pub hiz_probe_pins: u32,
}

impl DeviceProfile {
    /// The exact byte length an image must have to match this profile:
    /// `2^address_width * ceil(data_width / 8)`.
    pub fn expected_image_bytes(&self) -> usize {
        let words = 1usize << self.address_width;
        let word_bytes = (self.data_width as usize + 7) / 8;
        words * word_bytes
    }

    /// Look up the symbolic name for a PAL pin number.
    pub fn pin_name(&self, pin_number: u32) -> Result<&str> {
        self.pin_names
            .get(&pin_number)
            .map(|s| s.as_str())
            .ok_or(PalError::UnnamedPin(pin_number))
    }

    fn from_raw(name: String, raw: RawProfile) -> Result<Self> {
        let endianness = match raw.endianness.to_lowercase().as_str() {
            "little" | "le" => Endianness::Little,
            "big" | "be" => Endianness::Big,
            other => {
                return Err(PalError::ProfileParseError(format!(
                    "profile `{name}`: unknown endianness `{other}` (expected `little` or `big`)"
                )))
            }
        };

        if raw.address_pins.len() != raw.address_width as usize {
            return Err(PalError::ProfileParseError(format!(
                "profile `{name}`: address_pins has {} entries, expected address_width={}",
                raw.address_pins.len(),
                raw.address_width
            )));
        }
        if raw.data_pins.len() != raw.data_width as usize {
            return Err(PalError::ProfileParseError(format!(
                "profile `{name}`: data_pins has {} entries, expected data_width={}",
                raw.data_pins.len(),
                raw.data_width
            )));
        }
        if raw.hiz_probe_pins > raw.address_width {
            return Err(PalError::ProfileParseError(format!(
                "profile `{name}`: hiz_probe_pins ({}) exceeds address_width ({})",
                raw.hiz_probe_pins, raw.address_width
            )));
        }
        if raw.output_pin_count > raw.data_width as usize {
            return Err(PalError::ProfileParseError(format!(
                "profile `{name}`: output_pin_count ({}) exceeds data_width ({})",
                raw.output_pin_count, raw.data_width
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for &p in raw.address_pins.iter().chain(raw.data_pins.iter()) {
            if !seen.insert(p) {
                return Err(PalError::ProfileParseError(format!(
                    "profile `{name}`: pin {p} is referenced by more than one bit position"
                )));
            }
        }

        let pin_names = raw
            .pin_names
            .into_iter()
            .map(|(k, v)| {
                k.parse::<u32>()
                    .map(|n| (n, v))
                    .map_err(|_| PalError::ProfileParseError(format!(
                        "profile `{name}`: pin_names key `{k}` is not a pin number"
                    )))
            })
            .collect::<Result<HashMap<u32, String>>>()?;

        let device_name = raw.device_name.unwrap_or_else(|| name.clone());

        let profile = DeviceProfile {
            name,
            device_name,
            address_width: raw.address_width,
            data_width: raw.data_width,
            endianness,
            address_pins: raw.address_pins,
            data_pins: raw.data_pins,
            pin_names,
            output_pin_count: raw.output_pin_count,
            hiz_probe_pins: raw.hiz_probe_pins,
        };

        for &p in profile.address_pins.iter().chain(profile.data_pins.iter()) {
            profile.pin_name(p)?;
        }

        Ok(profile)
    }
}

/// The set of named profiles loaded from a profile config file.
pub struct ProfileSet {
    profiles: Vec<DeviceProfile>,
}

impl ProfileSet {
    /// Load and parse a profile config file. Full-line comments (a line
    /// whose first non-whitespace character is `#`) are stripped before
    /// parsing, per §7's local-recovery rule.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PalError::ProfileParseError(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }

    fn parse(text: &str) -> Result<Self> {
        let stripped: String = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");

        let raw: HashMap<String, RawProfile> = toml::from_str(&stripped)
            .map_err(|e| PalError::ProfileParseError(e.to_string()))?;

        let mut profiles = Vec::with_capacity(raw.len());
        for (name, entry) in raw {
            profiles.push(DeviceProfile::from_raw(name, entry)?);
        }
        profiles.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self { profiles })
    }

    /// Resolve the active profile: an explicit name, or (when
    /// `device_type == "auto"`) the unique profile whose expected image
    /// size matches `image_len`.
    pub fn resolve(&self, device_type: &str, image_len: usize) -> Result<&DeviceProfile> {
        if device_type == "auto" {
            let mut matches = self
                .profiles
                .iter()
                .filter(|p| p.expected_image_bytes() == image_len);
            let first = matches.next();
            match (first, matches.next()) {
                (Some(p), None) => Ok(p),
                _ => Err(PalError::ProfileNotFound(format!(
                    "auto-detection found no unique profile for a {image_len}-byte image"
                ))),
            }
        } else {
            self.profiles
                .iter()
                .find(|p| p.name == device_type)
                .ok_or_else(|| PalError::ProfileNotFound(device_type.to_string()))
        }
    }
}
