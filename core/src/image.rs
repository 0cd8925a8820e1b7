//! The memory image: a `2^A`-entry array of data words (§3, §4.7).

use crate::error::{PalError, Result};
use crate::profile::{DeviceProfile, Endianness};

/// A decoded EPROM dump: index is the address line value, entry is the
/// data word observed at that address. Always has length `2^address_width`.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    words: Vec<u32>,
}

impl MemoryImage {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn get(&self, addr: u32) -> u32 {
        self.words[addr as usize]
    }

    /// Decode raw bytes into a memory image for `profile`. Fails with
    /// `ImageSizeMismatch` if `bytes.len()` does not equal
    /// `profile.expected_image_bytes()`.
    pub fn decode(profile: &DeviceProfile, bytes: &[u8]) -> Result<Self> {
        let expected = profile.expected_image_bytes();
        if bytes.len() != expected {
            return Err(PalError::ImageSizeMismatch {
                profile: profile.name.clone(),
                expected,
                actual: bytes.len(),
            });
        }

        let word_bytes = (profile.data_width as usize + 7) / 8;
        let word_count = 1usize << profile.address_width;
        let mut words = Vec::with_capacity(word_count);

        for chunk in bytes.chunks_exact(word_bytes) {
            let mut word = 0u32;
            match profile.endianness {
                Endianness::Little => {
                    for (i, &b) in chunk.iter().enumerate() {
                        word |= (b as u32) << (8 * i);
                    }
                }
                Endianness::Big => {
                    for &b in chunk {
                        word = (word << 8) | b as u32;
                    }
                }
            }
            words.push(word);
        }

        Ok(Self { words })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn profile(endianness: &str) -> DeviceProfile {
        let mut pin_names = HashMap::new();
        pin_names.insert(2, "I0".to_string());
        pin_names.insert(12, "O".to_string());
        DeviceProfile {
            name: "test".into(),
            device_name: "TEST".into(),
            address_width: 1,
            data_width: 8,
            endianness: if endianness == "little" {
                Endianness::Little
            } else {
                Endianness::Big
            },
            address_pins: vec![2],
            data_pins: vec![12],
            pin_names,
            output_pin_count: 1,
            hiz_probe_pins: 0,
        }
    }

    #[test]
    fn decodes_little_endian_bytes() {
        let img = MemoryImage::decode(&profile("little"), &[0x01, 0xFF]).unwrap();
        assert_eq!(img.len(), 2);
        assert_eq!(img.get(0), 0x01);
        assert_eq!(img.get(1), 0xFF);
    }

    #[test]
    fn rejects_wrong_size() {
        assert!(MemoryImage::decode(&profile("little"), &[0x00]).is_err());
    }

    #[test]
    fn respects_word_endianness() {
        let mut p = profile("little");
        p.data_width = 16;
        p.address_width = 0;
        p.address_pins = vec![];
        let little = MemoryImage::decode(&p, &[0x34, 0x12]).unwrap();
        assert_eq!(little.get(0), 0x1234);

        p.endianness = Endianness::Big;
        let big = MemoryImage::decode(&p, &[0x12, 0x34]).unwrap();
        assert_eq!(big.get(0), 0x1234);
    }
}
