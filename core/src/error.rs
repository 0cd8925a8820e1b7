//! Fatal error conditions for profile loading, image decoding, and extraction.

use thiserror::Error;

/// Errors the engine can raise. Every variant is fatal: the core has no
/// partial-result mode and no retries (see §7 of the design).
#[derive(Debug, Error)]
pub enum PalError {
    /// A named profile was not found in the config, or `auto` device-type
    /// detection matched no profile by image size.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// The dump file's length does not match `2^address_width *
    /// ceil(data_width / 8)` for the selected profile.
    #[error("image size mismatch: expected {expected} bytes for profile `{profile}`, found {actual}")]
    ImageSizeMismatch {
        profile: String,
        expected: usize,
        actual: usize,
    },

    /// §4.3 could not find any sub-address where `op` is actively driven
    /// for an otherwise-relevant input combination. Indicates the dump is
    /// incomplete or the profile is wrong; never promoted to a don't-care.
    #[error("no driving combination found for pin `{pin}` at sub-address {sub_addr:#x}")]
    NoDriveForCombination { pin: String, sub_addr: u32 },

    /// The profile config failed to parse as TOML, or a selected profile
    /// is missing a required field / has an inconsistent pin mapping.
    #[error("profile parse error: {0}")]
    ProfileParseError(String),

    /// A PAL pin referenced by `address_pins`/`data_pins` has no entry in
    /// `pin_names` (§4.1).
    #[error("pin {0} has no symbolic name in the profile")]
    UnnamedPin(u32),
}

pub type Result<T> = std::result::Result<T, PalError>;
