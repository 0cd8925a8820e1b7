pub mod bits;
pub mod dependency;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod image;
pub mod minimizer;
pub mod minterm;
pub mod pin;
pub mod profile;

pub use emitter::{EmitOptions, EmittedDocument, Polarity};
pub use error::{PalError, Result};
pub use image::MemoryImage;
pub use minimizer::{MinimizedForm, Minimizer, Product, QuineMcCluskey};
pub use pin::{Pin, PinDependencies, PinModel};
pub use profile::{DeviceProfile, Endianness, ProfileSet};
