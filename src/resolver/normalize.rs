//! Option normalization.
//!
//! Turns the raw request into the effective option set: defaults are filled
//! in, options that do not exist on the platform are deleted, and options
//! nullified by another option are deleted. Deletion (not `false`) is the
//! signal downstream code checks for.
//!
//! Normalization never fails; impossible combinations are the validator's
//! business.

use crate::core::options::{OptionName, OptionSet};
use crate::core::platform::PlatformDescriptor;

/// Compute the effective option set.
pub fn normalize(platform: &PlatformDescriptor, raw: &OptionSet) -> OptionSet {
    let mut effective = raw.clone();

    for name in OptionName::ALL {
        if !effective.contains(name) {
            effective.set(name, name.default_value());
        }
    }

    for name in OptionName::ALL {
        if !name.exists_on(platform.os) && effective.remove(name).is_some() {
            tracing::debug!("Removing `{}`: not available on {}", name, platform.os);
        }
    }

    // Shared output wins over the static-only toggle.
    if effective.is_enabled(OptionName::Shared) && effective.remove(OptionName::Fpic).is_some() {
        tracing::debug!("Removing `fPIC`: implied by shared libraries");
    }

    if effective.is_enabled(OptionName::LiteMode) {
        effective.remove(OptionName::WithTls);
        effective.remove(OptionName::WithCompression);
        tracing::debug!("Removing optional integrations: lite mode");
    }

    effective
}
