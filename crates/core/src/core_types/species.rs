//! Gas species tracked by every mixture
//!
//! The species set is closed: each [`crate::GasMixture`] stores exactly
//! [`SPECIES_COUNT`] amounts indexed by [`Species::index`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of gas species tracked per mixture
pub const SPECIES_COUNT: usize = 4;

/// Gas species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Needed for breathing, below 16 kPa partial pressure causes suffocation
    Oxygen,
    /// Inert filler, dominates the heat capacity of air
    Nitrogen,
    /// Causes suffocation at 8 kPa partial pressure
    CarbonDioxide,
    /// Ignites at high pressure in the presence of oxygen
    Plasma,
}

impl Species {
    /// All species in storage order
    pub const ALL: [Species; SPECIES_COUNT] = [
        Species::Oxygen,
        Species::Nitrogen,
        Species::CarbonDioxide,
        Species::Plasma,
    ];

    /// Storage index of this species inside a mixture
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Species::Oxygen => 0,
            Species::Nitrogen => 1,
            Species::CarbonDioxide => 2,
            Species::Plasma => 3,
        }
    }

    /// Convert from a storage index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Heat capacity weight per mole, used by [`crate::GasMixture::specific_heat`]
    #[inline]
    pub const fn heat_capacity(self) -> f32 {
        match self {
            Species::Oxygen => 2.0,
            Species::Nitrogen => 20.0,
            Species::CarbonDioxide => 3.0,
            Species::Plasma => 1.0,
        }
    }

    /// Molar mass (g/mol)
    #[inline]
    pub const fn molar_mass(self) -> f32 {
        match self {
            Species::Oxygen => 32.0,
            Species::Nitrogen => 28.0,
            Species::CarbonDioxide => 44.0,
            Species::Plasma => 78.0,
        }
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        match self {
            Species::Oxygen => "Oxygen",
            Species::Nitrogen => "Nitrogen",
            Species::CarbonDioxide => "Carbon Dioxide",
            Species::Plasma => "Plasma",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_conversion() {
        for (i, species) in Species::ALL.iter().enumerate() {
            assert_eq!(species.index(), i);
            assert_eq!(Species::from_index(i), Some(*species));
        }
        assert_eq!(Species::from_index(SPECIES_COUNT), None);
    }

    #[test]
    fn test_nitrogen_dominates_heat_capacity() {
        assert!(Species::Nitrogen.heat_capacity() > Species::Oxygen.heat_capacity());
        assert_eq!(Species::Plasma.molar_mass(), 78.0);
        assert_eq!(Species::CarbonDioxide.to_string(), "Carbon Dioxide");
    }
}
