//! Gas mixture container
//!
//! A [`GasMixture`] holds the molar amount of every species together with a
//! temperature and a fixed volume. All derived quantities follow the ideal gas
//! law `P·V = n·R·T`, with pressure reported in kPa.
//!
//! Mutations clamp to zero instead of failing: no amount can ever become
//! negative, whatever delta the caller passes.

use crate::core_types::constants::{DEFAULT_TEMPERATURE, DEFAULT_VOLUME, DELTA_TIME, GAS_CONSTANT};
use crate::core_types::{Species, SPECIES_COUNT};
use serde::{Deserialize, Serialize};

/// Standard breathable air: oxygen amount (mol) in a default-volume cell
pub const STANDARD_AIR_OXYGEN: f32 = 20.79;

/// Standard breathable air: nitrogen amount (mol) in a default-volume cell
pub const STANDARD_AIR_NITROGEN: f32 = 83.17;

/// Per-species molar amounts with temperature and volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasMixture {
    amounts: [f32; SPECIES_COUNT],
    /// Temperature (K), never negative
    temperature: f32,
    /// Volume (m³)
    volume: f32,
}

impl Default for GasMixture {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl GasMixture {
    /// Create an empty mixture at the default temperature
    pub fn new(volume: f32) -> Self {
        Self {
            amounts: [0.0; SPECIES_COUNT],
            temperature: DEFAULT_TEMPERATURE,
            volume,
        }
    }

    /// Create a mixture of standard air (20.79 mol O2, 83.17 mol N2 at 293 K)
    pub fn standard_air(volume: f32) -> Self {
        let mut mixture = Self::new(volume);
        mixture.fill_standard_air();
        mixture
    }

    /// Replace the contents with standard air at 293 K
    pub(crate) fn fill_standard_air(&mut self) {
        self.clear();
        self.add(Species::Oxygen, STANDARD_AIR_OXYGEN);
        self.add(Species::Nitrogen, STANDARD_AIR_NITROGEN);
        self.set_temperature(DEFAULT_TEMPERATURE);
    }

    /// Amount of one species (mol)
    #[inline]
    pub fn get(&self, species: Species) -> f32 {
        self.amounts[species.index()]
    }

    /// All species amounts in storage order
    #[inline]
    pub fn amounts(&self) -> &[f32; SPECIES_COUNT] {
        &self.amounts
    }

    /// Add moles of a species, clamping the result at zero
    #[inline]
    pub fn add(&mut self, species: Species, amount: f32) {
        let slot = &mut self.amounts[species.index()];
        *slot = (*slot + amount).max(0.0);
    }

    /// Remove moles of a species, clamping the result at zero
    #[inline]
    pub fn remove(&mut self, species: Species, amount: f32) {
        let slot = &mut self.amounts[species.index()];
        *slot = (*slot - amount).max(0.0);
    }

    /// Overwrite amounts from a slice
    ///
    /// Extra entries beyond [`SPECIES_COUNT`] are ignored, missing entries keep
    /// their current value, negative entries become zero.
    pub fn set_all(&mut self, amounts: &[f32]) {
        for (slot, &amount) in self.amounts.iter_mut().zip(amounts) {
            *slot = amount.max(0.0);
        }
    }

    /// Remove all gas (temperature is kept)
    pub fn clear(&mut self) {
        self.amounts = [0.0; SPECIES_COUNT];
    }

    /// Temperature (K)
    #[inline]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Set temperature; negative or non-finite values are ignored
    pub fn set_temperature(&mut self, temperature: f32) {
        if temperature.is_finite() && temperature >= 0.0 {
            self.temperature = temperature;
        }
    }

    /// Volume (m³)
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Total amount of gas (mol)
    #[inline]
    pub fn total_moles(&self) -> f32 {
        self.amounts.iter().sum()
    }

    /// True when no species holds any gas
    pub fn is_empty(&self) -> bool {
        self.amounts.iter().all(|&amount| amount <= 0.0)
    }

    /// Pressure (kPa): `n·R·T / V / 1000`
    #[inline]
    pub fn pressure(&self) -> f32 {
        self.total_moles() * GAS_CONSTANT * self.temperature / self.volume / 1000.0
    }

    /// Partial pressure of one species (kPa)
    #[inline]
    pub fn partial_pressure(&self, species: Species) -> f32 {
        self.get(species) * GAS_CONSTANT * self.temperature / self.volume / 1000.0
    }

    /// Mole-weighted heat capacity of the mixture
    ///
    /// An empty mixture has no heat capacity and reports `0.0`.
    pub fn specific_heat(&self) -> f32 {
        let moles = self.total_moles();
        if moles <= 0.0 {
            return 0.0;
        }
        let weighted: f32 = Species::ALL
            .iter()
            .map(|&species| self.get(species) * species.heat_capacity())
            .sum();
        weighted / moles
    }

    /// Total mass (g)
    pub fn total_mass(&self) -> f32 {
        Species::ALL
            .iter()
            .map(|&species| self.get(species) * species.molar_mass())
            .sum()
    }

    /// Raise the temperature toward `target` (K)
    ///
    /// The step is `max(target − T, 0) / specific_heat · (100 / moles) · dt`,
    /// never overshooting the target. Empty mixtures are left untouched.
    pub fn add_heat(&mut self, target: f32) {
        let gap = (target - self.temperature).max(0.0);
        if let Some(rate) = self.heat_rate() {
            self.temperature += (gap * rate).min(gap);
        }
    }

    /// Lower the temperature toward `target` (K), never below zero
    ///
    /// Mirror image of [`GasMixture::add_heat`]. Empty mixtures are left untouched.
    pub fn remove_heat(&mut self, target: f32) {
        let gap = (self.temperature - target).max(0.0);
        if let Some(rate) = self.heat_rate() {
            self.temperature = (self.temperature - (gap * rate).min(gap)).max(0.0);
        }
    }

    /// Fraction of a temperature gap closed per heat step, `None` without heat capacity
    fn heat_rate(&self) -> Option<f32> {
        let moles = self.total_moles();
        let specific_heat = self.specific_heat();
        if moles <= 0.0 || specific_heat <= 0.0 {
            return None;
        }
        Some(100.0 / moles / specific_heat * DELTA_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_mixture_is_empty() {
        let mixture = GasMixture::default();
        assert!(mixture.is_empty());
        assert_eq!(mixture.total_moles(), 0.0);
        assert_eq!(mixture.pressure(), 0.0);
        assert_eq!(mixture.temperature(), 293.0);
        assert_eq!(mixture.volume(), 2.5);
    }

    #[test]
    fn test_standard_air_pressure() {
        let air = GasMixture::standard_air(2.5);
        let expected: f32 = (20.79 + 83.17) * 8.314 * 293.0 / 2.5 / 1000.0;
        assert_relative_eq!(air.pressure(), expected, max_relative = 1e-5);
        // Oxygen partial pressure sits above the 16 kPa suffocation limit
        assert!(air.partial_pressure(Species::Oxygen) > 16.0);
    }

    #[test]
    fn test_add_remove_clamp_to_zero() {
        let mut mixture = GasMixture::default();
        mixture.add(Species::Oxygen, 5.0);
        mixture.remove(Species::Oxygen, 12.0);
        assert_eq!(mixture.get(Species::Oxygen), 0.0);

        mixture.add(Species::Plasma, -3.0);
        assert_eq!(mixture.get(Species::Plasma), 0.0);
    }

    #[test]
    fn test_set_all_clamps_and_caps() {
        let mut mixture = GasMixture::default();
        mixture.set_all(&[1.0, -2.0, 3.0, 4.0, 99.0, 99.0]);
        assert_eq!(mixture.amounts(), &[1.0, 0.0, 3.0, 4.0]);

        mixture.set_all(&[7.0]);
        assert_eq!(mixture.amounts(), &[7.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn test_specific_heat_and_mass() {
        let mut mixture = GasMixture::default();
        assert_eq!(mixture.specific_heat(), 0.0);

        mixture.add(Species::Oxygen, 1.0);
        mixture.add(Species::Nitrogen, 1.0);
        assert_relative_eq!(mixture.specific_heat(), 11.0);
        assert_relative_eq!(mixture.total_mass(), 60.0);
    }

    #[test]
    fn test_heat_moves_toward_target() {
        let mut air = GasMixture::standard_air(2.5);
        air.add_heat(400.0);
        let warmed = air.temperature();
        assert!(warmed > 293.0 && warmed < 400.0);

        // A target below the current temperature does not heat
        air.add_heat(100.0);
        assert_eq!(air.temperature(), warmed);

        air.remove_heat(100.0);
        assert!(air.temperature() < warmed);
        assert!(air.temperature() > 100.0);
    }

    #[test]
    fn test_heat_never_overshoots_small_mixtures() {
        let mut mixture = GasMixture::default();
        mixture.add(Species::Plasma, 0.001);
        mixture.add_heat(500.0);
        assert_relative_eq!(mixture.temperature(), 500.0);

        mixture.remove_heat(0.0);
        assert_eq!(mixture.temperature(), 0.0);
    }

    #[test]
    fn test_heat_on_empty_mixture_is_noop() {
        let mut mixture = GasMixture::default();
        mixture.add_heat(1000.0);
        mixture.remove_heat(0.0);
        assert_eq!(mixture.temperature(), 293.0);
        assert!(mixture.temperature().is_finite());
    }

    #[test]
    fn test_set_temperature_rejects_negative() {
        let mut mixture = GasMixture::default();
        mixture.set_temperature(-5.0);
        mixture.set_temperature(f32::NAN);
        assert_eq!(mixture.temperature(), 293.0);
        mixture.set_temperature(0.0);
        assert_eq!(mixture.temperature(), 0.0);
    }
}
