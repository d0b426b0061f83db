//! Circumstellar habitable zone estimate.
//!
//! Zone edges scale with the square root of stellar luminosity:
//! `0.95·√L` to `1.37·√L` AU, with `L` in solar luminosities.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Star {
    SunLike,
    RedDwarf,
    BlueGiant,
    RedGiant,
}

impl Star {
    pub const ALL: [Star; 4] = [Star::SunLike, Star::RedDwarf, Star::BlueGiant, Star::RedGiant];

    /// Luminosity in L☉.
    pub fn luminosity(self) -> f64 {
        match self {
            Star::SunLike => 1.0,
            Star::RedDwarf => 0.04,
            Star::BlueGiant => 10_000.0,
            Star::RedGiant => 100.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Star::SunLike => "Sun-like (G-type)",
            Star::RedDwarf => "Red Dwarf (M-type)",
            Star::BlueGiant => "Blue Giant (O-type)",
            Star::RedGiant => "Red Giant",
        }
    }

    pub fn habitable_zone(self) -> HabitableZone {
        HabitableZone::for_luminosity(self.luminosity())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    TooHot,
    Habitable,
    TooCold,
}

/// Inner and outer edge in AU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HabitableZone {
    pub inner: f64,
    pub outer: f64,
}

impl HabitableZone {
    pub fn for_luminosity(luminosity: f64) -> Self {
        let root = luminosity.max(0.0).sqrt();
        Self {
            inner: 0.95 * root,
            outer: 1.37 * root,
        }
    }

    /// Edges count as habitable.
    pub fn classify(&self, distance_au: f64) -> Zone {
        if distance_au < self.inner {
            Zone::TooHot
        } else if distance_au > self.outer {
            Zone::TooCold
        } else {
            Zone::Habitable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earth_is_habitable() {
        assert_eq!(Star::SunLike.habitable_zone().classify(1.0), Zone::Habitable);
        assert_eq!(Star::SunLike.habitable_zone().classify(0.7), Zone::TooHot);
        assert_eq!(Star::SunLike.habitable_zone().classify(1.5), Zone::TooCold);
    }

    #[test]
    fn test_zone_scales_with_root_luminosity() {
        let dwarf = Star::RedDwarf.habitable_zone();
        assert!((dwarf.inner - 0.19).abs() < 1e-9);
        assert!((dwarf.outer - 0.274).abs() < 1e-9);

        let giant = Star::BlueGiant.habitable_zone();
        assert!((giant.inner - 95.0).abs() < 1e-9);
        assert_eq!(giant.classify(1.0), Zone::TooHot);
        assert_eq!(giant.classify(130.0), Zone::Habitable);
    }
}
