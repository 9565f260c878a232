//! Tracked life-cycle metrics and the fixed-width vector that carries them.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

pub const METRIC_COUNT: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    TotalEnergy,
    FossilFuels,
    Coal,
    NaturalGas,
    Petroleum,
    Water,
    Voc,
    Co,
    Nox,
    Pm10,
    Pm25,
    Sox,
    Bc,
    Oc,
    Ch4,
    N2o,
    Co2,
    BiogenicCo2,
    Co2WithCarbonInVocCo,
    Ghg,
    UrbanVoc,
    UrbanCo,
    UrbanNox,
    UrbanPm10,
    UrbanPm25,
    UrbanSox,
    UrbanBc,
    UrbanOc,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Self::TotalEnergy,
        Self::FossilFuels,
        Self::Coal,
        Self::NaturalGas,
        Self::Petroleum,
        Self::Water,
        Self::Voc,
        Self::Co,
        Self::Nox,
        Self::Pm10,
        Self::Pm25,
        Self::Sox,
        Self::Bc,
        Self::Oc,
        Self::Ch4,
        Self::N2o,
        Self::Co2,
        Self::BiogenicCo2,
        Self::Co2WithCarbonInVocCo,
        Self::Ghg,
        Self::UrbanVoc,
        Self::UrbanCo,
        Self::UrbanNox,
        Self::UrbanPm10,
        Self::UrbanPm25,
        Self::UrbanSox,
        Self::UrbanBc,
        Self::UrbanOc,
    ];

    /// Energy metrics are tabulated in Btu and reported in MJ.
    pub const ENERGY: [Metric; 5] = [
        Self::TotalEnergy,
        Self::FossilFuels,
        Self::Coal,
        Self::NaturalGas,
        Self::Petroleum,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::TotalEnergy => "Total energy, Btu",
            Self::FossilFuels => "Fossil fuels, Btu",
            Self::Coal => "Coal, Btu",
            Self::NaturalGas => "Natural gas, Btu",
            Self::Petroleum => "Petroleum, Btu",
            Self::Water => "Water consumption: gallons",
            Self::Voc => "VOC",
            Self::Co => "CO",
            Self::Nox => "NOx",
            Self::Pm10 => "PM10",
            Self::Pm25 => "PM2.5",
            Self::Sox => "SOx",
            Self::Bc => "BC",
            Self::Oc => "OC",
            Self::Ch4 => "CH4",
            Self::N2o => "N2O",
            Self::Co2 => "CO2",
            Self::BiogenicCo2 => "Biogenic CO2",
            Self::Co2WithCarbonInVocCo => "CO2 (w/ C in VOC & CO)",
            Self::Ghg => "GHG",
            Self::UrbanVoc => "Urban VOC",
            Self::UrbanCo => "Urban CO",
            Self::UrbanNox => "Urban NOx",
            Self::UrbanPm10 => "Urban PM10",
            Self::UrbanPm25 => "Urban PM2.5",
            Self::UrbanSox => "Urban SOx",
            Self::UrbanBc => "Urban BC",
            Self::UrbanOc => "Urban OC",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        Self::ALL.into_iter().find(|metric| metric.name() == trimmed)
    }

    pub fn is_urban(self) -> bool {
        self.name().starts_with("Urban ")
    }

    /// Display unit of the per-functional-unit total.
    pub const fn display_unit(self) -> &'static str {
        match self {
            Self::TotalEnergy
            | Self::FossilFuels
            | Self::Coal
            | Self::NaturalGas
            | Self::Petroleum => "MJ",
            Self::Water => "gallons",
            _ => "g",
        }
    }

    /// Composite metrics are derived in the aggregator and never loaded.
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Co2WithCarbonInVocCo | Self::Ghg)
    }

    /// The urban counterpart of a criteria pollutant, if it has one.
    pub const fn urban_counterpart(self) -> Option<Self> {
        match self {
            Self::Voc => Some(Self::UrbanVoc),
            Self::Co => Some(Self::UrbanCo),
            Self::Nox => Some(Self::UrbanNox),
            Self::Pm10 => Some(Self::UrbanPm10),
            Self::Pm25 => Some(Self::UrbanPm25),
            Self::Sox => Some(Self::UrbanSox),
            Self::Bc => Some(Self::UrbanBc),
            Self::Oc => Some(Self::UrbanOc),
            _ => None,
        }
    }

    pub fn sum_column(self) -> String {
        format!("{}_Sum", self.name())
    }
}

/// One value per [`Metric`], in [`Metric::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricVector([f64; METRIC_COUNT]);

impl Default for MetricVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl MetricVector {
    pub const fn zero() -> Self {
        Self([0.0; METRIC_COUNT])
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Metric, f64)>,
    {
        let mut vector = Self::zero();
        for (metric, value) in pairs {
            vector[metric] = value;
        }
        vector
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    pub fn values(&self) -> &[f64; METRIC_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.into_iter().map(|metric| (metric, self.get(metric)))
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let mut scaled = *self;
        scaled.0.iter_mut().for_each(|value| *value *= factor);
        scaled
    }

    /// Scales urban-tagged metrics by `share`; every other metric passes through.
    pub fn with_urban_share(&self, share: f64) -> Self {
        let mut scaled = *self;
        for metric in Metric::ALL.into_iter().filter(|metric| metric.is_urban()) {
            scaled[metric] *= share;
        }
        scaled
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|value| *value == 0.0)
    }
}

impl Index<Metric> for MetricVector {
    type Output = f64;

    fn index(&self, metric: Metric) -> &Self::Output {
        &self.0[metric.index()]
    }
}

impl IndexMut<Metric> for MetricVector {
    fn index_mut(&mut self, metric: Metric) -> &mut Self::Output {
        &mut self.0[metric.index()]
    }
}

impl Add for MetricVector {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.0
            .iter_mut()
            .zip(rhs.0)
            .for_each(|(left, right)| *left += right);
        self
    }
}

impl Sub for MetricVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Neg for MetricVector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.scaled(-1.0)
    }
}

impl Mul<f64> for MetricVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scaled(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::{METRIC_COUNT, Metric, MetricVector};

    #[test]
    fn metric_names_round_trip_and_stay_in_declaration_order() {
        for (index, metric) in Metric::ALL.into_iter().enumerate() {
            assert_eq!(metric.index(), index);
            assert_eq!(Metric::from_name(metric.name()), Some(metric));
        }
        assert_eq!(Metric::from_name(" PM2.5 "), Some(Metric::Pm25));
        assert_eq!(Metric::from_name("Mercury"), None);
        assert_eq!(Metric::ALL.len(), METRIC_COUNT);
    }

    #[test]
    fn urban_share_touches_only_urban_metrics() {
        let vector = MetricVector::from_pairs([
            (Metric::Co2, 10.0),
            (Metric::Nox, 4.0),
            (Metric::UrbanNox, 4.0),
        ]);
        let scaled = vector.with_urban_share(0.25);

        assert_eq!(scaled[Metric::Co2], 10.0);
        assert_eq!(scaled[Metric::Nox], 4.0);
        assert_eq!(scaled[Metric::UrbanNox], 1.0);
    }

    #[test]
    fn arithmetic_is_elementwise() {
        let left = MetricVector::from_pairs([(Metric::Ch4, 2.0), (Metric::Co2, 1.0)]);
        let right = MetricVector::from_pairs([(Metric::Ch4, 0.5)]);

        let difference = left - right;
        assert_eq!(difference[Metric::Ch4], 1.5);
        assert_eq!(difference[Metric::Co2], 1.0);
        assert_eq!((left * 2.0)[Metric::Co2], 2.0);
        assert!(MetricVector::zero().is_zero());
    }

    #[test]
    fn sum_columns_use_suffix() {
        assert_eq!(Metric::Ghg.sum_column(), "GHG_Sum");
        assert_eq!(Metric::UrbanPm10.display_unit(), "g");
        assert_eq!(Metric::Coal.display_unit(), "MJ");
        assert!(Metric::UrbanBc.is_urban());
        assert!(!Metric::Bc.is_urban());
    }
}
