//! Equal-width histogram binning.

use serde::Serialize;

/// Upper bound on the default bin count.
pub const DEFAULT_MAX_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Center of the bin, used as its label.
    pub midpoint: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|b| b.count).collect()
    }

    fn empty() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            bin_width: 0.0,
            bins: Vec::new(),
        }
    }
}

/// `min(max_bins, ceil(sqrt(n)))`, at least one bin.
pub fn default_bin_count(n: usize, max_bins: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).clamp(1, max_bins.max(1))
}

/// Bucket the finite entries of `values` into equal-width bins.
///
/// When `bin_count` is `None` the default rule is used. If all values are
/// equal a single bin of width 0 holds them all.
pub fn histogram(values: &[f64], bin_count: Option<usize>) -> Histogram {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Histogram::empty();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return Histogram {
            min,
            max,
            bin_width: 0.0,
            bins: vec![HistogramBin {
                midpoint: min,
                count: finite.len(),
            }],
        };
    }

    let bin_count = bin_count
        .unwrap_or_else(|| default_bin_count(finite.len(), DEFAULT_MAX_BINS))
        .max(1);
    // Work on halved values so `max - min` stays finite for spans beyond
    // f64::MAX. Halving is exact, so ordinary ranges bin identically.
    let (half_min, half_max) = (min / 2.0, max / 2.0);
    let half_width = (half_max - half_min) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for v in &finite {
        let bin = (((v / 2.0 - half_min) / half_width).floor() as usize).min(bin_count - 1);
        counts[bin] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            midpoint: (half_min + (i as f64 + 0.5) * half_width) * 2.0,
            count,
        })
        .collect();

    Histogram {
        min,
        max,
        bin_width: half_width * 2.0,
        bins,
    }
}
