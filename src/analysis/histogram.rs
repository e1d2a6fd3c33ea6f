//! Per-channel color histograms built from a palette

use serde::Serialize;

use super::Rgb;

/// Normalized R‖G‖B histogram of palette colors over [0, 255]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorHistogram {
    pub bins: usize,
    pub values: Vec<f64>,
}

impl ColorHistogram {
    pub fn from_palette(palette: &[Rgb], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut values = vec![0.0f64; bins * 3];

        for color in palette {
            for (channel, &value) in color.iter().enumerate() {
                values[channel * bins + bin_index(value, bins)] += 1.0;
            }
        }

        let total: f64 = values.iter().sum();
        if total > 0.0 {
            values.iter_mut().for_each(|v| *v /= total);
        }

        Self { bins, values }
    }

    /// Slice for one channel (0 = red, 1 = green, 2 = blue)
    pub fn channel(&self, channel: usize) -> &[f64] {
        &self.values[channel * self.bins..(channel + 1) * self.bins]
    }
}

/// Equal-width bins over [0, 255]; the last bin is closed so 255 lands in it
fn bin_index(value: u8, bins: usize) -> usize {
    let idx = (value as f64 * bins as f64 / 255.0).floor() as usize;
    idx.min(bins - 1)
}
