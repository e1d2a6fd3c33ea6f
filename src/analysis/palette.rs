//! Dominant color extraction
//!
//! Modified median-cut quantization over a 5-bit-per-channel color cube.
//! Boxes are split by population first, then by population × volume, so
//! large sparse regions still get a representative color.

use super::{AnalysisError, Rgb};

const SIGBITS: usize = 5;
const RSHIFT: usize = 8 - SIGBITS;
const SIDE: usize = 1 << SIGBITS;
const HISTO_SIZE: usize = 1 << (3 * SIGBITS);
const MAX_ITERATIONS: usize = 1000;
const FRACT_BY_POPULATION: f64 = 0.75;

/// Pixels below this alpha are treated as background
const MIN_ALPHA: u8 = 125;
/// Pixels with every channel above this are treated as blank canvas
const WHITE_CUTOFF: u8 = 250;

pub const MIN_COLORS: usize = 2;
pub const MAX_COLORS: usize = 256;

#[inline]
fn color_index(r: usize, g: usize, b: usize) -> usize {
    (r << (2 * SIGBITS)) + (g << SIGBITS) + b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Red,
    Green,
    Blue,
}

/// Axis-aligned box in the quantized color cube (inclusive bounds)
#[derive(Debug, Clone)]
struct ColorBox {
    r: (usize, usize),
    g: (usize, usize),
    b: (usize, usize),
    count: u64,
}

impl ColorBox {
    /// Box over the given bounds, shrunk to the extent of its populated cells
    fn new(r: (usize, usize), g: (usize, usize), b: (usize, usize), histo: &[u64]) -> Self {
        let mut vbox = Self { r, g, b, count: 0 };
        let mut count = 0u64;
        let mut tight: Option<[(usize, usize); 3]> = None;

        for (cr, cg, cb, idx) in vbox.cells() {
            let hval = histo[idx];
            if hval == 0 {
                continue;
            }
            count += hval;
            let bounds = tight.get_or_insert([(cr, cr), (cg, cg), (cb, cb)]);
            for (range, v) in bounds.iter_mut().zip([cr, cg, cb]) {
                range.0 = range.0.min(v);
                range.1 = range.1.max(v);
            }
        }

        if let Some([r, g, b]) = tight {
            vbox.r = r;
            vbox.g = g;
            vbox.b = b;
        }
        vbox.count = count;
        vbox
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, usize, usize)> + '_ {
        (self.r.0..=self.r.1).flat_map(move |r| {
            (self.g.0..=self.g.1).flat_map(move |g| {
                (self.b.0..=self.b.1).map(move |b| (r, g, b, color_index(r, g, b)))
            })
        })
    }

    fn width(range: (usize, usize)) -> usize {
        range.1 - range.0 + 1
    }

    fn volume(&self) -> u64 {
        (Self::width(self.r) * Self::width(self.g) * Self::width(self.b)) as u64
    }

    fn can_split(&self) -> bool {
        self.count >= 2 && self.volume() > 1
    }

    fn range(&self, axis: Axis) -> (usize, usize) {
        match axis {
            Axis::Red => self.r,
            Axis::Green => self.g,
            Axis::Blue => self.b,
        }
    }

    fn with_range(&self, axis: Axis, range: (usize, usize), histo: &[u64]) -> Self {
        let (mut r, mut g, mut b) = (self.r, self.g, self.b);
        match axis {
            Axis::Red => r = range,
            Axis::Green => g = range,
            Axis::Blue => b = range,
        }
        Self::new(r, g, b, histo)
    }

    fn widest_axis(&self) -> Axis {
        let (rw, gw, bw) = (Self::width(self.r), Self::width(self.g), Self::width(self.b));
        let max = rw.max(gw).max(bw);
        if max == rw {
            Axis::Red
        } else if max == gw {
            Axis::Green
        } else {
            Axis::Blue
        }
    }

    /// Population-weighted mean color, scaled back to 8 bits
    fn average(&self, histo: &[u64]) -> Rgb {
        let mult = (1usize << RSHIFT) as f64;

        if self.count == 0 {
            let mid = |range: (usize, usize)| (mult * (range.0 + range.1 + 1) as f64 / 2.0) as u8;
            return [mid(self.r), mid(self.g), mid(self.b)];
        }

        let (mut rsum, mut gsum, mut bsum) = (0.0f64, 0.0f64, 0.0f64);
        for (r, g, b, idx) in self.cells() {
            let hval = histo[idx] as f64;
            rsum += hval * (r as f64 + 0.5) * mult;
            gsum += hval * (g as f64 + 0.5) * mult;
            bsum += hval * (b as f64 + 0.5) * mult;
        }

        let total = self.count as f64;
        [(rsum / total) as u8, (gsum / total) as u8, (bsum / total) as u8]
    }

    /// Number of pixels in the slice `value` of `axis`
    fn slice_count(&self, axis: Axis, value: usize, histo: &[u64]) -> u64 {
        let mut slice = self.clone();
        match axis {
            Axis::Red => slice.r = (value, value),
            Axis::Green => slice.g = (value, value),
            Axis::Blue => slice.b = (value, value),
        }
        slice.cells().map(|(_, _, _, idx)| histo[idx]).sum()
    }
}

/// Split a box at the median of its widest axis.
///
/// The cut lands halfway between the median and the far edge of the larger
/// side. Boxes are tight, so both end slices are populated and any cut in
/// `lo..hi` leaves pixels on each side.
fn median_cut(vbox: &ColorBox, histo: &[u64]) -> Option<(ColorBox, ColorBox)> {
    if !vbox.can_split() {
        return None;
    }

    let axis = vbox.widest_axis();
    let (lo, hi) = vbox.range(axis);

    let mut partial = [0u64; SIDE];
    let mut total = 0u64;
    for i in lo..=hi {
        total += vbox.slice_count(axis, i, histo);
        partial[i] = total;
    }

    let median = (lo..=hi).find(|&i| partial[i] * 2 > total)?;

    let left = (median - lo) as f64;
    let right = (hi - median) as f64;
    let cut = if left <= right {
        (median as f64 + right / 2.0) as i64
    } else {
        (median as f64 - 1.0 - left / 2.0) as i64
    };
    let cut = cut.clamp(lo as i64, hi as i64 - 1) as usize;

    Some((
        vbox.with_range(axis, (lo, cut), histo),
        vbox.with_range(axis, (cut + 1, hi), histo),
    ))
}

/// Keep splitting the highest-ranked splittable box until `target` boxes exist
fn split_boxes<F>(boxes: &mut Vec<ColorBox>, target: usize, histo: &[u64], rank: F)
where
    F: Fn(&ColorBox) -> u64,
{
    let mut iterations = 0;

    while boxes.len() < target && iterations < MAX_ITERATIONS {
        iterations += 1;
        boxes.sort_by_key(|b| rank(b));

        let Some(pos) = boxes.iter().rposition(ColorBox::can_split) else {
            return;
        };
        let vbox = boxes.remove(pos);

        match median_cut(&vbox, histo) {
            Some((first, second)) => {
                boxes.push(first);
                boxes.push(second);
            }
            None => {
                boxes.push(vbox);
                return;
            }
        }
    }
}

/// Extract up to `color_count` dominant colors, most populous first.
pub fn extract_palette<I>(pixels: I, color_count: usize) -> Result<Vec<Rgb>, AnalysisError>
where
    I: IntoIterator<Item = [u8; 4]>,
{
    if !(MIN_COLORS..=MAX_COLORS).contains(&color_count) {
        return Err(AnalysisError::InvalidPaletteSize(color_count));
    }

    let mut histo = vec![0u64; HISTO_SIZE];
    let mut usable = 0u64;

    for [r, g, b, a] in pixels {
        if a < MIN_ALPHA || (r > WHITE_CUTOFF && g > WHITE_CUTOFF && b > WHITE_CUTOFF) {
            continue;
        }
        let (r, g, b) = (r as usize >> RSHIFT, g as usize >> RSHIFT, b as usize >> RSHIFT);
        histo[color_index(r, g, b)] += 1;
        usable += 1;
    }

    if usable == 0 {
        return Err(AnalysisError::NoUsablePixels);
    }

    let full = (0, SIDE - 1);
    let mut boxes = vec![ColorBox::new(full, full, full, &histo)];

    let by_population = ((FRACT_BY_POPULATION * color_count as f64).ceil() as usize).max(1);
    split_boxes(&mut boxes, by_population, &histo, |b| b.count);
    split_boxes(&mut boxes, color_count, &histo, |b| b.count * b.volume());

    boxes.retain(|b| b.count > 0);
    boxes.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(boxes.iter().map(|b| b.average(&histo)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: [u8; 3], n: usize) -> Vec<[u8; 4]> {
        vec![[color[0], color[1], color[2], 255]; n]
    }

    #[test]
    fn test_single_color_yields_one_entry() {
        let palette = extract_palette(solid([200, 40, 40], 500), 8).unwrap();
        assert_eq!(palette.len(), 1);

        let [r, g, b] = palette[0];
        assert!((196..=207).contains(&r), "red was {r}");
        assert!((36..=47).contains(&g), "green was {g}");
        assert!((36..=47).contains(&b), "blue was {b}");
    }

    #[test]
    fn test_two_colors_are_separated() {
        let mut pixels = solid([250, 10, 10], 300);
        pixels.extend(solid([10, 10, 250], 100));

        let palette = extract_palette(pixels, 4).unwrap();
        assert_eq!(palette.len(), 2);
        // Most populous first
        assert!(palette[0][0] > 200 && palette[0][2] < 30);
        assert!(palette[1][2] > 200 && palette[1][0] < 30);
    }

    #[test]
    fn test_palette_respects_color_count() {
        let pixels: Vec<[u8; 4]> = (0..4096u32)
            .map(|i| [(i % 256) as u8, ((i / 16) % 256) as u8, ((i * 7) % 256) as u8, 255])
            .collect();

        let palette = extract_palette(pixels, 8).unwrap();
        assert_eq!(palette.len(), 8);
    }

    #[test]
    fn test_separated_colors_fill_the_palette() {
        let levels = [0u8, 120, 240];
        let colors: Vec<[u8; 3]> = levels
            .iter()
            .flat_map(|&r| levels.iter().flat_map(move |&g| [[r, g, 0], [r, g, 120]]))
            .take(12)
            .collect();
        assert_eq!(colors.len(), 12);

        let pixels: Vec<[u8; 4]> = colors
            .iter()
            .enumerate()
            .flat_map(|(i, &c)| solid(c, 10 + i))
            .collect();

        let palette = extract_palette(pixels, 8).unwrap();
        assert_eq!(palette.len(), 8);
    }

    #[test]
    fn test_skips_transparent_and_white_pixels() {
        let mut pixels = vec![[255, 255, 255, 255]; 1000];
        pixels.extend(vec![[10, 200, 10, 0]; 1000]);
        pixels.extend(solid([30, 90, 160], 5));

        let palette = extract_palette(pixels, 8).unwrap();
        assert_eq!(palette.len(), 1);
        assert!(palette[0][2] > palette[0][0]);
    }

    #[test]
    fn test_blank_image_is_rejected() {
        let pixels = vec![[255, 255, 255, 255]; 64];
        assert!(matches!(extract_palette(pixels, 8), Err(AnalysisError::NoUsablePixels)));
    }

    #[test]
    fn test_invalid_palette_size() {
        assert!(matches!(
            extract_palette(solid([1, 2, 3], 4), 1),
            Err(AnalysisError::InvalidPaletteSize(1))
        ));
        assert!(matches!(
            extract_palette(solid([1, 2, 3], 4), 257),
            Err(AnalysisError::InvalidPaletteSize(257))
        ));
    }

    #[test]
    fn test_median_cut_keeps_population() {
        let mut histo = vec![0u64; HISTO_SIZE];
        histo[color_index(0, 0, 0)] = 10;
        histo[color_index(31, 0, 0)] = 30;
        let vbox = ColorBox::new((0, 31), (0, 0), (0, 0), &histo);

        let (first, second) = median_cut(&vbox, &histo).unwrap();
        assert_eq!(first.count + second.count, 40);
        assert!(first.count > 0 && second.count > 0);
        assert!(first.r.1 < second.r.0);
    }

    #[test]
    fn test_boxes_shrink_to_populated_cells() {
        let mut histo = vec![0u64; HISTO_SIZE];
        histo[color_index(0, 0, 0)] = 5;
        histo[color_index(3, 0, 0)] = 5;
        let vbox = ColorBox::new((0, 3), (0, 31), (0, 0), &histo);

        assert_eq!(vbox.r, (0, 3));
        assert_eq!(vbox.g, (0, 0));
        assert_eq!(vbox.count, 10);
    }

    #[test]
    fn test_median_cut_never_leaves_an_empty_half() {
        let mut histo = vec![0u64; HISTO_SIZE];
        histo[color_index(0, 0, 0)] = 5;
        histo[color_index(3, 0, 0)] = 5;
        // Green spans the whole axis but is populated in a single slice
        let vbox = ColorBox::new((0, 3), (0, 31), (0, 0), &histo);

        let (first, second) = median_cut(&vbox, &histo).unwrap();
        assert_eq!(first.count, 5);
        assert_eq!(second.count, 5);
        assert_eq!(first.g, (0, 0));
        assert_eq!(second.g, (0, 0));
    }
}
