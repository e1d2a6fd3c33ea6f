//! Histogram similarity scoring

/// Cosine similarity of two vectors; 0 for mismatched or zero-length input
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let magnitude_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot / (magnitude_a * magnitude_b)
}

/// Map cosine similarity [-1, 1] onto a 0-100 fit percentage, 2 decimals
pub fn fit_score(a: &[f64], b: &[f64]) -> f64 {
    let percentage = (cosine_similarity(a, b) + 1.0) / 2.0 * 100.0;
    round2(percentage.clamp(0.0, 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
