//! Small descriptive statistics over `f64` slices

/// Arithmetic mean (0 for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Subtract the mean from every value
pub fn centered(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    values.iter().map(|v| v - m).collect()
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in `[0, 100]`. `sorted` must be ascending and non-empty.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Interquartile range (75th minus 25th percentile); 0 for empty input
pub fn iqr(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, 75.0) - percentile_sorted(&sorted, 25.0)
}

/// `n` evenly spaced points over `[start, stop]`, both ends exact
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            points[n - 1] = stop;
            points
        }
    }
}

/// Equal-width histogram over `range`, last edge inclusive.
///
/// Values outside the range are ignored. A zero-width range is widened
/// by 0.5 on each side. Returns `(edges, counts)` with `bins + 1` edges.
pub fn histogram(values: &[f64], bins: usize, range: (f64, f64)) -> (Vec<f64>, Vec<usize>) {
    let bins = bins.max(1);
    let (mut lo, mut hi) = range;
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let edges = linspace(lo, hi, bins + 1);
    let mut counts = vec![0usize; bins];
    let width = hi - lo;

    for &v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let idx = (((v - lo) / width) * bins as f64) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    (edges, counts)
}

/// Number of histogram bins picked automatically: the smaller of the
/// Sturges and Freedman-Diaconis bin widths (Sturges when the data has no
/// spread between its quartiles), capped at the number of values in range.
pub fn auto_bin_count(values: &[f64], range: (f64, f64)) -> usize {
    let (lo, hi) = range;
    let inside: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| (lo..=hi).contains(v))
        .collect();
    if inside.is_empty() || hi <= lo {
        return 1;
    }

    let n = inside.len() as f64;
    let (min, max) = inside
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| (a.min(v), b.max(v)));
    let ptp = max - min;

    let sturges = ptp / (n.log2() + 1.0);
    let fd = 2.0 * iqr(&inside) * n.powf(-1.0 / 3.0);
    let width = if fd > 0.0 { sturges.min(fd) } else { sturges };

    if width > 0.0 {
        let bins = ((hi - lo) / width).ceil().max(1.0);
        bins.min(n) as usize
    } else {
        1
    }
}
