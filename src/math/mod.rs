/// `count` evenly spaced samples from `start` to `end`, endpoints included.
///
/// Spacing is `(end - start) / (count - 1)`; the last sample is pinned to
/// `end` so accumulated rounding cannot push it past the interval.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut samples: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            samples[count - 1] = end;
            samples
        }
    }
}

/// Index of the smallest element, first occurrence on ties.
pub fn argmin<T: PartialOrd>(values: &[T]) -> Option<usize> {
    let mut iter = values.iter().enumerate();
    let (mut best_index, mut best) = iter.next()?;

    for (index, value) in iter {
        if value < best {
            best_index = index;
            best = value;
        }
    }

    Some(best_index)
}
