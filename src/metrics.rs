/// Accuracy over committed words, as a percentage. Defined as 100.0 when
/// nothing has been committed yet.
pub fn accuracy(typed: usize, mistakes: usize) -> f64 {
    let total = typed + mistakes;
    if total == 0 {
        100.0
    } else {
        (typed as f64 / total as f64) * 100.0
    }
}

/// Correctly typed words projected to a per-minute rate over `elapsed_secs`.
pub fn words_per_minute(typed: usize, elapsed_secs: u64) -> f64 {
    if elapsed_secs == 0 {
        return 0.0;
    }
    typed as f64 * 60.0 / elapsed_secs as f64
}

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}
