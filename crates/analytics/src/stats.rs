use crate::report::LinearFit;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Means plus centered sums of squares and cross products: (mx, my, sxx, syy, sxy).
fn moments(xs: &[f64], ys: &[f64]) -> Option<(f64, f64, f64, f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(xs), mean(ys));
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    Some((mx, my, sxx, syy, sxy))
}

/// Pearson's r, clamped to `[-1, 1]`. `None` for fewer than two points or a constant series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let (_, _, sxx, syy, sxy) = moments(xs, ys)?;
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Least squares fit of `ys` on `xs`. `None` when `xs` has no spread.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let (mx, my, sxx, _, sxy) = moments(xs, ys)?;
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}
