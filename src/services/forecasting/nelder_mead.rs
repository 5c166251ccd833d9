//! Derivative-free minimization with the Nelder-Mead simplex method.
//!
//! Uses the standard coefficients (reflection 1, expansion 2, contraction
//! 0.5, shrink 0.5) and a fixed initial simplex, so results depend only on
//! the objective and the starting point.

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Stopping rules. Iteration stops once both the spread of objective values
/// and the spread of vertices fall below their tolerances, or after
/// `max_iterations`.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub max_iterations: usize,
    pub initial_step: f64,
    pub x_tolerance: f64,
    pub f_tolerance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            initial_step: 0.1,
            x_tolerance: 1e-6,
            f_tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `f` starting from `x0`.
///
/// Non-finite objective values are treated as `f64::MAX`, which keeps the
/// simplex ordering total.
pub fn minimize<F>(f: F, x0: &[f64], options: Options) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() { v } else { f64::MAX }
    };

    let n = x0.len();
    if n == 0 {
        return Minimum {
            x: Vec::new(),
            value: eval(x0),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(x0.to_vec());
    for i in 0..n {
        let mut vertex = x0.to_vec();
        vertex[i] += options.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        order(&mut simplex, &mut values);

        if has_converged(&simplex, &values, &options) {
            converged = true;
            break;
        }
        iterations += 1;

        let worst = n;
        let centroid = centroid(&simplex[..worst]);

        let reflected = along(&centroid, &simplex[worst], -REFLECTION);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = along(&centroid, &simplex[worst], -REFLECTION * EXPANSION);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[worst - 1] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        if f_reflected < values[worst] {
            // Outside contraction
            let contracted = along(&centroid, &simplex[worst], -REFLECTION * CONTRACTION);
            let f_contracted = eval(&contracted);
            if f_contracted <= f_reflected {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
                continue;
            }
        } else {
            // Inside contraction
            let contracted = along(&centroid, &simplex[worst], CONTRACTION);
            let f_contracted = eval(&contracted);
            if f_contracted < values[worst] {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
                continue;
            }
        }

        let best = simplex[0].clone();
        for i in 1..=n {
            for (x, b) in simplex[i].iter_mut().zip(&best) {
                *x = b + SHRINK * (*x - b);
            }
            values[i] = eval(&simplex[i]);
        }
    }

    order(&mut simplex, &mut values);
    Minimum {
        x: simplex.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    }
}

/// Sort vertices by objective value, best first. Ties keep their order.
fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

fn has_converged(simplex: &[Vec<f64>], values: &[f64], options: &Options) -> bool {
    let best = values[0];
    let f_spread = values.iter().map(|v| (v - best).abs()).fold(0.0, f64::max);
    let x_spread = simplex[1..]
        .iter()
        .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
        .fold(0.0, f64::max);

    f_spread <= options.f_tolerance * (1.0 + best.abs()) && x_spread <= options.x_tolerance
}

fn centroid(points: &[Vec<f64>]) -> Vec<f64> {
    let n = points.len() as f64;
    let mut c = vec![0.0; points[0].len()];
    for p in points {
        for (ci, pi) in c.iter_mut().zip(p) {
            *ci += pi / n;
        }
    }
    c
}

/// `centroid + t * (point - centroid)`
fn along(centroid: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + t * (p - c))
        .collect()
}
