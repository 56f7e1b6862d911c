//! Bounded Nelder-Mead simplex minimization.
//!
//! Derivative-free minimizer used to drive the double-logistic least-squares
//! fit. Every candidate point is clamped to the per-parameter bounds before
//! evaluation, so the search never leaves the feasible box.

/// Per-dimension lower/upper bounds. Use infinities for unbounded sides.
pub type Bounds = Vec<(f64, f64)>;

/// Configuration for the simplex search.
#[derive(Debug, Clone)]
pub struct SimplexConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the value spread and simplex diameter.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub reflection: f64,
    /// Expansion coefficient.
    pub expansion: f64,
    /// Contraction coefficient.
    pub contraction: f64,
    /// Shrinkage coefficient.
    pub shrink: f64,
    /// Relative step used to seed the initial simplex.
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tolerance: 1e-10,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a simplex search.
#[derive(Debug, Clone)]
pub struct SimplexResult {
    /// Best point found (within bounds).
    pub point: Vec<f64>,
    /// Objective value at the best point.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the convergence criteria were met within the budget.
    pub converged: bool,
}

/// Minimize `objective` starting from `initial`, constrained to `bounds`.
pub fn minimize_bounded<F>(
    objective: F,
    initial: &[f64],
    bounds: &Bounds,
    config: &SimplexConfig,
) -> SimplexResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return SimplexResult {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: &[f64]| -> Vec<f64> {
        point
            .iter()
            .zip(bounds.iter())
            .map(|(&x, &(lo, hi))| x.clamp(lo, hi))
            .collect()
    };

    // Seed the simplex with the initial point plus one perturbed vertex
    // per dimension.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(clamp(initial));
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        simplex.push(clamp(&vertex));
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let best = order[0];
        let second_worst = order[n - 1];
        let worst = order[n];

        if values[worst] - values[best] < config.tolerance {
            converged = true;
            break;
        }

        let centroid = centroid_excluding(&simplex, worst);
        let diameter = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if diameter < config.tolerance {
            converged = true;
            break;
        }

        let towards = |from: &[f64], coeff: f64| -> Vec<f64> {
            let moved: Vec<f64> = centroid
                .iter()
                .zip(from.iter())
                .map(|(c, p)| c + coeff * (p - c))
                .collect();
            clamp(&moved)
        };

        // Reflection through the centroid, away from the worst vertex.
        let reflected = towards(&simplex[worst], -config.reflection);
        let reflected_value = objective(&reflected);

        if reflected_value < values[second_worst] && reflected_value >= values[best] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        if reflected_value < values[best] {
            let expanded = towards(&reflected, config.expansion);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        // Contraction toward the better of the reflected/worst points.
        // The inside case requires strict improvement, otherwise a flat
        // objective admits a no-progress step instead of shrinking.
        let outside = reflected_value < values[worst];
        let (anchor, anchor_value) = if outside {
            (&reflected, reflected_value)
        } else {
            (&simplex[worst], values[worst])
        };
        let contracted = towards(anchor, config.contraction);
        let contracted_value = objective(&contracted);
        let accepted = if outside {
            contracted_value <= anchor_value
        } else {
            contracted_value < anchor_value
        };
        if accepted {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink everything toward the best vertex.
        let anchor = simplex[best].clone();
        for (i, vertex) in simplex.iter_mut().enumerate() {
            if i == best {
                continue;
            }
            for (x, a) in vertex.iter_mut().zip(anchor.iter()) {
                *x = a + config.shrink * (*x - a);
            }
            *vertex = clamp(vertex);
            values[i] = objective(vertex);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    SimplexResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

fn centroid_excluding(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude {
            for (c, x) in centroid.iter_mut().zip(vertex.iter()) {
                *c += x;
            }
        }
    }
    for c in &mut centroid {
        *c /= count;
    }
    centroid
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
