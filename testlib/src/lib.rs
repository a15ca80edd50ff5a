use approx::assert_abs_diff_eq;
use ndarray::azip;
use rand::Rng;

/// vector of length `n` with a one at index `k`
pub fn eye_vector(n: usize, k: usize) -> ndarray::Array1<f64> {
    let mut v = ndarray::Array1::zeros(n);
    v[k] = 1.0;
    v
}

/// uniform sample in `[-scale, scale)`
fn symmetric<R: Rng>(rng: &mut R, scale: f64) -> f64 {
    (2.0 * rng.gen::<f64>() - 1.0) * scale
}

/// perturb `x` by less than `atol + rtol * |x|` per element
pub fn add_close_noise<S, R>(
    x: &ndarray::ArrayBase<S, ndarray::Ix1>,
    atol: f64,
    rtol: f64,
    rng: &mut R,
) -> ndarray::Array1<f64>
where
    S: ndarray::Data<Elem = f64>,
    R: Rng,
{
    x.mapv(|x| {
        let scale = symmetric(rng, rtol);
        let offset = symmetric(rng, atol);
        x + scale * x.abs() + offset
    })
}

/// reference/perturbed vector pairs and whether they are close
///
/// 1. all elements perturbed within the tolerances: close
/// 2. one element off by more than `atol`: not close
/// 3. the largest element off by more than `rtol`: not close
pub fn vector_pairs<R: Rng>(
    atol: f64,
    rtol: f64,
    rng: &mut R,
) -> Vec<(ndarray::Array1<f64>, ndarray::Array1<f64>, bool)> {
    let n = 100;
    let x = ndarray::Array1::from_shape_fn(n, |_| symmetric(rng, 1.0));

    let y = add_close_noise(&x, atol, rtol, rng);

    let mask = eye_vector(n, rng.gen_range(0..n));
    let x0 = &x * &mask.mapv(|m| 1.0 - m);
    let y0 = &x0 + &(&mask * (1.1 * atol));

    let (i, xi) = x
        .iter()
        .enumerate()
        .fold((0, 0.0f64), |acc, (i, v)| {
            if v.abs() > acc.1.abs() {
                (i, *v)
            } else {
                acc
            }
        });
    assert!(xi.abs() * rtol > atol, "rtol too small to be tested");
    let y1 = &x + &(eye_vector(n, i) * (3.0 * rtol * xi));

    vec![(x.clone(), y, true), (x0, y0, false), (x, y1, false)]
}

/// assert that two arrays of any dimension are equal up to 1e-6
pub fn assert_arr_eq<Sa, Sb, D>(a: &ndarray::ArrayBase<Sa, D>, b: &ndarray::ArrayBase<Sb, D>)
where
    Sa: ndarray::Data<Elem = f64>,
    Sb: ndarray::Data<Elem = f64>,
    D: ndarray::Dimension,
{
    assert_eq!(a.shape(), b.shape());

    azip!((a in a, b in b) assert_abs_diff_eq!(a, b, epsilon=1.0e-6));
}
