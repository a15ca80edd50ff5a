use crate::Error;
use crate::Params;
use ndarray::Axis;
use ndarray::Dimension;
use ndarray::Slice;
use num_traits::Float;

/// an element that is not close, with the broadcast values of both inputs
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch<A> {
    pub index: Vec<usize>,
    pub a: A,
    pub b: A,
}

impl<A: std::fmt::Display> std::fmt::Display for Mismatch<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // same tuple syntax as the failing index would be written in python
        let index: Vec<String> = self.index.iter().map(|i| i.to_string()).collect();
        if index.len() == 1 {
            write!(f, "({},)", index[0])?;
        } else {
            write!(f, "({})", index.join(", "))?;
        }

        write!(f, ": {} {}", self.a, self.b)
    }
}

/// result of comparing two arrays
#[derive(Clone, Debug)]
pub struct Comparison<A> {
    /// all elements are close
    pub close: bool,
    /// root mean squared error, None if it's NaN
    pub rmse: Option<f64>,
    /// rmse relative to the mean rms of both inputs
    pub rel_rmse: Option<f64>,
    /// total number of elements that are not close
    pub num_mismatches: usize,
    /// the first `print_fail` elements that are not close
    pub mismatches: Vec<Mismatch<A>>,
}

impl<A: std::fmt::Display> std::fmt::Display for Comparison<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "allclose first {} failures:", self.num_mismatches)?;
        for mismatch in &self.mismatches {
            write!(f, "\n  {}", mismatch)?;
        }
        Ok(())
    }
}

struct Tolerance<A> {
    rtol: A,
    atol: A,
    equal_nan: bool,
}

impl<A: Float> Tolerance<A> {
    fn new(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            rtol: A::from(params.rtol).ok_or(Error::FloatConversion)?,
            atol: A::from(params.atol).ok_or(Error::FloatConversion)?,
            equal_nan: params.equal_nan,
        })
    }

    /// `b` is the reference, `rtol` is scaled by its magnitude only
    fn isclose(&self, a: A, b: A) -> bool {
        if a.is_nan() || b.is_nan() {
            return self.equal_nan && a.is_nan() && b.is_nan();
        }
        if a.is_infinite() || b.is_infinite() {
            return a == b;
        }

        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }

    fn isclose_arrays(
        &self,
        a: &ndarray::ArrayViewD<'_, A>,
        b: &ndarray::ArrayViewD<'_, A>,
    ) -> ndarray::ArrayD<bool> {
        ndarray::Zip::from(a)
            .and(b)
            .map_collect(|&a, &b| self.isclose(a, b))
    }
}

/// view of `x` with at least one dimension
fn atleast_1d<A, S, D>(x: &ndarray::ArrayBase<S, D>) -> ndarray::ArrayViewD<'_, A>
where
    S: ndarray::Data<Elem = A>,
    D: Dimension,
{
    let x = x.view().into_dyn();
    if x.ndim() == 0 {
        x.insert_axis(Axis(0))
    } else {
        x
    }
}

/// common shape of two arrays following numpy's broadcasting rules
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>, Error> {
    let ndim = a.len().max(b.len());
    let mut shape = vec![0; ndim];

    for (i, len) in shape.iter_mut().enumerate() {
        let la = if i + a.len() < ndim { 1 } else { a[i + a.len() - ndim] };
        let lb = if i + b.len() < ndim { 1 } else { b[i + b.len() - ndim] };

        *len = if la == lb || lb == 1 {
            la
        } else if la == 1 {
            lb
        } else {
            return Err(
                ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape).into(),
            );
        };
    }

    Ok(shape)
}

/// root mean square, NaN for empty arrays
pub fn rms<A, S, D>(x: &ndarray::ArrayBase<S, D>) -> f64
where
    A: Float,
    S: ndarray::Data<Elem = A>,
    D: ndarray::Dimension,
{
    if x.is_empty() {
        return f64::NAN;
    }

    let sum = x.iter().fold(0.0, |acc, v| {
        let v = v.to_f64().unwrap_or(f64::NAN);
        acc + v * v
    });
    (sum / x.len() as f64).sqrt()
}

/// compare two arrays element-wise
///
/// Both arrays are promoted to at least one dimension and broadcast against
/// each other. An element is close if `|a - b| <= atol + rtol * |b|`.
///
/// With `xtol > 0` an element of `a` is also close if it's close to an
/// element of `b` that's up to `xtol` positions away along the first axis.
/// The first and last `xtol` elements along that axis always count as close.
///
/// The error metrics are computed independent of the outcome.
pub fn compare<A, Sa, Sb, Da, Db>(
    a: &ndarray::ArrayBase<Sa, Da>,
    b: &ndarray::ArrayBase<Sb, Db>,
    params: &Params,
) -> Result<Comparison<A>, Error>
where
    A: Float,
    Sa: ndarray::Data<Elem = A>,
    Sb: ndarray::Data<Elem = A>,
    Da: ndarray::Dimension,
    Db: ndarray::Dimension,
{
    let tol = Tolerance::new(params)?;
    let a = atleast_1d(a);
    let b = atleast_1d(b);

    let shape = broadcast_shape(a.shape(), b.shape())?;
    let incompatible = || ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape);
    let ab = a.broadcast(shape.as_slice()).ok_or_else(incompatible)?;
    let bb = b.broadcast(shape.as_slice()).ok_or_else(incompatible)?;

    let diff = ndarray::Zip::from(&ab).and(&bb).map_collect(|&a, &b| a - b);
    let rmse = rms(&diff);
    let ab_rms = rms(&a) + rms(&b);
    let rel_rmse = if ab_rms > 0.0 {
        Some(2.0 * rmse / ab_rms)
    } else {
        None
    };

    let mut close = tol.isclose_arrays(&ab, &bb);

    let n = shape[0];
    for i in 1..=params.xtol.min(n) {
        let fwd = tol.isclose_arrays(
            &ab.slice_axis(Axis(0), Slice::from(i..n)),
            &bb.slice_axis(Axis(0), Slice::from(0..n - i)),
        );
        ndarray::Zip::from(close.slice_axis_mut(Axis(0), Slice::from(i..n)))
            .and(&fwd)
            .for_each(|c, &s| *c |= s);

        let bwd = tol.isclose_arrays(
            &ab.slice_axis(Axis(0), Slice::from(0..n - i)),
            &bb.slice_axis(Axis(0), Slice::from(i..n)),
        );
        ndarray::Zip::from(close.slice_axis_mut(Axis(0), Slice::from(0..n - i)))
            .and(&bwd)
            .for_each(|c, &s| *c |= s);

        // there's no neighbor to compare the boundary elements with
        close.slice_axis_mut(Axis(0), Slice::from(0..i)).fill(true);
        close.slice_axis_mut(Axis(0), Slice::from(n - i..n)).fill(true);
    }

    let num_mismatches = close.iter().filter(|c| !**c).count();
    let mismatches = close
        .indexed_iter()
        .filter(|(_, c)| !**c)
        .take(params.print_fail)
        .map(|(idx, _)| {
            let index: Vec<usize> = (0..idx.ndim()).map(|i| idx[i]).collect();
            Mismatch {
                a: ab[index.as_slice()],
                b: bb[index.as_slice()],
                index,
            }
        })
        .collect();

    Ok(Comparison {
        close: num_mismatches == 0,
        rmse: Some(rmse).filter(|v| !v.is_nan()),
        rel_rmse: rel_rmse.filter(|v| !v.is_nan()),
        num_mismatches,
        mismatches,
    })
}
