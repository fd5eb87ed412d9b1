//! Random variate generation for the prior families.
//!
//! All draws take a caller-owned RNG; nothing here holds state.

use dpmm_common::{Error, Result};
use dpmm_math::{symmetrize, SpdFactor};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};

/// Gamma(shape, scale) draw.
pub fn gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> Result<f64> {
    let dist = Gamma::new(shape, scale)
        .map_err(|e| Error::Sampling(format!("Gamma({}, {}): {}", shape, scale, e)))?;
    Ok(dist.sample(rng))
}

/// InvGamma(shape, scale) draw as the reciprocal of Gamma(shape, 1/scale).
pub fn inv_gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> Result<f64> {
    let g = gamma(rng, shape, 1.0 / scale)?;
    if g <= 0.0 || !g.is_finite() {
        return Err(Error::Sampling(format!(
            "InvGamma({}, {}): gamma draw {} not invertible",
            shape, scale, g
        )));
    }
    Ok(1.0 / g)
}

/// N(mean, var) draw.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, var: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mean + var.sqrt() * z
}

/// Vector of independent standard normals.
pub fn standard_normal_vector<R: Rng + ?Sized>(rng: &mut R, dim: usize) -> DVector<f64> {
    DVector::from_fn(dim, |_, _| StandardNormal.sample(rng))
}

/// N(mean, L Lᵀ) draw from the lower Cholesky factor `lower`.
pub fn mvn<R: Rng + ?Sized>(rng: &mut R, mean: &DVector<f64>, lower: &DMatrix<f64>) -> DVector<f64> {
    mean + lower * standard_normal_vector(rng, mean.len())
}

/// IW(ν, Ψ) draw via the Bartlett decomposition.
///
/// With Ψ = U Uᵀ and A the Bartlett factor of a W(ν, I) draw,
/// Σ = (U A⁻ᵀ)(U A⁻ᵀ)ᵀ, which avoids inverting Ψ.
pub fn inv_wishart<R: Rng + ?Sized>(rng: &mut R, df: f64, psi: &SpdFactor) -> Result<DMatrix<f64>> {
    let d = psi.dim();
    let mut a = DMatrix::<f64>::zeros(d, d);
    for i in 0..d {
        // χ²(k) = Gamma(k/2, 2)
        let chi2 = gamma(rng, 0.5 * (df - i as f64), 2.0)?;
        a[(i, i)] = chi2.sqrt();
        for j in 0..i {
            a[(i, j)] = StandardNormal.sample(rng);
        }
    }
    let a_inv = a
        .solve_lower_triangular(&DMatrix::identity(d, d))
        .ok_or_else(|| Error::Sampling("singular Bartlett factor".to_string()))?;
    let c = psi.lower() * a_inv.transpose();
    Ok(symmetrize(&(&c * c.transpose())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn gamma_rejects_bad_shape() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(matches!(gamma(&mut rng, -1.0, 1.0), Err(Error::Sampling(_))));
    }

    #[test]
    fn inv_gamma_sample_mean() {
        // IG(5, 8) has mean 8 / 4 = 2.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let n = 20_000;
        let mean = (0..n)
            .map(|_| inv_gamma(&mut rng, 5.0, 8.0).unwrap())
            .sum::<f64>()
            / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "mean={}", mean);
    }

    #[test]
    fn inv_wishart_sample_mean() {
        // E[Σ] = Ψ / (ν - d - 1)
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let psi = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let factor = SpdFactor::new(&psi).unwrap();
        let nu = 8.0;
        let n = 20_000;
        let mut acc = DMatrix::<f64>::zeros(2, 2);
        for _ in 0..n {
            let s = inv_wishart(&mut rng, nu, &factor).unwrap();
            assert!(SpdFactor::new(&s).is_some());
            acc += s;
        }
        acc /= n as f64;
        let expected = &psi / (nu - 3.0);
        assert!((acc - expected).norm() < 0.03);
    }

    #[test]
    fn mvn_sample_covariance() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 0.6, 0.6, 2.0]);
        let lower = SpdFactor::new(&cov).unwrap().lower();
        let mean = DVector::from_vec(vec![1.0, -1.0]);
        let n = 40_000;
        let draws: Vec<DVector<f64>> = (0..n).map(|_| mvn(&mut rng, &mean, &lower)).collect();
        let emp_mean = draws.iter().fold(DVector::zeros(2), |acc, x| acc + x) / n as f64;
        let mut emp_cov = DMatrix::<f64>::zeros(2, 2);
        for x in &draws {
            let d = x - &emp_mean;
            emp_cov += &d * d.transpose();
        }
        emp_cov /= n as f64;
        assert!((emp_mean - mean).norm() < 0.03);
        assert!((emp_cov - cov).norm() < 0.06);
    }
}
