//! 주파수선별 특이값 분해
//!
//! 각 스펙트럼 행렬 G = UΣUᴴ 를 분해하고 특이값을 내림차순으로 정렬한다.
//! 첫 특이값 곡선이 피크 선택에 쓰이는 모드 지시 함수가 된다.

use crate::core::error::{OmaError, OmaResult};
use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;
use std::cmp::Ordering;

/// SVD 수렴 허용 오차
const SVD_EPS: f64 = 5.0 * f64::EPSILON;
/// SVD 최대 반복 횟수, 초과하면 수치 실패로 보고
const SVD_MAX_ITER: usize = 5_000;

/// 분해 결과
#[derive(Debug, Clone)]
pub struct SingularSpectrum {
    /// (주파수선 수, 특이값 수)
    pub values: Array2<f64>,
    /// 주파수선별 좌특이벡터, 열 순서는 `values`와 같다
    pub vectors: Vec<DMatrix<Complex64>>,
}

pub fn decompose(csd: &[DMatrix<Complex64>]) -> OmaResult<SingularSpectrum> {
    let first = csd
        .first()
        .ok_or_else(|| OmaError::InvalidData("empty spectral tensor".to_string()))?;
    let (rows, cols) = first.shape();
    let rank = rows.min(cols);

    let mut values = Array2::<f64>::zeros((csd.len(), rank));
    let mut vectors = Vec::with_capacity(csd.len());

    for (line, g) in csd.iter().enumerate() {
        if g.shape() != (rows, cols) {
            return Err(OmaError::InvalidData(format!(
                "line {} has shape {:?}, expected {:?}",
                line,
                g.shape(),
                (rows, cols)
            )));
        }
        let svd = g
            .clone()
            .try_svd(true, false, SVD_EPS, SVD_MAX_ITER)
            .ok_or_else(|| {
                OmaError::NumericalFailure(format!("SVD did not converge at frequency line {}", line))
            })?;
        let u = svd.u.as_ref().ok_or_else(|| {
            OmaError::NumericalFailure(format!("SVD left vectors missing at frequency line {}", line))
        })?;
        let sigma = &svd.singular_values;
        if sigma.iter().any(|s| !s.is_finite()) {
            return Err(OmaError::NumericalFailure(format!(
                "non-finite singular value at frequency line {}",
                line
            )));
        }

        let mut order: Vec<usize> = (0..rank).collect();
        order.sort_by(|&a, &b| sigma[b].partial_cmp(&sigma[a]).unwrap_or(Ordering::Equal));

        for (slot, &idx) in order.iter().enumerate() {
            values[[line, slot]] = sigma[idx];
        }
        vectors.push(DMatrix::from_fn(rows, rank, |r, c| u[(r, order[c])]));
    }

    Ok(SingularSpectrum { values, vectors })
}
