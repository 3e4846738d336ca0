//! MAC (Modal Assurance Criterion)와 모드 형상 유틸리티

use crate::core::types::ModeFitDiagnostics;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// |φ₁ᴴφ₂|² / ((φ₁ᴴφ₁)(φ₂ᴴφ₂)), 항상 [0, 1]. 영벡터가 끼면 0
pub fn mac(phi_1: &DVector<Complex64>, phi_2: &DVector<Complex64>) -> f64 {
    if phi_1.len() != phi_2.len() {
        return 0.0;
    }
    let cross = phi_1.dotc(phi_2);
    let norm_1 = phi_1.dotc(phi_1).re;
    let norm_2 = phi_2.dotc(phi_2).re;
    if norm_1 <= 0.0 || norm_2 <= 0.0 {
        return 0.0;
    }
    (cross.norm_sqr() / (norm_1 * norm_2)).clamp(0.0, 1.0)
}

/// 두 모드 집합(열 = 모드) 사이의 MAC 행렬
pub fn mac_matrix(shapes_1: &DMatrix<Complex64>, shapes_2: &DMatrix<Complex64>) -> DMatrix<f64> {
    DMatrix::from_fn(shapes_1.ncols(), shapes_2.ncols(), |i, j| {
        mac(&shapes_1.column(i).into_owned(), &shapes_2.column(j).into_owned())
    })
}

/// 절댓값이 가장 큰 성분이 1 + 0i 가 되도록 정규화
pub fn normalize_mode_shape(phi: DVector<Complex64>) -> DVector<Complex64> {
    let pivot = phi
        .iter()
        .copied()
        .max_by(|a, b| a.norm().total_cmp(&b.norm()));
    match pivot {
        Some(p) if p.norm() > 0.0 => phi / p,
        _ => phi,
    }
}

/// 추정 단계의 후보 모드
#[derive(Debug, Clone)]
pub struct ModeCandidate {
    pub target_frequency: f64,
    pub frequency: f64,
    pub damping: Option<f64>,
    pub mode_shape: DVector<Complex64>,
    pub peak_index: usize,
    /// 피크의 첫 특이값
    pub peak_value: f64,
    pub diagnostics: Option<ModeFitDiagnostics>,
}

/// MAC ≥ `mac_threshold` 인 후보 쌍은 피크 특이값이 큰 쪽만 남긴다.
///
/// 피크가 큰 후보부터 남은 모든 모드와 비교하므로 결과의 어느 두 모드도
/// 임계값 이상으로 닮지 않는다. 남은 모드는 흡수한 후보 중 가장 먼저
/// 등장한 위치에 놓인다.
pub fn deduplicate_by_mac(candidates: Vec<ModeCandidate>, mac_threshold: f64) -> Vec<ModeCandidate> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| candidates[b].peak_value.total_cmp(&candidates[a].peak_value));

    // (후보 인덱스, 그룹의 첫 등장 위치)
    let mut kept: Vec<(usize, usize)> = Vec::with_capacity(candidates.len());
    for idx in order {
        let candidate = &candidates[idx];
        let duplicate = kept
            .iter()
            .position(|&(k, _)| mac(&candidates[k].mode_shape, &candidate.mode_shape) >= mac_threshold);
        match duplicate {
            Some(slot) => {
                let (k, first_seen) = kept[slot];
                log::debug!(
                    "{:.3} Hz duplicates {:.3} Hz (MAC ≥ {})",
                    candidate.target_frequency,
                    candidates[k].target_frequency,
                    mac_threshold
                );
                kept[slot].1 = first_seen.min(idx);
            }
            None => kept.push((idx, idx)),
        }
    }
    kept.sort_by_key(|&(_, first_seen)| first_seen);

    let mut slots: Vec<Option<ModeCandidate>> = candidates.into_iter().map(Some).collect();
    kept.into_iter().filter_map(|(idx, _)| slots[idx].take()).collect()
}
