//! SDOF 종(bell) 분리와 상관함수 복원
//!
//! 피크에서 양쪽으로 주파수선을 따라가며 특이벡터가 피크 벡터와 닮아 있고
//! (MAC ≥ 하한) 크기가 단조 감소하는 동안 종에 포함시킨다.
//! 종만 남긴 스펙트럼을 역변환하면 정규화된 자기상관 함수가 된다.

use crate::core::error::{OmaError, OmaResult};
use crate::core::estimation::mac::mac;
use crate::core::systems::config::{EstimationParams, FddMethod};
use crate::core::types::SpectralResult;
use nalgebra::DVector;
use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::Serialize;

/// 종 경계 조건
#[derive(Debug, Clone, Copy)]
pub struct BellLimits {
    /// 피크 기준 최대 반폭, Hz
    pub bandwidth: f64,
    pub mac_limit: f64,
    /// 비교할 상위 특이벡터 수
    pub close_modes: usize,
}

impl From<&EstimationParams> for BellLimits {
    fn from(params: &EstimationParams) -> Self {
        Self {
            bandwidth: params.bell_bandwidth,
            mac_limit: params.mac_bell_limit,
            close_modes: params.close_modes,
        }
    }
}

/// 분리된 SDOF 스펙트럼 구간
#[derive(Debug, Clone, Serialize)]
pub struct SdofBell {
    pub method: FddMethod,
    pub peak_index: usize,
    pub peak_frequency: f64,
    /// 피크 특이벡터
    pub reference_vector: DVector<Complex64>,
    /// 종에 포함된 주파수선 (오름차순, 연속)
    pub indices: Vec<usize>,
    /// 각 선의 종 크기
    pub values: Vec<f64>,
    /// 각 선의 MAC
    pub macs: Vec<f64>,
    /// 대역 안이지만 종에서 제외된 선
    pub discarded: Vec<usize>,
}

impl SdofBell {
    pub fn frequency_range(&self, frequencies: &[f64]) -> (f64, f64) {
        match (self.indices.first(), self.indices.last()) {
            (Some(&lo), Some(&hi)) => (frequencies[lo], frequencies[hi]),
            _ => (self.peak_frequency, self.peak_frequency),
        }
    }
}

/// 시간 영역 상관함수 (0 지연 값으로 정규화)
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationFunction {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    /// 원래 종의 피크 주파수
    pub peak_frequency: f64,
}

pub fn fit_sdof_bell(
    spectral: &SpectralResult,
    peak_index: usize,
    method: FddMethod,
    limits: &BellLimits,
) -> OmaResult<SdofBell> {
    let frequencies = spectral.frequencies();
    let n = spectral.n_lines();
    if peak_index >= n {
        return Err(OmaError::InvalidData(format!(
            "peak index {} outside {} frequency lines",
            peak_index, n
        )));
    }
    let values = spectral.singular_values();
    let vectors = spectral.singular_vectors();
    let close_modes = limits.close_modes.clamp(1, values.ncols().max(1));
    let reference = vectors[peak_index].column(0).into_owned();
    let reference_norm = reference.dotc(&reference).re;
    let peak_frequency = frequencies[peak_index];

    // (MAC, 종 크기)
    let line_match = |k: usize| -> (f64, f64) {
        let (best, best_mac) = (0..close_modes)
            .map(|c| (c, mac(&reference, &vectors[k].column(c).into_owned())))
            .fold((0, f64::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        let magnitude = match method {
            FddMethod::Fsdd if reference_norm > 0.0 => {
                let g = &spectral.csd()[k];
                (reference.adjoint() * g * &reference)[(0, 0)].re / reference_norm
            }
            _ => values[[k, best]],
        };
        (best_mac, magnitude)
    };

    let (_, peak_value) = line_match(peak_index);
    let walk = |range: &mut dyn Iterator<Item = usize>| -> Vec<(usize, f64, f64)> {
        let mut accepted = Vec::new();
        let mut previous = peak_value;
        for k in range {
            if (frequencies[k] - peak_frequency).abs() > limits.bandwidth {
                break;
            }
            let (line_mac, magnitude) = line_match(k);
            if line_mac < limits.mac_limit || magnitude > previous {
                break;
            }
            accepted.push((k, magnitude, line_mac));
            previous = magnitude;
        }
        accepted
    };
    let left = walk(&mut (0..peak_index).rev());
    let right = walk(&mut (peak_index + 1..n));

    let mut indices = Vec::with_capacity(left.len() + right.len() + 1);
    let mut bell_values = Vec::with_capacity(indices.capacity());
    let mut macs = Vec::with_capacity(indices.capacity());
    for &(k, v, m) in left.iter().rev() {
        indices.push(k);
        bell_values.push(v);
        macs.push(m);
    }
    indices.push(peak_index);
    bell_values.push(peak_value);
    macs.push(1.0);
    for &(k, v, m) in &right {
        indices.push(k);
        bell_values.push(v);
        macs.push(m);
    }

    let (lo, hi) = (indices[0], indices[indices.len() - 1]);
    let discarded = (0..n)
        .filter(|&k| (frequencies[k] - peak_frequency).abs() <= limits.bandwidth)
        .filter(|&k| k < lo || k > hi)
        .collect();

    Ok(SdofBell {
        method,
        peak_index,
        peak_frequency,
        reference_vector: reference,
        indices,
        values: bell_values,
        macs,
        discarded,
    })
}

/// 종 구간만 남긴 단측 스펙트럼을 실수 양측 스펙트럼으로 펼쳐 역변환
pub fn correlation_from_bell(bell: &SdofBell, frequencies: &[f64]) -> OmaResult<CorrelationFunction> {
    let n_freq = frequencies.len();
    if n_freq < 2 {
        return Err(OmaError::InvalidData(
            "at least two frequency lines are needed for an inverse transform".to_string(),
        ));
    }
    let df = frequencies[1] - frequencies[0];
    let n = 2 * (n_freq - 1);

    let mut spectrum = vec![Complex64::new(0.0, 0.0); n];
    for (&k, &v) in bell.indices.iter().zip(&bell.values) {
        if k >= n_freq {
            continue;
        }
        spectrum[k].re = v;
        if k > 0 && k < n_freq - 1 {
            spectrum[n - k].re = v;
        }
    }

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(n).process(&mut spectrum);

    let zero_lag = spectrum[0].re;
    if !zero_lag.is_finite() || zero_lag <= 0.0 {
        return Err(OmaError::NumericalFailure(format!(
            "bell around {:.4} Hz carries no energy",
            bell.peak_frequency
        )));
    }
    let half = n / 2;
    let step = 1.0 / (n as f64 * df);
    Ok(CorrelationFunction {
        time: (0..half).map(|i| i as f64 * step).collect(),
        values: spectrum[..half].iter().map(|c| c.re / zero_lag).collect(),
        peak_frequency: bell.peak_frequency,
    })
}
