//! 교차 스펙트럼 밀도 추정
//!
//! 두 채널 집합의 모든 쌍에 대해 주기도(Welch) 또는 상관함수(correlogram) 방식으로
//! 스펙트럼 행렬을 만든다. 주파수선 수는 M/2 + 1, 분해능은 1/(M·dt).
//!
//! 상관함수 방식은 지연 ±M/2 에서 0이 되는 Hann 지연 창
//! `w(τ) = ½(1 + cos(πτ/L))`, `L = M/2` 를 곱한 뒤 변환한다.

use crate::core::error::{OmaError, OmaResult};
use crate::core::systems::config::{RunConfiguration, SpectralMethod};
use crate::core::types::TimeSeries;
use log::debug;
use nalgebra::DMatrix;
use ndarray::ArrayView2;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// 주파수선마다 하나의 복소 스펙트럼 행렬
pub type CsdTensor = Vec<DMatrix<Complex64>>;

/// `channels_a` × `channels_b` 교차 스펙트럼
///
/// 두 입력 모두 (채널 수, 샘플 수) 배열이며 샘플 수가 같아야 한다.
/// `G_ab = X_a · conj(X_b)` 규약을 따른다.
pub fn estimate_csd(
    channels_a: ArrayView2<f64>,
    channels_b: ArrayView2<f64>,
    dt: f64,
    segment_length: usize,
    method: SpectralMethod,
    overlap: f64,
) -> OmaResult<(Vec<f64>, CsdTensor)> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(OmaError::InvalidData(format!("sampling interval must be positive, got {}", dt)));
    }
    if segment_length < 4 {
        return Err(OmaError::configuration(
            "segment_length",
            format!("must be at least 4 samples, got {}", segment_length),
        ));
    }
    if !(0.0..1.0).contains(&overlap) {
        return Err(OmaError::configuration("overlap", format!("must lie in [0, 1), got {}", overlap)));
    }
    let n_samples = channels_a.ncols();
    if channels_b.ncols() != n_samples {
        return Err(OmaError::InvalidData(format!(
            "channel sets differ in length: {} vs {} samples",
            n_samples,
            channels_b.ncols()
        )));
    }
    if channels_a.nrows() == 0 || channels_b.nrows() == 0 {
        return Err(OmaError::InvalidData("empty channel set".to_string()));
    }

    let tensor = match method {
        SpectralMethod::Periodogram => {
            if n_samples < segment_length {
                return Err(OmaError::InvalidData(format!(
                    "record of {} samples is shorter than the segment length {}",
                    n_samples, segment_length
                )));
            }
            welch_csd(channels_a, channels_b, dt, segment_length, overlap)
        }
        SpectralMethod::Correlogram => {
            if n_samples <= segment_length / 2 {
                return Err(OmaError::InvalidData(format!(
                    "record of {} samples cannot provide {} correlation lags",
                    n_samples,
                    segment_length / 2
                )));
            }
            correlogram_csd(channels_a, channels_b, dt, segment_length)
        }
    };

    let df = 1.0 / (segment_length as f64 * dt);
    let frequencies = (0..tensor.len()).map(|k| k as f64 * df).collect();
    debug!(
        "CSD {:?}: {}x{} channels, {} lines, df = {:.5} Hz",
        method,
        channels_a.nrows(),
        channels_b.nrows(),
        tensor.len(),
        df
    );
    Ok((frequencies, tensor))
}

/// 한 셋업의 자기 스펙트럼 행렬 (에르미트 보정 포함)
pub fn estimate_auto_csd(
    series: &TimeSeries,
    config: &RunConfiguration,
) -> OmaResult<(Vec<f64>, CsdTensor)> {
    let (frequencies, mut tensor) = estimate_csd(
        series.data(),
        series.data(),
        series.dt(),
        config.segment_length,
        config.spectral_method,
        config.overlap,
    )?;
    hermitize(&mut tensor);
    Ok((frequencies, tensor))
}

/// (G + Gᴴ)/2 로 각 정방 행렬을 에르미트로 맞춘다. 허수부는 버리지 않는다.
pub fn hermitize(tensor: &mut [DMatrix<Complex64>]) {
    let half = Complex64::new(0.5, 0.0);
    for g in tensor.iter_mut().filter(|g| g.is_square()) {
        let symmetric = (&*g + g.adjoint()) * half;
        *g = symmetric;
    }
}

fn hann_window(n: usize) -> Vec<f64> {
    // 주기적(periodic) Hann
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

fn segment_starts(len: usize, segment_length: usize, hop: usize) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut start = 0usize;
    while start + segment_length <= len {
        starts.push(start);
        start += hop;
    }
    starts
}

fn windowed_spectra(
    channels: ArrayView2<f64>,
    start: usize,
    window: &[f64],
    fft: &Arc<dyn Fft<f64>>,
) -> Vec<Vec<Complex64>> {
    let m = window.len();
    channels
        .rows()
        .into_iter()
        .map(|row| {
            let mut buffer: Vec<Complex64> = (0..m)
                .map(|i| Complex64::new(row[start + i] * window[i], 0.0))
                .collect();
            fft.process(&mut buffer);
            buffer
        })
        .collect()
}

fn welch_csd(
    channels_a: ArrayView2<f64>,
    channels_b: ArrayView2<f64>,
    dt: f64,
    segment_length: usize,
    overlap: f64,
) -> CsdTensor {
    let m = segment_length;
    let n_freq = m / 2 + 1;
    let fs = 1.0 / dt;
    let window = hann_window(m);
    let win_norm: f64 = window.iter().map(|w| w * w).sum();
    let noverlap = ((overlap * m as f64).round() as usize).min(m - 1);
    let starts = segment_starts(channels_a.ncols(), m, m - noverlap);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(m);

    let (na, nb) = (channels_a.nrows(), channels_b.nrows());
    let mut tensor = vec![DMatrix::<Complex64>::zeros(na, nb); n_freq];

    for &start in &starts {
        let xa = windowed_spectra(channels_a, start, &window, &fft);
        let xb = windowed_spectra(channels_b, start, &window, &fft);
        for (k, g) in tensor.iter_mut().enumerate() {
            // 단측 밀도: DC와 나이퀴스트를 제외하고 두 배
            let one_sided = if k == 0 || (m % 2 == 0 && k == m / 2) { 1.0 } else { 2.0 };
            let scale = one_sided / (fs * win_norm);
            for i in 0..na {
                for j in 0..nb {
                    g[(i, j)] += xa[i][k] * xb[j][k].conj() * scale;
                }
            }
        }
    }

    let inv = Complex64::new(1.0 / starts.len() as f64, 0.0);
    for g in &mut tensor {
        *g *= inv;
    }
    tensor
}

fn correlogram_csd(
    channels_a: ArrayView2<f64>,
    channels_b: ArrayView2<f64>,
    dt: f64,
    segment_length: usize,
) -> CsdTensor {
    let m = segment_length;
    let n_freq = m / 2 + 1;
    let max_lag = m / 2;
    let n_samples = channels_a.ncols();
    // 순환 상관이 겹치지 않도록 N + 최대 지연 이상으로 패딩
    let padded = (n_samples + max_lag + 1).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(padded);
    let inverse = planner.plan_fft_inverse(padded);
    let lag_fft = planner.plan_fft_forward(m);
    let window = hann_lag_window(max_lag);

    let padded_spectra = |channels: ArrayView2<f64>| -> Vec<Vec<Complex64>> {
        channels
            .rows()
            .into_iter()
            .map(|row| {
                let mut buffer = vec![Complex64::new(0.0, 0.0); padded];
                for (dst, &src) in buffer.iter_mut().zip(row.iter()) {
                    dst.re = src;
                }
                forward.process(&mut buffer);
                buffer
            })
            .collect()
    };
    let spectra_a = padded_spectra(channels_a);
    let spectra_b = padded_spectra(channels_b);

    let (na, nb) = (channels_a.nrows(), channels_b.nrows());
    let mut tensor = vec![DMatrix::<Complex64>::zeros(na, nb); n_freq];
    // 편향 추정 1/N, 역변환 정규화 1/P
    let norm = 1.0 / (padded as f64 * n_samples as f64);

    for i in 0..na {
        for j in 0..nb {
            let mut correlation: Vec<Complex64> = spectra_a[i]
                .iter()
                .zip(spectra_b[j].iter())
                .map(|(a, b)| a * b.conj())
                .collect();
            inverse.process(&mut correlation);

            // R_ab(τ)는 인덱스 τ, R_ab(−τ)는 인덱스 P − τ
            let mut circular = vec![Complex64::new(0.0, 0.0); m];
            circular[0].re = correlation[0].re * norm;
            for tau in 1..=max_lag {
                let positive = correlation[tau].re * norm * window[tau];
                let negative = correlation[padded - tau].re * norm * window[tau];
                if m % 2 == 0 && tau == max_lag {
                    circular[tau].re = 0.5 * (positive + negative);
                } else {
                    circular[tau].re = positive;
                    circular[m - tau].re = negative;
                }
            }
            lag_fft.process(&mut circular);

            for (k, g) in tensor.iter_mut().enumerate() {
                g[(i, j)] = circular[k] * dt;
            }
        }
    }
    tensor
}

/// 지연 0..=L 의 Hann 지연 창. w(0) = 1, w(L) = 0
pub(crate) fn hann_lag_window(max_lag: usize) -> Vec<f64> {
    if max_lag == 0 {
        return vec![1.0];
    }
    (0..=max_lag)
        .map(|tau| 0.5 * (1.0 + (PI * tau as f64 / max_lag as f64).cos()))
        .collect()
}
