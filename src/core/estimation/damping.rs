//! 상관함수 감쇠 적합 (대수 감쇠율)

use crate::core::error::{OmaError, OmaResult};
use crate::core::estimation::bell::CorrelationFunction;
use log::{debug, warn};
use serde::Serialize;
use std::f64::consts::PI;

/// 회귀에 필요한 최소 피크 수
const MIN_PEAKS: usize = 2;

/// 감쇠 적합 결과와 진단 정보
#[derive(Debug, Clone, Serialize)]
pub struct DampingFit {
    /// 보정된 고유 진동수 f_n, Hz
    pub frequency: f64,
    /// 감쇠비 ζ
    pub damping: f64,
    /// 한 주기당 대수 감쇠율 δ
    pub log_decrement: f64,
    /// 회귀에 사용한 피크의 시각
    pub peak_times: Vec<f64>,
    /// 회귀에 사용한 피크의 |R|
    pub peak_amplitudes: Vec<f64>,
    /// 적합된 포락선, 상관함수 시간축 위
    pub envelope: Vec<f64>,
    pub r_squared: f64,
    pub used_peaks: usize,
}

/// 앞의 `skip_peaks`개 반주기 피크를 버리고 최대 `max_peaks`개로
/// `ln|R_k| = b + m·k` 회귀. δ = −2m (반주기 간격이므로)
pub fn fit_damping(
    correlation: &CorrelationFunction,
    skip_peaks: usize,
    max_peaks: usize,
) -> OmaResult<DampingFit> {
    if correlation.time.len() != correlation.values.len() {
        return Err(OmaError::InvalidData(format!(
            "correlation has {} samples but {} time stamps",
            correlation.values.len(),
            correlation.time.len()
        )));
    }
    let peaks: Vec<(f64, f64)> = half_cycle_peaks(&correlation.time, &correlation.values)
        .into_iter()
        .skip(skip_peaks)
        .take(max_peaks)
        .filter(|&(_, amplitude)| amplitude > 0.0)
        .collect();
    if peaks.len() < MIN_PEAKS {
        return Err(OmaError::InsufficientPeaks {
            target_frequency: correlation.peak_frequency,
            found: peaks.len(),
            required: MIN_PEAKS,
        });
    }

    let ks: Vec<f64> = (0..peaks.len()).map(|k| k as f64).collect();
    let logs: Vec<f64> = peaks.iter().map(|&(_, a)| a.ln()).collect();
    let (intercept, slope, r_squared) = linear_regression(&ks, &logs);

    let log_decrement = -2.0 * slope;
    let damping = log_decrement / (4.0 * PI * PI + log_decrement * log_decrement).sqrt();
    let mean_spacing = (peaks[peaks.len() - 1].0 - peaks[0].0) / (peaks.len() - 1) as f64;
    if mean_spacing <= 0.0 {
        return Err(OmaError::NumericalFailure(
            "correlation peaks are not increasing in time".to_string(),
        ));
    }
    let damped_frequency = 1.0 / (2.0 * mean_spacing);
    let frequency = damped_frequency / (1.0 - damping * damping).max(f64::EPSILON).sqrt();

    if damping < 0.0 {
        warn!(
            "negative damping {:.4} fitted near {:.3} Hz (growing correlation envelope)",
            damping, correlation.peak_frequency
        );
    }
    debug!(
        "decay fit near {:.3} Hz: fn = {:.4} Hz, ζ = {:.5}, {} peaks, R² = {:.4}",
        correlation.peak_frequency,
        frequency,
        damping,
        peaks.len(),
        r_squared
    );

    let t0 = peaks[0].0;
    let envelope = correlation
        .time
        .iter()
        .map(|&t| (intercept + slope * (t - t0) / mean_spacing).exp())
        .collect();

    Ok(DampingFit {
        frequency,
        damping,
        log_decrement,
        peak_times: peaks.iter().map(|p| p.0).collect(),
        peak_amplitudes: peaks.iter().map(|p| p.1).collect(),
        envelope,
        r_squared,
        used_peaks: peaks.len(),
    })
}

/// 영교차로 나뉜 각 반주기의 |R| 최대 (시각, 크기).
/// 마지막 영교차 뒤의 미완성 구간은 버린다.
fn half_cycle_peaks(time: &[f64], values: &[f64]) -> Vec<(f64, f64)> {
    let mut peaks = Vec::new();
    let mut start = 0;
    for i in 1..values.len() {
        let crossed = values[i - 1] * values[i] < 0.0 || (values[i] == 0.0 && values[i - 1] != 0.0);
        if !crossed {
            continue;
        }
        if let Some(peak) = segment_peak(time, values, start, i) {
            peaks.push(peak);
        }
        start = i;
    }
    peaks
}

fn segment_peak(time: &[f64], values: &[f64], start: usize, end: usize) -> Option<(f64, f64)> {
    let idx = (start..end).max_by(|&a, &b| values[a].abs().total_cmp(&values[b].abs()))?;
    let amplitude = values[idx].abs();
    if idx == 0 || idx + 1 >= values.len() {
        return Some((time[idx], amplitude));
    }
    // 포물선 보간
    let (y0, y1, y2) = (values[idx - 1].abs(), amplitude, values[idx + 1].abs());
    let denom = y0 - 2.0 * y1 + y2;
    if denom.abs() < f64::EPSILON {
        return Some((time[idx], amplitude));
    }
    let offset = (0.5 * (y0 - y2) / denom).clamp(-0.5, 0.5);
    let step = time[idx + 1] - time[idx];
    Some((time[idx] + offset * step, y1 - 0.25 * (y0 - y2) * offset))
}

/// (절편, 기울기, R²)
fn linear_regression(x: &[f64], y: &[f64]) -> (f64, f64, f64) {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - mean_x) * (yi - mean_y)).sum();
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;
    let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - intercept - slope * xi).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
    (intercept, slope, r_squared)
}
