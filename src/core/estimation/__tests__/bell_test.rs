//! # SDOF 종 분리 단위테스트

use crate::core::error::OmaError;
use crate::core::estimation::bell::{correlation_from_bell, fit_sdof_bell, BellLimits, SdofBell};
use crate::core::estimation::peak::locate_peak;
use crate::core::simulation::{SyntheticMode, SyntheticSetup};
use crate::core::spectral::estimate_auto_csd;
use crate::core::systems::config::{EstimationParams, FddMethod, RunConfiguration};
use crate::core::types::SpectralResult;
use nalgebra::DVector;
use num_complex::Complex64;

fn single_mode_spectral() -> SpectralResult {
    let series = SyntheticSetup::new(4, 3000, 50.0)
        .with_mode(SyntheticMode::new(2.65, 0.01, vec![1.0, 0.7, -0.4, 0.2]))
        .with_noise(1e-3)
        .with_seed(9)
        .generate()
        .unwrap();
    let config = RunConfiguration::default().with_segment_length(4096);
    let (freq, csd) = estimate_auto_csd(&series, &config).unwrap();
    SpectralResult::from_csd(freq, csd, series.dt()).unwrap()
}

fn limits() -> BellLimits {
    BellLimits::from(&EstimationParams::default())
}

#[test]
fn 종_구간_성질_테스트() {
    let spectral = single_mode_spectral();
    let indicator = spectral.indicator(0);
    let peak = locate_peak(&indicator, spectral.frequencies(), 2.65, 0.5).unwrap();
    let limits = limits();
    let bell = fit_sdof_bell(&spectral, peak, FddMethod::Efdd, &limits).unwrap();

    assert!(bell.indices.contains(&peak));
    assert!(bell.indices.len() > 5, "bell too narrow: {}", bell.indices.len());
    for pair in bell.indices.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
    let peak_pos = peak - bell.indices[0];
    for k in 0..bell.values.len() {
        if k < peak_pos {
            assert!(bell.values[k] <= bell.values[k + 1]);
        } else if k > peak_pos {
            assert!(bell.values[k] <= bell.values[k - 1]);
        }
    }
    assert!(bell.macs.iter().all(|&m| m >= limits.mac_limit));
    let freq = spectral.frequencies();
    for &k in &bell.indices {
        assert!((freq[k] - bell.peak_frequency).abs() <= limits.bandwidth);
    }
    let (lo, hi) = bell.frequency_range(freq);
    println!("✅ 종 구간 성질 테스트 통과: {:.3}–{:.3} Hz, {} 선", lo, hi, bell.indices.len());
}

#[test]
fn 공간필터_종_테스트() {
    let spectral = single_mode_spectral();
    let indicator = spectral.indicator(0);
    let peak = locate_peak(&indicator, spectral.frequencies(), 2.65, 0.5).unwrap();
    let bell = fit_sdof_bell(&spectral, peak, FddMethod::Fsdd, &limits()).unwrap();

    // 피크에서 φᴴGφ/φᴴφ 는 첫 특이값과 같다
    let at_peak = bell.values[peak - bell.indices[0]];
    approx::assert_relative_eq!(at_peak, indicator[peak], max_relative = 1e-6);
    assert_eq!(bell.method, FddMethod::Fsdd);
    println!("✅ 공간필터 종 테스트 통과");
}

#[test]
fn 상관함수_정규화_테스트() {
    let spectral = single_mode_spectral();
    let indicator = spectral.indicator(0);
    let peak = locate_peak(&indicator, spectral.frequencies(), 2.65, 0.5).unwrap();
    let bell = fit_sdof_bell(&spectral, peak, FddMethod::Efdd, &limits()).unwrap();
    let correlation = correlation_from_bell(&bell, spectral.frequencies()).unwrap();

    let n = 2 * (spectral.n_lines() - 1);
    assert_eq!(correlation.values.len(), n / 2);
    approx::assert_relative_eq!(correlation.values[0], 1.0, epsilon = 1e-12);
    approx::assert_relative_eq!(correlation.time[1], 1.0 / (n as f64 * spectral.df()), epsilon = 1e-12);
    assert!(correlation.values.iter().all(|v| v.abs() <= 1.0 + 1e-9));
    println!("✅ 상관함수 정규화 테스트 통과");
}

#[test]
fn 잘못된_입력_에러_테스트() {
    let spectral = single_mode_spectral();
    let out_of_range = fit_sdof_bell(&spectral, spectral.n_lines(), FddMethod::Efdd, &limits());
    assert!(matches!(out_of_range, Err(OmaError::InvalidData(_))));

    let silent = SdofBell {
        method: FddMethod::Efdd,
        peak_index: 3,
        peak_frequency: 1.0,
        reference_vector: DVector::from_element(2, Complex64::new(1.0, 0.0)),
        indices: vec![2, 3, 4],
        values: vec![0.0, 0.0, 0.0],
        macs: vec![1.0, 1.0, 1.0],
        discarded: Vec::new(),
    };
    let freq: Vec<f64> = (0..9).map(|k| k as f64 * 0.25).collect();
    assert!(matches!(
        correlation_from_bell(&silent, &freq),
        Err(OmaError::NumericalFailure(_))
    ));
    println!("✅ 잘못된 입력 에러 테스트 통과");
}
