//! 선택 주파수별 모드 추출 (FDD / EFDD / FSDD)

use crate::core::error::OmaResult;
use crate::core::estimation::bell::{correlation_from_bell, fit_sdof_bell, BellLimits};
use crate::core::estimation::damping::fit_damping;
use crate::core::estimation::mac::{deduplicate_by_mac, normalize_mode_shape, ModeCandidate};
use crate::core::estimation::peak::locate_peak;
use crate::core::systems::config::{EstimationParams, FddMethod};
use crate::core::types::{ModalResult, ModeFitDiagnostics, SpectralResult};
use log::debug;
use nalgebra::DMatrix;

/// 선택 주파수마다 피크를 찾아 모드를 추정한다.
///
/// 한 주파수라도 실패하면 그 주파수를 담은 에러를 돌려주며, 부분 결과는 만들지 않는다.
pub fn extract_modes(
    spectral: &SpectralResult,
    method: FddMethod,
    selected_frequencies: &[f64],
    params: &EstimationParams,
) -> OmaResult<ModalResult> {
    let n_channels = spectral.n_channels();
    if selected_frequencies.is_empty() {
        return Ok(ModalResult::empty(method, n_channels));
    }

    let indicator = spectral.indicator(0);
    let limits = BellLimits::from(params);
    let mut candidates = Vec::with_capacity(selected_frequencies.len());
    for &target in selected_frequencies {
        let candidate = extract_one(spectral, method, &indicator, target, params, &limits)
            .map_err(|e| e.for_target(target))?;
        candidates.push(candidate);
    }

    let modes = deduplicate_by_mac(candidates, params.mac_dedup_threshold);
    let mut mode_shapes = DMatrix::zeros(n_channels, modes.len());
    for (j, mode) in modes.iter().enumerate() {
        mode_shapes.set_column(j, &mode.mode_shape);
    }
    let damping = method
        .is_enhanced()
        .then(|| modes.iter().map(|m| m.damping.unwrap_or(f64::NAN)).collect());

    Ok(ModalResult {
        method,
        selected_frequencies: selected_frequencies.to_vec(),
        frequencies: modes.iter().map(|m| m.frequency).collect(),
        damping,
        mode_shapes,
        peak_indices: modes.iter().map(|m| m.peak_index).collect(),
        peak_values: modes.iter().map(|m| m.peak_value).collect(),
        diagnostics: modes.into_iter().filter_map(|m| m.diagnostics).collect(),
    })
}

fn extract_one(
    spectral: &SpectralResult,
    method: FddMethod,
    indicator: &[f64],
    target: f64,
    params: &EstimationParams,
    limits: &BellLimits,
) -> OmaResult<ModeCandidate> {
    let frequencies = spectral.frequencies();
    let peak_index = locate_peak(indicator, frequencies, target, params.search_bandwidth)?;
    let mode_shape = normalize_mode_shape(spectral.singular_vectors()[peak_index].column(0).into_owned());
    let peak_frequency = frequencies[peak_index];

    if !method.is_enhanced() {
        debug!("{}: {:.3} Hz → peak at {:.4} Hz", method.label(), target, peak_frequency);
        return Ok(ModeCandidate {
            target_frequency: target,
            frequency: peak_frequency,
            damping: None,
            mode_shape,
            peak_index,
            peak_value: indicator[peak_index],
            diagnostics: None,
        });
    }

    let bell = fit_sdof_bell(spectral, peak_index, method, limits)?;
    let correlation = correlation_from_bell(&bell, frequencies)?;
    let fit = fit_damping(&correlation, params.skip_peaks, params.max_peaks)?;
    debug!(
        "{}: {:.3} Hz → bell of {} lines, fn = {:.4} Hz, ζ = {:.5}",
        method.label(),
        target,
        bell.indices.len(),
        fit.frequency,
        fit.damping
    );

    Ok(ModeCandidate {
        target_frequency: target,
        frequency: fit.frequency,
        damping: Some(fit.damping),
        mode_shape,
        peak_index,
        peak_value: indicator[peak_index],
        diagnostics: Some(ModeFitDiagnostics {
            target_frequency: target,
            bell,
            correlation,
            fit,
        }),
    })
}
