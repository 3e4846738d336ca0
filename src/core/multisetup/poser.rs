//! 셋업별 결과 사후 병합 (PoSER)
//!
//! 각 셋업의 모드 형상은 임의의 복소 배율까지만 정의되므로 기준 채널 성분을
//! 마스터(첫 번째 셋업)에 최소제곱으로 맞춘 배율 α로 이동 채널 성분을 보정한다.
//!
//! α = (r_sᴴ r_m) / (r_sᴴ r_s)

use crate::core::error::{OmaError, OmaResult};
use crate::core::multisetup::channel_map::{GlobalChannel, MultiSetupChannelMap};
use crate::core::types::ModalResult;
use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, Axis};
use num_complex::Complex64;
use serde::Serialize;

/// 병합된 전역 모드 집합
#[derive(Debug, Clone, Serialize)]
pub struct FusedModalResult {
    /// 셋업 평균 고유 진동수
    pub frequencies: Vec<f64>,
    /// 셋업 간 표본 표준편차 (셋업 하나면 0)
    pub frequency_std: Vec<f64>,
    /// 모든 셋업이 감쇠를 가진 경우에만
    pub damping: Option<Vec<f64>>,
    pub damping_std: Option<Vec<f64>>,
    /// (전역 채널 수, 모드 수)
    pub mode_shapes: DMatrix<Complex64>,
    /// (셋업 수, 모드 수), 마스터 행은 1
    pub scale_factors: DMatrix<Complex64>,
    /// 전역 채널 출처 (플롯 협력자용)
    pub layout: Vec<GlobalChannel>,
}

impl FusedModalResult {
    pub fn n_modes(&self) -> usize {
        self.frequencies.len()
    }

    pub fn mode_shape(&self, mode: usize) -> Option<DVector<Complex64>> {
        (mode < self.mode_shapes.ncols()).then(|| self.mode_shapes.column(mode).into_owned())
    }
}

/// 셋업 순서대로 받은 결과를 하나의 전역 모드 집합으로 병합.
///
/// 모드 순서의 일치는 호출자 책임이며 여기서는 개수만 검사한다.
pub fn fuse(results: &[ModalResult], channel_map: &MultiSetupChannelMap) -> OmaResult<FusedModalResult> {
    check_results(results, channel_map)?;
    let n_setups = results.len();
    let n_modes = results[0].n_modes();
    let setups = channel_map.setups();
    let master = &setups[0];

    let mut mode_shapes = DMatrix::zeros(channel_map.global_channel_count(), n_modes);
    let mut scale_factors = DMatrix::from_element(n_setups, n_modes, Complex64::new(1.0, 0.0));

    for j in 0..n_modes {
        let master_shape = results[0].mode_shapes.column(j);
        let r_m = DVector::from_iterator(
            master.reference.len(),
            master.reference.iter().map(|&c| master_shape[c]),
        );
        for (g, value) in channel_map.reference_positions().zip(r_m.iter()) {
            mode_shapes[(g, j)] = *value;
        }

        for (s, (result, channels)) in results.iter().zip(setups).enumerate() {
            let shape = result.mode_shapes.column(j);
            let alpha = if s == 0 {
                Complex64::new(1.0, 0.0)
            } else {
                let r_s = DVector::from_iterator(
                    channels.reference.len(),
                    channels.reference.iter().map(|&c| shape[c]),
                );
                let denominator = r_s.dotc(&r_s);
                if denominator.norm() <= 0.0 {
                    return Err(OmaError::NumericalFailure(format!(
                        "setup {} mode {} has zero amplitude on every reference channel",
                        s, j
                    )));
                }
                r_s.dotc(&r_m) / denominator
            };
            scale_factors[(s, j)] = alpha;
            for (g, &c) in channel_map.moving_positions(s).zip(&channels.moving) {
                mode_shapes[(g, j)] = shape[c] * alpha;
            }
        }
    }

    let frequencies = stack(results.iter().map(|r| r.frequencies.as_slice()), n_modes);
    let (frequency_mean, frequency_std) = column_stats(&frequencies);

    let all_damped = results.iter().all(|r| r.damping.is_some());
    let (damping, damping_std) = if all_damped {
        let table = stack(results.iter().filter_map(|r| r.damping.as_deref()), n_modes);
        let (mean, std) = column_stats(&table);
        (Some(mean), Some(std))
    } else {
        (None, None)
    };

    debug!(
        "PoSER: {} setups, {} modes, {} global channels",
        n_setups,
        n_modes,
        mode_shapes.nrows()
    );

    Ok(FusedModalResult {
        frequencies: frequency_mean,
        frequency_std,
        damping,
        damping_std,
        mode_shapes,
        scale_factors,
        layout: channel_map.layout(),
    })
}

fn check_results(results: &[ModalResult], channel_map: &MultiSetupChannelMap) -> OmaResult<()> {
    if results.len() != channel_map.n_setups() {
        return Err(OmaError::SetupMismatch(format!(
            "{} results supplied, channel map describes {} setups",
            results.len(),
            channel_map.n_setups()
        )));
    }
    let n_modes = results[0].n_modes();
    for (s, (result, channels)) in results.iter().zip(channel_map.setups()).enumerate() {
        if result.n_modes() != n_modes {
            return Err(OmaError::SetupMismatch(format!(
                "setup {} identified {} modes, setup 0 identified {}",
                s,
                result.n_modes(),
                n_modes
            )));
        }
        if result.mode_shapes.ncols() != n_modes {
            return Err(OmaError::SetupMismatch(format!(
                "setup {} carries {} mode shapes for {} modes",
                s,
                result.mode_shapes.ncols(),
                n_modes
            )));
        }
        if let Some(damping) = &result.damping {
            if damping.len() != n_modes {
                return Err(OmaError::SetupMismatch(format!(
                    "setup {} carries {} damping ratios for {} modes",
                    s,
                    damping.len(),
                    n_modes
                )));
            }
        }
        if result.n_channels() != channels.channel_count {
            return Err(OmaError::SetupMismatch(format!(
                "setup {} mode shapes have {} entries, channel map expects {}",
                s,
                result.n_channels(),
                channels.channel_count
            )));
        }
    }
    Ok(())
}

/// (셋업 수, 모드 수) 표
fn stack<'a>(rows: impl Iterator<Item = &'a [f64]>, n_modes: usize) -> Array2<f64> {
    let rows: Vec<Array1<f64>> = rows.map(|r| Array1::from(r.to_vec())).collect();
    let mut table = Array2::zeros((rows.len(), n_modes));
    for (mut target, row) in table.axis_iter_mut(Axis(0)).zip(&rows) {
        target.assign(row);
    }
    table
}

fn column_stats(table: &Array2<f64>) -> (Vec<f64>, Vec<f64>) {
    let n_modes = table.ncols();
    if table.nrows() == 0 || n_modes == 0 {
        return (vec![0.0; n_modes], vec![0.0; n_modes]);
    }
    let ddof = if table.nrows() > 1 { 1.0 } else { 0.0 };
    let mean = table
        .mean_axis(Axis(0))
        .map(|m| m.to_vec())
        .unwrap_or_else(|| vec![0.0; n_modes]);
    (mean, table.std_axis(Axis(0), ddof).to_vec())
}
