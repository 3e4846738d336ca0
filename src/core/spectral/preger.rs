//! 다중 셋업 스펙트럼 병합 (PreGER)
//!
//! 셋업마다 측정된 스펙트럼을 공통 기준 채널로 묶어
//! 모든 채널을 동시에 측정한 것과 같은 하나의 전역 텐서를 만든다.
//!
//! - 셋업별 가진 수준 차이는 기준 자기 스펙트럼 trace 비로 정규화
//! - 서로 다른 셋업의 이동 채널 사이 항은 `G_{Ms,R} Ḡ_RR⁺ G_{R,Mt}` 로 합성

use crate::core::error::{OmaError, OmaResult};
use crate::core::multisetup::MultiSetupChannelMap;
use crate::core::spectral::csd::{estimate_auto_csd, hermitize, CsdTensor};
use crate::core::systems::config::RunConfiguration;
use crate::core::types::TimeSeries;
use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::ops::Range;

/// 기준 블록 유사역행렬 절단 기준 (최대 특이값 대비)
const REFERENCE_PINV_RTOL: f64 = 1e-3;

pub fn estimate_csd_multisetup(
    setups: &[TimeSeries],
    channel_map: &MultiSetupChannelMap,
    config: &RunConfiguration,
) -> OmaResult<(Vec<f64>, CsdTensor)> {
    check_setups(setups, channel_map)?;

    let mut frequencies = Vec::new();
    let mut per_setup = Vec::with_capacity(setups.len());
    for (s, series) in setups.iter().enumerate() {
        let (freq, tensor) = estimate_auto_csd(series, config)?;
        if s > 0 && freq.len() != frequencies.len() {
            return Err(OmaError::SetupMismatch(format!(
                "setup {} produced {} frequency lines, setup 0 produced {}",
                s,
                freq.len(),
                frequencies.len()
            )));
        }
        frequencies = freq;
        per_setup.push(tensor);
    }

    let n_global = channel_map.global_channel_count();
    let references = channel_map.reference_positions();
    let moving: Vec<Range<usize>> = (0..channel_map.n_setups())
        .map(|s| channel_map.moving_positions(s))
        .collect();

    let mut global = Vec::with_capacity(frequencies.len());
    for line in 0..frequencies.len() {
        let blocks: Vec<SetupBlocks> = channel_map
            .setups()
            .iter()
            .zip(per_setup.iter())
            .map(|(channels, tensor)| {
                let g = &tensor[line];
                SetupBlocks {
                    rr: select(g, &channels.reference, &channels.reference),
                    mr: select(g, &channels.moving, &channels.reference),
                    rm: select(g, &channels.reference, &channels.moving),
                    mm: select(g, &channels.moving, &channels.moving),
                }
            })
            .collect();

        let traces: Vec<f64> = blocks.iter().map(|b| b.rr.trace().re).collect();
        let mean_trace = traces.iter().sum::<f64>() / traces.len() as f64;
        let kappas: Vec<Complex64> = traces
            .iter()
            .map(|&t| {
                let kappa = if t.is_finite() && t > 0.0 { mean_trace / t } else { 1.0 };
                Complex64::new(kappa, 0.0)
            })
            .collect();

        let mut g_rr = DMatrix::<Complex64>::zeros(references.len(), references.len());
        for (b, &kappa) in blocks.iter().zip(&kappas) {
            g_rr += &b.rr * kappa;
        }
        g_rr *= Complex64::new(1.0 / blocks.len() as f64, 0.0);
        let g_rr_pinv = truncated_pinv(&g_rr, line)?;

        let mut g = DMatrix::<Complex64>::zeros(n_global, n_global);
        place(&mut g, &g_rr, references.clone(), references.clone());
        for (s, (b, &kappa)) in blocks.iter().zip(&kappas).enumerate() {
            place(&mut g, &(&b.mr * kappa), moving[s].clone(), references.clone());
            place(&mut g, &(&b.rm * kappa), references.clone(), moving[s].clone());
            place(&mut g, &(&b.mm * kappa), moving[s].clone(), moving[s].clone());
        }
        for (s, bs) in blocks.iter().enumerate() {
            let left = &bs.mr * kappas[s] * &g_rr_pinv;
            for (t, bt) in blocks.iter().enumerate() {
                if s == t {
                    continue;
                }
                let cross = &left * (&bt.rm * kappas[t]);
                place(&mut g, &cross, moving[s].clone(), moving[t].clone());
            }
        }
        global.push(g);
    }
    hermitize(&mut global);

    debug!(
        "PreGER: {} setups merged into {} global channels over {} lines",
        setups.len(),
        n_global,
        global.len()
    );
    Ok((frequencies, global))
}

struct SetupBlocks {
    rr: DMatrix<Complex64>,
    mr: DMatrix<Complex64>,
    rm: DMatrix<Complex64>,
    mm: DMatrix<Complex64>,
}

pub(crate) fn check_setups(setups: &[TimeSeries], channel_map: &MultiSetupChannelMap) -> OmaResult<()> {
    if setups.len() != channel_map.n_setups() {
        return Err(OmaError::SetupMismatch(format!(
            "{} setups supplied, channel map describes {}",
            setups.len(),
            channel_map.n_setups()
        )));
    }
    let fs = setups[0].fs();
    for (s, (series, channels)) in setups.iter().zip(channel_map.setups()).enumerate() {
        if series.n_channels() != channels.channel_count {
            return Err(OmaError::SetupMismatch(format!(
                "setup {} has {} channels, channel map expects {}",
                s,
                series.n_channels(),
                channels.channel_count
            )));
        }
        if (series.fs() - fs).abs() > 1e-9 * fs {
            return Err(OmaError::SetupMismatch(format!(
                "setup {} sampled at {} Hz, setup 0 at {} Hz",
                s,
                series.fs(),
                fs
            )));
        }
    }
    Ok(())
}

fn select(g: &DMatrix<Complex64>, rows: &[usize], cols: &[usize]) -> DMatrix<Complex64> {
    DMatrix::from_fn(rows.len(), cols.len(), |r, c| g[(rows[r], cols[c])])
}

fn place(g: &mut DMatrix<Complex64>, block: &DMatrix<Complex64>, rows: Range<usize>, cols: Range<usize>) {
    for (r, row) in rows.enumerate() {
        for (c, col) in cols.clone().enumerate() {
            g[(row, col)] = block[(r, c)];
        }
    }
}

fn truncated_pinv(g: &DMatrix<Complex64>, line: usize) -> OmaResult<DMatrix<Complex64>> {
    let sigma = g
        .clone()
        .try_svd(false, false, 5.0 * f64::EPSILON, 5_000)
        .ok_or_else(|| {
            OmaError::NumericalFailure(format!("reference block SVD failed at frequency line {}", line))
        })?
        .singular_values;
    let largest = sigma.iter().cloned().fold(0.0_f64, f64::max);
    if largest <= 0.0 {
        return Ok(DMatrix::zeros(g.ncols(), g.nrows()));
    }
    g.clone()
        .pseudo_inverse(largest * REFERENCE_PINV_RTOL)
        .map_err(|e| OmaError::NumericalFailure(format!("frequency line {}: {}", line, e)))
}
