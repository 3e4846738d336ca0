//! 특이값 곡선의 피크 탐색

use crate::core::error::{OmaError, OmaResult};

/// `target ± bandwidth` 안에서 모드 지시 곡선의 가장 높은 국소 최대 인덱스
///
/// `frequencies`는 오름차순이어야 한다. 평탄하거나 단조인 구간처럼
/// 국소 최대가 없으면 `PeakNotFound`.
pub fn locate_peak(
    indicator: &[f64],
    frequencies: &[f64],
    target_frequency: f64,
    bandwidth: f64,
) -> OmaResult<usize> {
    if indicator.len() != frequencies.len() {
        return Err(OmaError::InvalidData(format!(
            "indicator has {} lines, frequency axis {}",
            indicator.len(),
            frequencies.len()
        )));
    }
    let not_found = OmaError::PeakNotFound {
        target_frequency,
        bandwidth,
    };
    let n = indicator.len();
    let lo = frequencies.partition_point(|&f| f < target_frequency - bandwidth);
    let hi = frequencies.partition_point(|&f| f <= target_frequency + bandwidth);

    let mut best: Option<usize> = None;
    for i in lo.max(1)..hi.min(n.saturating_sub(1)) {
        let v = indicator[i];
        // 평탄 구간(plateau)은 왼쪽 끝에서 한 번만 잡는다
        let is_local_max = v > indicator[i - 1] && v >= indicator[i + 1];
        if is_local_max && best.map_or(true, |b| v > indicator[b]) {
            best = Some(i);
        }
    }
    best.ok_or(not_found)
}
