//! 셋업별 독립 알고리즘의 병렬 실행
//!
//! 알고리즘 인스턴스 내부는 순차적이다. 병렬성은 인스턴스 단위(셋업 하나당
//! 작업자 하나)로만 준다.

use crate::core::error::{OmaError, OmaResult};
use crate::core::systems::algorithm::ModalAlgorithm;
use crate::core::systems::config::EstimationParams;
use crate::core::types::ModalResult;
use rayon::prelude::*;

/// 모든 인스턴스에 `run()`. 결과는 입력 순서
pub fn run_all_parallel<A>(algorithms: &mut [A]) -> Vec<OmaResult<()>>
where
    A: ModalAlgorithm + Send,
{
    algorithms
        .par_iter_mut()
        .map(|algorithm| algorithm.run().map(|_| ()))
        .collect()
}

/// 모든 인스턴스에 같은 주파수 목록으로 `estimate()`
pub fn estimate_all_parallel<A>(
    algorithms: &mut [A],
    selected_frequencies: &[f64],
    params: &EstimationParams,
) -> Vec<OmaResult<()>>
where
    A: ModalAlgorithm + Send,
{
    algorithms
        .par_iter_mut()
        .map(|algorithm| algorithm.estimate(selected_frequencies, params).map(|_| ()))
        .collect()
}

/// 병합 입력용으로 저장된 모드 결과를 셋업 순서대로 모은다
pub fn collect_modal_results<A: ModalAlgorithm>(algorithms: &[A]) -> OmaResult<Vec<ModalResult>> {
    algorithms
        .iter()
        .map(|algorithm| {
            algorithm.modal_result().cloned().ok_or_else(|| {
                OmaError::precondition(algorithm.name(), "no modal result to fuse, call estimate() first")
            })
        })
        .collect()
}
