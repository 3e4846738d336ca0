//! # 스펙트럼 추정 모듈
//!
//! 교차 스펙트럼 밀도(CSD) 추정, 다중 셋업 병합(PreGER), 주파수선별 특이값 분해

pub mod csd;
pub mod decomposition;
pub mod preger;

// 재수출
pub use csd::{estimate_auto_csd, estimate_csd, hermitize, CsdTensor};
pub use decomposition::{decompose, SingularSpectrum};
pub use preger::estimate_csd_multisetup;

#[cfg(test)]
mod __tests__;
