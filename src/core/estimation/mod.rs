//! # 모드 추정 모듈
//!
//! 피크 탐색, SDOF 종 분리, 상관함수 감쇠 적합, MAC 기반 중복 제거

pub mod bell;
pub mod damping;
pub mod extraction;
pub mod mac;
pub mod peak;

// 재수출
pub use bell::{correlation_from_bell, fit_sdof_bell, BellLimits, CorrelationFunction, SdofBell};
pub use damping::{fit_damping, DampingFit};
pub use extraction::extract_modes;
pub use mac::{deduplicate_by_mac, mac, mac_matrix, normalize_mode_shape, ModeCandidate};
pub use peak::locate_peak;

#[cfg(test)]
mod __tests__;
