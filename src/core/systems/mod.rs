//! # 알고리즘 시스템 모듈
//!
//! 실행 설정, 생명주기 상태 기계, 식별 알고리즘 인터페이스

pub mod algorithm;
pub mod config;
pub mod state_management;

// 설정 관련 재수출
pub use config::{EstimationParams, FddMethod, RunConfiguration, RunParams, SpectralMethod};

// 상태 관리 재수출
pub use state_management::{AlgorithmLifecycle, LifecycleState};

// 알고리즘 재수출
pub use algorithm::{
    Fdd, FddAlgorithm, FddMultiSetup, FrequencySelector, ModalAlgorithm, MultiSetupData,
    SpectralInput,
};

// 테스트 모듈들
#[cfg(test)]
pub mod __tests__;
