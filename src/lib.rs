//! OMA FDD 라이브러리
//!
//! 주변 진동 기록에서 고유 진동수, 감쇠비, 모드 형상을 추정하는
//! 주파수 영역 분해(FDD / EFDD / FSDD)와 다중 셋업 병합(PreGER, PoSER) 엔진

pub mod core;

// 핵심 모듈들 재수출
pub use self::core::{
    // 데이터 구조
    ModalResult, ModeFitDiagnostics, SpectralResult, TimeSeries,
    // 에러
    OmaError, OmaResult,
    // 설정
    EstimationParams, FddMethod, RunConfiguration, SpectralMethod,
    // 알고리즘
    Fdd, FddAlgorithm, FddMultiSetup, LifecycleState, ModalAlgorithm, MultiSetupData,
    // 다중 셋업
    fuse, FusedModalResult, MultiSetupChannelMap,
};
