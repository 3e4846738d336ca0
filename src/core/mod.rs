//! # 모드 식별 핵심 모듈
//!
//! 스펙트럼 추정, 특이값 분해, 모드 추출, 다중 셋업 병합의 구성 요소들

pub mod error;
pub mod estimation;
pub mod multisetup;
pub mod simulation;
pub mod spectral;
pub mod systems;
pub mod types;

// 주요 타입들 재수출
pub use error::{OmaError, OmaResult};
pub use estimation::*;
pub use multisetup::*;
pub use simulation::{Excitation, SyntheticCampaign, SyntheticMode, SyntheticSetup};
pub use spectral::*;
pub use systems::*;
pub use types::*;
