//! # 에러 분류
//!
//! 식별 엔진 전체에서 공유하는 에러 타입

/// 엔진 공통 결과 타입
pub type OmaResult<T> = std::result::Result<T, OmaError>;

/// 모드 식별 엔진 에러
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OmaError {
    /// 실행 파라미터가 없거나 허용 범위를 벗어남
    #[error("invalid configuration `{field}`: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// 생명주기 순서를 어긴 호출
    #[error("{algorithm}: {reason}")]
    Precondition { algorithm: String, reason: String },

    /// 탐색 대역 안에 국소 최대가 없음
    #[error("no spectral peak within {target_frequency} ± {bandwidth} Hz")]
    PeakNotFound { target_frequency: f64, bandwidth: f64 },

    /// 감쇠 회귀에 쓸 피크가 부족함
    #[error(
        "only {found} usable correlation peaks for the mode near {target_frequency} Hz \
         (at least {required} required)"
    )]
    InsufficientPeaks {
        target_frequency: f64,
        found: usize,
        required: usize,
    },

    /// 셋업 간 결과/채널 구성이 일치하지 않음
    #[error("setup mismatch: {0}")]
    SetupMismatch(String),

    /// 분해 미수렴 등 하위 수치 연산 실패
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    /// 샘플 배열 자체가 잘못됨
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// 후보 주파수 하나를 처리하다 난 그 밖의 실패
    #[error("estimation near {target_frequency} Hz failed: {source}")]
    CandidateFailure {
        target_frequency: f64,
        source: Box<OmaError>,
    },
}

impl OmaError {
    pub(crate) fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        OmaError::Configuration {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn precondition(algorithm: &str, reason: impl Into<String>) -> Self {
        OmaError::Precondition {
            algorithm: algorithm.to_string(),
            reason: reason.into(),
        }
    }

    /// 다른 주파수/대역으로 재시도하면 회복 가능한 에러인지
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OmaError::PeakNotFound { .. } | OmaError::InsufficientPeaks { .. }
        )
    }

    /// 실패를 일으킨 후보 주파수 (추정 단계 에러만 해당)
    pub fn target_frequency(&self) -> Option<f64> {
        match self {
            OmaError::PeakNotFound { target_frequency, .. }
            | OmaError::InsufficientPeaks { target_frequency, .. }
            | OmaError::CandidateFailure { target_frequency, .. } => Some(*target_frequency),
            _ => None,
        }
    }

    /// 에러에 후보 주파수 `target`을 붙인다. 주파수 필드가 없는 에러는 감싼다
    pub(crate) fn for_target(self, target: f64) -> Self {
        match self {
            OmaError::PeakNotFound { bandwidth, .. } => OmaError::PeakNotFound {
                target_frequency: target,
                bandwidth,
            },
            OmaError::InsufficientPeaks { found, required, .. } => OmaError::InsufficientPeaks {
                target_frequency: target,
                found,
                required,
            },
            OmaError::CandidateFailure { source, .. } => OmaError::CandidateFailure {
                target_frequency: target,
                source,
            },
            other => OmaError::CandidateFailure {
                target_frequency: target,
                source: Box::new(other),
            },
        }
    }
}
