//! # 실행 파라미터 설정
//!
//! 식별 알고리즘의 실행 파라미터와 모드 추정 파라미터.
//! 모든 구조체는 `Default`를 제공하며 JSON 파일에서 일부 필드만 덮어쓸 수 있다.

use crate::core::error::{OmaError, OmaResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// 검증 가능한 파라미터 묶음
pub trait RunParams: Clone + std::fmt::Debug {
    /// 타입/범위 계약 검증
    fn validate(&self) -> OmaResult<()>;
}

/// 스펙트럼 밀도 추정 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralMethod {
    /// Welch 구간 평균 주기도
    Periodogram,
    /// 상관함수 기반 (correlogram)
    Correlogram,
}

/// 주파수 영역 분해 계열 방법
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FddMethod {
    /// 기본 FDD: 피크 주파수와 특이벡터만
    Fdd,
    /// Enhanced FDD: 특이값 종(bell) + 감쇠
    Efdd,
    /// Frequency-Spatial DD: 공간 필터링된 스펙트럼 종 + 감쇠
    Fsdd,
}

impl FddMethod {
    /// SDOF 종 분리와 감쇠 추정을 수행하는 방법인지
    pub fn is_enhanced(&self) -> bool {
        !matches!(self, FddMethod::Fdd)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FddMethod::Fdd => "FDD",
            FddMethod::Efdd => "EFDD",
            FddMethod::Fsdd => "FSDD",
        }
    }
}

impl FromStr for FddMethod {
    type Err = OmaError;

    fn from_str(s: &str) -> OmaResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fdd" => Ok(FddMethod::Fdd),
            "efdd" => Ok(FddMethod::Efdd),
            "fsdd" => Ok(FddMethod::Fsdd),
            other => Err(OmaError::configuration(
                "method",
                format!("unknown method `{}` (expected fdd, efdd or fsdd)", other),
            )),
        }
    }
}

/// 알고리즘 실행 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfiguration {
    /// 식별 방법
    pub method: FddMethod,
    /// 추정 창 길이 (샘플 수)
    pub segment_length: usize,
    /// 구간 겹침 비율, [0, 1)
    pub overlap: f64,
    /// 스펙트럼 추정 방식
    pub spectral_method: SpectralMethod,
    /// 분해 차수 상한 (시간 영역 계열과 공유하는 설정, FDD 계열은 사용하지 않음)
    pub max_order: Option<usize>,
}

/// 모드 추정 파라미터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationParams {
    /// 피크 탐색 대역 (DF / DF1), Hz
    pub search_bandwidth: f64,
    /// SDOF 종 최대 반폭 (DF2), Hz
    pub bell_bandwidth: f64,
    /// 종 경계 MAC 하한
    pub mac_bell_limit: f64,
    /// 종 판정 시 비교할 특이벡터 수 (인접 모드 수)
    pub close_modes: usize,
    /// 회귀에서 건너뛸 초기 피크 수
    pub skip_peaks: usize,
    /// 회귀에 쓸 최대 피크 수
    pub max_peaks: usize,
    /// 중복 모드 제거 MAC 임계값
    pub mac_dedup_threshold: f64,
}

impl RunConfiguration {
    pub fn new(method: FddMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_segment_length(mut self, segment_length: usize) -> Self {
        self.segment_length = segment_length;
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_spectral_method(mut self, spectral_method: SpectralMethod) -> Self {
        self.spectral_method = spectral_method;
        self
    }

    /// 주파수 분해능 1/(M·dt)
    pub fn frequency_resolution(&self, dt: f64) -> f64 {
        1.0 / (self.segment_length as f64 * dt)
    }

    /// JSON 문자열에서 읽고 검증
    pub fn from_json_str(json: &str) -> OmaResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| OmaError::configuration("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// JSON 파일에서 읽고 검증
    pub fn from_json_file(path: impl AsRef<Path>) -> OmaResult<Self> {
        Self::from_json_str(&read_config_file(path.as_ref())?)
    }
}

impl RunParams for RunConfiguration {
    fn validate(&self) -> OmaResult<()> {
        if self.segment_length < 4 {
            return Err(OmaError::configuration(
                "segment_length",
                format!("must be at least 4 samples, got {}", self.segment_length),
            ));
        }
        if !self.overlap.is_finite() || self.overlap < 0.0 || self.overlap >= 1.0 {
            return Err(OmaError::configuration(
                "overlap",
                format!("must lie in [0, 1), got {}", self.overlap),
            ));
        }
        if self.max_order == Some(0) {
            return Err(OmaError::configuration("max_order", "must be positive"));
        }
        Ok(())
    }
}

impl EstimationParams {
    pub fn with_search_bandwidth(mut self, bandwidth: f64) -> Self {
        self.search_bandwidth = bandwidth;
        self
    }

    pub fn with_bell_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bell_bandwidth = bandwidth;
        self
    }

    pub fn from_json_str(json: &str) -> OmaResult<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| OmaError::configuration("json", e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> OmaResult<Self> {
        Self::from_json_str(&read_config_file(path.as_ref())?)
    }
}

impl RunParams for EstimationParams {
    fn validate(&self) -> OmaResult<()> {
        positive("search_bandwidth", self.search_bandwidth)?;
        positive("bell_bandwidth", self.bell_bandwidth)?;
        unit_interval("mac_bell_limit", self.mac_bell_limit)?;
        unit_interval("mac_dedup_threshold", self.mac_dedup_threshold)?;
        if self.close_modes == 0 {
            return Err(OmaError::configuration("close_modes", "must be at least 1"));
        }
        if self.max_peaks < 2 {
            return Err(OmaError::configuration(
                "max_peaks",
                format!("a decay fit needs at least 2 peaks, got {}", self.max_peaks),
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> OmaResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OmaError::configuration(field, format!("must be positive, got {}", value)))
    }
}

fn unit_interval(field: &'static str, value: f64) -> OmaResult<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(OmaError::configuration(field, format!("must lie in (0, 1], got {}", value)))
    }
}

fn read_config_file(path: &Path) -> OmaResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| OmaError::configuration("file", format!("{}: {}", path.display(), e)))
}

// Default 구현들

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            method: FddMethod::Fdd,
            segment_length: 1024,
            overlap: 0.5,
            spectral_method: SpectralMethod::Correlogram,
            max_order: None,
        }
    }
}

impl Default for EstimationParams {
    fn default() -> Self {
        Self {
            search_bandwidth: 0.1,
            bell_bandwidth: 1.0,
            mac_bell_limit: 0.85,
            close_modes: 1,
            skip_peaks: 3,
            max_peaks: 20,
            mac_dedup_threshold: 0.95,
        }
    }
}
