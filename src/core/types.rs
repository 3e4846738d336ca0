//! # 데이터 모델
//!
//! 시계열 입력, 스펙트럼 결과, 모드 추정 결과

use crate::core::error::{OmaError, OmaResult};
use crate::core::estimation::{CorrelationFunction, DampingFit, SdofBell};
use crate::core::spectral::{decompose, CsdTensor};
use crate::core::systems::config::FddMethod;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView2, Axis};
use num_complex::Complex64;
use serde::Serialize;

/// 채널 × 시간 샘플 배열과 샘플링 주파수
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeries {
    data: Array2<f64>,
    fs: f64,
}

impl TimeSeries {
    /// `data`는 (채널 수, 샘플 수) 배열
    pub fn new(data: Array2<f64>, fs: f64) -> OmaResult<Self> {
        let (channels, samples) = data.dim();
        if channels == 0 || samples == 0 {
            return Err(OmaError::InvalidData(format!(
                "time series must have at least one channel and one sample, got {}x{}",
                channels, samples
            )));
        }
        if !fs.is_finite() || fs <= 0.0 {
            return Err(OmaError::InvalidData(format!(
                "sampling frequency must be positive, got {}",
                fs
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(OmaError::InvalidData(
                "time series contains non-finite samples".to_string(),
            ));
        }
        Ok(Self { data, fs })
    }

    /// 기록 파일 배치 (샘플 수, 채널 수)를 받아 전치
    pub fn from_samples_by_row(samples: Array2<f64>, fs: f64) -> OmaResult<Self> {
        Self::new(samples.reversed_axes().as_standard_layout().into_owned(), fs)
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn fs(&self) -> f64 {
        self.fs
    }

    /// 샘플링 간격 1/fs
    pub fn dt(&self) -> f64 {
        1.0 / self.fs
    }

    pub fn n_channels(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_samples(&self) -> usize {
        self.data.len_of(Axis(1))
    }
}

/// `run()`이 만든 스펙트럼 결과 (이후 읽기 전용)
#[derive(Debug, Clone, Serialize)]
pub struct SpectralResult {
    frequencies: Vec<f64>,
    csd: CsdTensor,
    singular_values: Array2<f64>,
    singular_vectors: Vec<DMatrix<Complex64>>,
    dt: f64,
}

impl SpectralResult {
    /// 주파수선별 CSD를 분해해서 결과 구성
    pub fn from_csd(frequencies: Vec<f64>, csd: CsdTensor, dt: f64) -> OmaResult<Self> {
        if frequencies.len() != csd.len() {
            return Err(OmaError::InvalidData(format!(
                "{} frequency lines but {} spectral matrices",
                frequencies.len(),
                csd.len()
            )));
        }
        let spectrum = decompose(&csd)?;
        Ok(Self {
            frequencies,
            csd,
            singular_values: spectrum.values,
            singular_vectors: spectrum.vectors,
            dt,
        })
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn csd(&self) -> &[DMatrix<Complex64>] {
        &self.csd
    }

    /// (주파수선 수, 특이값 수), 각 행은 내림차순
    pub fn singular_values(&self) -> &Array2<f64> {
        &self.singular_values
    }

    pub fn singular_vectors(&self) -> &[DMatrix<Complex64>] {
        &self.singular_vectors
    }

    /// `order`번째 특이값 곡선. 0이면 모드 지시 함수(CMIF)
    pub fn indicator(&self, order: usize) -> Vec<f64> {
        if order >= self.singular_values.ncols() {
            return Vec::new();
        }
        self.singular_values.column(order).to_vec()
    }

    pub fn n_lines(&self) -> usize {
        self.frequencies.len()
    }

    pub fn n_channels(&self) -> usize {
        self.csd.first().map(|g| g.nrows()).unwrap_or(0)
    }

    /// 원 시계열 샘플링 간격
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn df(&self) -> f64 {
        match self.frequencies.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }
}

/// 모드 하나에 대한 적합 진단 정보 (플롯 협력자용)
#[derive(Debug, Clone, Serialize)]
pub struct ModeFitDiagnostics {
    /// 사용자가 선택한 주파수
    pub target_frequency: f64,
    pub bell: SdofBell,
    pub correlation: CorrelationFunction,
    pub fit: DampingFit,
}

/// 모드 추정 결과
#[derive(Debug, Clone, Serialize)]
pub struct ModalResult {
    pub method: FddMethod,
    /// 추정에 쓰인 선택 주파수 (중복 제거 전)
    pub selected_frequencies: Vec<f64>,
    /// 고유 진동수, Hz
    pub frequencies: Vec<f64>,
    /// 감쇠비 (EFDD/FSDD만)
    pub damping: Option<Vec<f64>>,
    /// 모드 형상, (채널 수, 모드 수)
    pub mode_shapes: DMatrix<Complex64>,
    pub peak_indices: Vec<usize>,
    /// 피크에서의 첫 특이값
    pub peak_values: Vec<f64>,
    /// 모드별 적합 진단 (EFDD/FSDD만, 모드 순서와 동일)
    pub diagnostics: Vec<ModeFitDiagnostics>,
}

impl ModalResult {
    pub fn empty(method: FddMethod, n_channels: usize) -> Self {
        Self {
            method,
            selected_frequencies: Vec::new(),
            frequencies: Vec::new(),
            damping: method.is_enhanced().then(Vec::new),
            mode_shapes: DMatrix::zeros(n_channels, 0),
            peak_indices: Vec::new(),
            peak_values: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn n_modes(&self) -> usize {
        self.frequencies.len()
    }

    pub fn n_channels(&self) -> usize {
        self.mode_shapes.nrows()
    }

    pub fn mode_shape(&self, mode: usize) -> Option<DVector<Complex64>> {
        (mode < self.mode_shapes.ncols()).then(|| self.mode_shapes.column(mode).into_owned())
    }
}
