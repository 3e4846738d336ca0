//! # 식별 알고리즘 인터페이스
//!
//! `ModalAlgorithm`은 모든 방법이 따르는 공개 계약이고, `FddAlgorithm`은
//! FDD 계열(FDD / EFDD / FSDD)을 하나의 구현으로 묶는다. 방법 차이는
//! 설정의 `FddMethod` 값으로 내부 분기한다.

use crate::core::error::{OmaError, OmaResult};
use crate::core::estimation::extract_modes;
use crate::core::multisetup::MultiSetupChannelMap;
use crate::core::spectral::{estimate_auto_csd, estimate_csd_multisetup};
use crate::core::spectral::preger::check_setups;
use crate::core::systems::config::{EstimationParams, FddMethod, RunConfiguration, RunParams};
use crate::core::systems::state_management::{AlgorithmLifecycle, LifecycleState};
use crate::core::types::{ModalResult, SpectralResult, TimeSeries};

/// 스펙트럼 결과를 만들 수 있는 입력 데이터
pub trait SpectralInput {
    fn spectral_result(&self, config: &RunConfiguration) -> OmaResult<SpectralResult>;
}

impl SpectralInput for TimeSeries {
    fn spectral_result(&self, config: &RunConfiguration) -> OmaResult<SpectralResult> {
        let (frequencies, csd) = estimate_auto_csd(self, config)?;
        SpectralResult::from_csd(frequencies, csd, self.dt())
    }
}

/// 기준 채널을 공유하는 여러 셋업의 기록
#[derive(Debug, Clone)]
pub struct MultiSetupData {
    setups: Vec<TimeSeries>,
    channel_map: MultiSetupChannelMap,
}

impl MultiSetupData {
    pub fn new(setups: Vec<TimeSeries>, channel_map: MultiSetupChannelMap) -> OmaResult<Self> {
        check_setups(&setups, &channel_map)?;
        Ok(Self { setups, channel_map })
    }

    pub fn setups(&self) -> &[TimeSeries] {
        &self.setups
    }

    pub fn channel_map(&self) -> &MultiSetupChannelMap {
        &self.channel_map
    }
}

impl SpectralInput for MultiSetupData {
    fn spectral_result(&self, config: &RunConfiguration) -> OmaResult<SpectralResult> {
        let (frequencies, csd) = estimate_csd_multisetup(&self.setups, &self.channel_map, config)?;
        SpectralResult::from_csd(frequencies, csd, self.setups[0].dt())
    }
}

/// 외부 피크 선택기 (대화형 플롯 등). 해석된 주파수 목록을 돌려줄 때까지 블록
pub trait FrequencySelector {
    fn select(&mut self, spectral: &SpectralResult) -> Vec<f64>;
}

impl<F> FrequencySelector for F
where
    F: FnMut(&SpectralResult) -> Vec<f64>,
{
    fn select(&mut self, spectral: &SpectralResult) -> Vec<f64> {
        self(spectral)
    }
}

/// 모드 식별 알고리즘 공통 계약
pub trait ModalAlgorithm {
    type Params: RunParams;
    type Data;

    fn name(&self) -> &str;
    fn state(&self) -> LifecycleState;
    fn configure(&mut self, params: Self::Params) -> OmaResult<()>;
    fn bind_data(&mut self, data: Self::Data);

    /// 스펙트럼 추정 + 분해. 다시 호출하면 이전 결과를 덮어쓴다
    fn run(&mut self) -> OmaResult<&SpectralResult>;

    /// 선택 주파수로 모드 추정. 실패하면 이전 모드 결과는 그대로 남는다
    fn estimate(
        &mut self,
        selected_frequencies: &[f64],
        params: &EstimationParams,
    ) -> OmaResult<&ModalResult>;

    fn spectral_result(&self) -> Option<&SpectralResult>;
    fn modal_result(&self) -> Option<&ModalResult>;

    /// 주파수 목록을 선택기에서 받는다는 점만 빼면 `estimate`와 같다.
    /// 빈 목록은 빈 결과가 된다.
    fn estimate_interactive(
        &mut self,
        selector: &mut dyn FrequencySelector,
        params: &EstimationParams,
    ) -> OmaResult<&ModalResult> {
        let selected = match self.spectral_result() {
            Some(spectral) => selector.select(spectral),
            None => {
                return Err(OmaError::precondition(
                    self.name(),
                    "estimate_interactive() called before run()",
                ))
            }
        };
        self.estimate(&selected, params)
    }
}

/// FDD 계열 알고리즘. `D`는 단일 또는 다중 셋업 입력
#[derive(Debug, Clone)]
pub struct FddAlgorithm<D> {
    lifecycle: AlgorithmLifecycle<RunConfiguration, D>,
}

/// 단일 셋업 FDD 계열
pub type Fdd = FddAlgorithm<TimeSeries>;
/// PreGER 병합 스펙트럼 위의 FDD 계열
pub type FddMultiSetup = FddAlgorithm<MultiSetupData>;

impl<D: SpectralInput> FddAlgorithm<D> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lifecycle: AlgorithmLifecycle::new(name),
        }
    }

    /// 생성 + 설정 + 데이터 연결
    pub fn with_inputs(name: impl Into<String>, config: RunConfiguration, data: D) -> OmaResult<Self> {
        let mut algorithm = Self::new(name);
        algorithm.configure(config)?;
        algorithm.bind_data(data);
        Ok(algorithm)
    }

    pub fn method(&self) -> Option<FddMethod> {
        self.lifecycle.params().map(|p| p.method)
    }

    pub fn config(&self) -> Option<&RunConfiguration> {
        self.lifecycle.params()
    }

    pub fn data(&self) -> Option<&D> {
        self.lifecycle.data()
    }
}

impl<D: SpectralInput> ModalAlgorithm for FddAlgorithm<D> {
    type Params = RunConfiguration;
    type Data = D;

    fn name(&self) -> &str {
        self.lifecycle.name()
    }

    fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    fn configure(&mut self, params: RunConfiguration) -> OmaResult<()> {
        self.lifecycle.configure(params)
    }

    fn bind_data(&mut self, data: D) {
        self.lifecycle.bind_data(data)
    }

    fn run(&mut self) -> OmaResult<&SpectralResult> {
        let (config, data) = self.lifecycle.run_inputs()?;
        let spectral = data.spectral_result(config)?;
        Ok(self.lifecycle.store_spectral(spectral))
    }

    fn estimate(
        &mut self,
        selected_frequencies: &[f64],
        params: &EstimationParams,
    ) -> OmaResult<&ModalResult> {
        params.validate()?;
        let spectral = self.lifecycle.require_spectral()?;
        let method = self
            .lifecycle
            .params()
            .map(|p| p.method)
            .ok_or_else(|| OmaError::precondition(self.lifecycle.name(), "no configuration bound"))?;
        let modal = extract_modes(spectral, method, selected_frequencies, params)?;
        Ok(self.lifecycle.store_modal(modal))
    }

    fn spectral_result(&self) -> Option<&SpectralResult> {
        self.lifecycle.spectral()
    }

    fn modal_result(&self) -> Option<&ModalResult> {
        self.lifecycle.modal()
    }
}
