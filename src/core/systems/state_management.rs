//! # 알고리즘 생명주기 관리
//!
//! 모든 식별 방법이 공유하는 상태 기계.
//! `Unconfigured → Configured → Executed → Estimated`
//!
//! 방법별 알고리즘은 이 구조체를 상속하지 않고 필드로 품는다.

use crate::core::error::{OmaError, OmaResult};
use crate::core::systems::config::RunParams;
use crate::core::types::{ModalResult, SpectralResult};
use log::{info, warn};

/// 생명주기 단계. 순서 비교(`>=`)로 선행 조건을 검사한다
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Unconfigured,
    Configured,
    Executed,
    Estimated,
}

/// 설정 `P`와 입력 데이터 `D`를 받아 결과를 보관하는 공통 상태 기계
#[derive(Debug, Clone)]
pub struct AlgorithmLifecycle<P: RunParams, D> {
    name: String,
    state: LifecycleState,
    params: Option<P>,
    data: Option<D>,
    spectral: Option<SpectralResult>,
    modal: Option<ModalResult>,
}

impl<P: RunParams, D> AlgorithmLifecycle<P, D> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: LifecycleState::Unconfigured,
            params: None,
            data: None,
            spectral: None,
            modal: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// 검증 후 설정을 붙인다. 실행 뒤 재설정하면 결과를 버린다
    pub fn configure(&mut self, params: P) -> OmaResult<()> {
        params.validate()?;
        if self.state >= LifecycleState::Executed {
            warn!("{}: reconfigured after run, stored results discarded", self.name);
        }
        self.params = Some(params);
        self.discard_results();
        self.state = LifecycleState::Configured;
        info!("{}: configured", self.name);
        Ok(())
    }

    /// 입력 데이터를 붙인다. 기존 결과는 버린다
    pub fn bind_data(&mut self, data: D) {
        if self.state >= LifecycleState::Executed {
            info!("{}: new data bound, stored results discarded", self.name);
        }
        self.data = Some(data);
        self.discard_results();
        if self.state > LifecycleState::Configured {
            self.state = LifecycleState::Configured;
        }
    }

    pub fn params(&self) -> Option<&P> {
        self.params.as_ref()
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// `run()` 선행 조건: 설정과 데이터가 모두 있어야 한다
    pub fn run_inputs(&self) -> OmaResult<(&P, &D)> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| OmaError::precondition(&self.name, "run() called before configure()"))?;
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| OmaError::precondition(&self.name, "run() called before bind_data()"))?;
        Ok((params, data))
    }

    /// 스펙트럼 결과 저장 (덮어쓰기). 이전 모드 결과는 무효가 된다
    pub fn store_spectral(&mut self, spectral: SpectralResult) -> &SpectralResult {
        self.modal = None;
        self.state = LifecycleState::Executed;
        info!(
            "{}: executed ({} lines, {} channels)",
            self.name,
            spectral.n_lines(),
            spectral.n_channels()
        );
        self.spectral.insert(spectral)
    }

    pub fn spectral(&self) -> Option<&SpectralResult> {
        self.spectral.as_ref()
    }

    /// `estimate()` 선행 조건
    pub fn require_spectral(&self) -> OmaResult<&SpectralResult> {
        self.spectral
            .as_ref()
            .ok_or_else(|| OmaError::precondition(&self.name, "estimate() called before run()"))
    }

    /// 완성된 모드 결과로 교체
    pub fn store_modal(&mut self, modal: ModalResult) -> &ModalResult {
        self.state = LifecycleState::Estimated;
        info!("{}: estimated {} modes", self.name, modal.n_modes());
        self.modal.insert(modal)
    }

    pub fn modal(&self) -> Option<&ModalResult> {
        self.modal.as_ref()
    }

    fn discard_results(&mut self) {
        self.spectral = None;
        self.modal = None;
    }
}
