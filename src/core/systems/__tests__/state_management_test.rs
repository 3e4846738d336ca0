//! # 생명주기 상태 기계 단위테스트

use crate::core::error::OmaError;
use crate::core::systems::config::{FddMethod, RunConfiguration};
use crate::core::systems::state_management::{AlgorithmLifecycle, LifecycleState};
use crate::core::types::{ModalResult, SpectralResult};
use nalgebra::DMatrix;
use num_complex::Complex64;

fn tiny_spectral() -> SpectralResult {
    let csd = vec![DMatrix::<Complex64>::identity(2, 2); 3];
    SpectralResult::from_csd(vec![0.0, 0.5, 1.0], csd, 1.0).unwrap()
}

#[test]
fn 상태_순서_테스트() {
    assert!(LifecycleState::Unconfigured < LifecycleState::Configured);
    assert!(LifecycleState::Configured < LifecycleState::Executed);
    assert!(LifecycleState::Executed < LifecycleState::Estimated);
    println!("✅ 상태 순서 테스트 통과");
}

#[test]
fn 정상_전이_테스트() {
    let mut lifecycle: AlgorithmLifecycle<RunConfiguration, ()> = AlgorithmLifecycle::new("fdd");
    assert_eq!(lifecycle.state(), LifecycleState::Unconfigured);

    lifecycle.configure(RunConfiguration::default()).unwrap();
    assert_eq!(lifecycle.state(), LifecycleState::Configured);
    lifecycle.bind_data(());
    assert!(lifecycle.run_inputs().is_ok());

    lifecycle.store_spectral(tiny_spectral());
    assert_eq!(lifecycle.state(), LifecycleState::Executed);
    assert!(lifecycle.require_spectral().is_ok());

    lifecycle.store_modal(ModalResult::empty(FddMethod::Fdd, 2));
    assert_eq!(lifecycle.state(), LifecycleState::Estimated);
    assert!(lifecycle.modal().is_some());
    println!("✅ 정상 전이 테스트 통과");
}

#[test]
fn 선행조건_위반_테스트() {
    let mut lifecycle: AlgorithmLifecycle<RunConfiguration, ()> = AlgorithmLifecycle::new("efdd");
    assert!(matches!(lifecycle.run_inputs(), Err(OmaError::Precondition { .. })));
    assert!(matches!(lifecycle.require_spectral(), Err(OmaError::Precondition { .. })));

    lifecycle.configure(RunConfiguration::default()).unwrap();
    let err = lifecycle.run_inputs().unwrap_err();
    assert!(err.to_string().contains("bind_data"));
    assert!(!err.is_recoverable());
    println!("✅ 선행조건 위반 테스트 통과: {}", err);
}

#[test]
fn 잘못된_설정_상태_유지_테스트() {
    let mut lifecycle: AlgorithmLifecycle<RunConfiguration, ()> = AlgorithmLifecycle::new("fdd");
    let result = lifecycle.configure(RunConfiguration::default().with_overlap(-0.1));
    assert!(result.is_err());
    assert_eq!(lifecycle.state(), LifecycleState::Unconfigured);
    assert!(lifecycle.params().is_none());
    println!("✅ 잘못된 설정 상태 유지 테스트 통과");
}

#[test]
fn 재연결_결과_폐기_테스트() {
    let mut lifecycle: AlgorithmLifecycle<RunConfiguration, u8> = AlgorithmLifecycle::new("fdd");
    lifecycle.configure(RunConfiguration::default()).unwrap();
    lifecycle.bind_data(1);
    lifecycle.store_spectral(tiny_spectral());
    lifecycle.store_modal(ModalResult::empty(FddMethod::Fdd, 2));

    // 새 데이터는 이전 결과를 무효화한다
    lifecycle.bind_data(2);
    assert_eq!(lifecycle.state(), LifecycleState::Configured);
    assert!(lifecycle.spectral().is_none());
    assert!(lifecycle.modal().is_none());
    assert_eq!(lifecycle.data(), Some(&2));

    // 재실행은 모드 결과를 지운다
    lifecycle.store_spectral(tiny_spectral());
    lifecycle.store_modal(ModalResult::empty(FddMethod::Fdd, 2));
    lifecycle.store_spectral(tiny_spectral());
    assert_eq!(lifecycle.state(), LifecycleState::Executed);
    assert!(lifecycle.modal().is_none());

    // 재설정도 마찬가지
    lifecycle
        .configure(RunConfiguration::new(FddMethod::Efdd))
        .unwrap();
    assert_eq!(lifecycle.state(), LifecycleState::Configured);
    assert!(lifecycle.spectral().is_none());
    assert_eq!(lifecycle.data(), Some(&2));
    println!("✅ 재연결 결과 폐기 테스트 통과");
}
