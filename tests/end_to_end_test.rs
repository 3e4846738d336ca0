use nalgebra::DVector;
use num_complex::Complex64;
use oma_fdd::core::estimation::mac;
use oma_fdd::core::multisetup::{collect_modal_results, estimate_all_parallel, run_all_parallel};
use oma_fdd::core::simulation::SyntheticCampaign;
use oma_fdd::{fuse, EstimationParams, Fdd, FddMethod, LifecycleState, ModalAlgorithm, RunConfiguration};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn campaign() -> SyntheticCampaign {
    // 10채널 셋업 3개, 50 Hz 3000 샘플, 2.65 Hz / 1% 모드
    SyntheticCampaign::new(3, 3, 7)
        .with_record(3000, 50.0)
        .with_modes(vec![(2.65, 0.01)])
        .with_noise(1e-3)
        .with_seed(2024)
}

#[test]
fn test_efdd_three_setups_end_to_end() {
    init_logging();
    println!("=== EFDD 3 셋업 종단 테스트 ===");

    let campaign = campaign();
    let (setups, map) = campaign.generate().unwrap();
    assert_eq!(setups.len(), 3);
    assert!(setups.iter().all(|s| s.n_channels() == 10 && s.n_samples() == 3000));

    let config = RunConfiguration::new(FddMethod::Efdd).with_segment_length(4096);
    let mut algorithms: Vec<Fdd> = setups
        .into_iter()
        .enumerate()
        .map(|(s, series)| Fdd::with_inputs(format!("setup {}", s), config.clone(), series).unwrap())
        .collect();

    assert!(run_all_parallel(&mut algorithms).iter().all(|o| o.is_ok()));
    let params = EstimationParams::default().with_search_bandwidth(0.5);
    assert!(estimate_all_parallel(&mut algorithms, &[2.65], &params)
        .iter()
        .all(|o| o.is_ok()));

    for algorithm in &algorithms {
        assert_eq!(algorithm.state(), LifecycleState::Estimated);
        let result = algorithm.modal_result().unwrap();
        assert_eq!(result.n_modes(), 1);
        let frequency = result.frequencies[0];
        let damping = result.damping.as_ref().unwrap()[0];
        println!("{}: fn = {:.4} Hz, ζ = {:.3}%", algorithm.name(), frequency, 100.0 * damping);
        assert!((2.55..=2.75).contains(&frequency), "fn = {}", frequency);
        assert!((0.005..=0.015).contains(&damping), "ζ = {}", damping);

        let diagnostics = &result.diagnostics[0];
        assert_eq!(diagnostics.fit.envelope.len(), diagnostics.correlation.time.len());
        assert!(diagnostics.fit.r_squared > 0.9);
    }

    let results = collect_modal_results(&algorithms).unwrap();
    let fused = fuse(&results, &map).unwrap();
    let shape = fused.mode_shape(0).unwrap();
    assert_eq!(shape.len(), 3 * 10 - 2 * 3);

    // 기준 채널 구간은 마스터 셋업 그대로
    for (g, &local) in map.setup(0).unwrap().reference.iter().enumerate() {
        assert_eq!(shape[g], results[0].mode_shapes[(local, 0)]);
    }

    let truth = campaign.global_mode_shapes();
    let truth = DVector::from_iterator(truth.nrows(), truth.column(0).iter().map(|&v| Complex64::new(v, 0.0)));
    let fused_mac = mac(&shape, &truth);
    println!("병합 형상 MAC = {:.5}", fused_mac);
    assert!(fused_mac > 0.99);
    assert!(fused.frequency_std[0] < 0.05);
}

#[test]
fn test_estimate_before_run_is_precondition_error() {
    init_logging();
    let (setups, _) = campaign().generate().unwrap();
    let mut fdd = Fdd::with_inputs(
        "setup 0",
        RunConfiguration::new(FddMethod::Fdd),
        setups.into_iter().next().unwrap(),
    )
    .unwrap();

    let err = fdd.estimate(&[2.65], &EstimationParams::default()).unwrap_err();
    assert!(matches!(err, oma_fdd::OmaError::Precondition { .. }));
    println!("예상된 에러: {}", err);
}
