//! # 실행 설정 단위테스트
//!
//! RunConfiguration과 EstimationParams의 기본값, 검증, JSON 로딩 검증

use crate::core::error::OmaError;
use crate::core::systems::config::{EstimationParams, FddMethod, RunConfiguration, RunParams, SpectralMethod};
use std::io::Write;

#[test]
fn 실행_설정_기본값_테스트() {
    let config = RunConfiguration::default();

    assert_eq!(config.method, FddMethod::Fdd);
    assert_eq!(config.segment_length, 1024);
    assert_eq!(config.overlap, 0.5);
    assert_eq!(config.spectral_method, SpectralMethod::Correlogram);
    assert_eq!(config.max_order, None);
    assert!(config.validate().is_ok());

    approx::assert_relative_eq!(config.frequency_resolution(0.02), 50.0 / 1024.0, epsilon = 1e-12);
    println!("✅ 실행 설정 기본값 테스트 통과");
}

#[test]
fn 추정_파라미터_기본값_테스트() {
    let params = EstimationParams::default();

    assert_eq!(params.search_bandwidth, 0.1);
    assert_eq!(params.bell_bandwidth, 1.0);
    assert_eq!(params.mac_bell_limit, 0.85);
    assert_eq!(params.close_modes, 1);
    assert_eq!(params.skip_peaks, 3);
    assert_eq!(params.max_peaks, 20);
    assert_eq!(params.mac_dedup_threshold, 0.95);
    assert!(params.validate().is_ok());
    println!("✅ 추정 파라미터 기본값 테스트 통과");
}

#[test]
fn 범위_밖_설정_에러_테스트() {
    let short = RunConfiguration::default().with_segment_length(2);
    assert!(matches!(
        short.validate(),
        Err(OmaError::Configuration { field: "segment_length", .. })
    ));

    let overlap = RunConfiguration::default().with_overlap(1.0);
    assert!(matches!(
        overlap.validate(),
        Err(OmaError::Configuration { field: "overlap", .. })
    ));

    let order = RunConfiguration {
        max_order: Some(0),
        ..RunConfiguration::default()
    };
    assert!(order.validate().is_err());

    // 홀수 창 길이는 허용
    assert!(RunConfiguration::default().with_segment_length(255).validate().is_ok());

    let params = EstimationParams {
        max_peaks: 1,
        ..EstimationParams::default()
    };
    assert!(matches!(
        params.validate(),
        Err(OmaError::Configuration { field: "max_peaks", .. })
    ));
    let mac = EstimationParams {
        mac_dedup_threshold: 1.5,
        ..EstimationParams::default()
    };
    assert!(mac.validate().is_err());
    assert!(EstimationParams::default().with_search_bandwidth(0.0).validate().is_err());
    println!("✅ 범위 밖 설정 에러 테스트 통과");
}

#[test]
fn 방법_문자열_파싱_테스트() {
    assert_eq!("EFDD".parse::<FddMethod>().unwrap(), FddMethod::Efdd);
    assert_eq!("fsdd".parse::<FddMethod>().unwrap(), FddMethod::Fsdd);
    assert!(matches!(
        "ssi".parse::<FddMethod>(),
        Err(OmaError::Configuration { field: "method", .. })
    ));
    assert!(FddMethod::Efdd.is_enhanced());
    assert!(!FddMethod::Fdd.is_enhanced());
    println!("✅ 방법 문자열 파싱 테스트 통과");
}

#[test]
fn 부분_json_설정_테스트() {
    let config = RunConfiguration::from_json_str(r#"{"method": "efdd", "segment_length": 2048}"#).unwrap();
    assert_eq!(config.method, FddMethod::Efdd);
    assert_eq!(config.segment_length, 2048);
    assert_eq!(config.overlap, 0.5);

    let invalid = RunConfiguration::from_json_str(r#"{"overlap": 1.2}"#);
    assert!(matches!(invalid, Err(OmaError::Configuration { field: "overlap", .. })));

    let unknown = RunConfiguration::from_json_str(r#"{"method": "ssi"}"#);
    assert!(matches!(unknown, Err(OmaError::Configuration { field: "json", .. })));

    let params = EstimationParams::from_json_str(r#"{"search_bandwidth": 0.5}"#).unwrap();
    assert_eq!(params.search_bandwidth, 0.5);
    assert_eq!(params.max_peaks, 20);
    println!("✅ 부분 JSON 설정 테스트 통과");
}

#[test]
fn 설정_파일_왕복_테스트() {
    let config = RunConfiguration::new(FddMethod::Fsdd)
        .with_segment_length(512)
        .with_spectral_method(SpectralMethod::Periodogram);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();

    let loaded = RunConfiguration::from_json_file(file.path()).unwrap();
    assert_eq!(loaded, config);

    let missing = RunConfiguration::from_json_file("/nonexistent/oma_fdd.json");
    assert!(matches!(missing, Err(OmaError::Configuration { field: "file", .. })));
    println!("✅ 설정 파일 왕복 테스트 통과");
}
