//! # PreGER 다중 셋업 병합 단위테스트

use crate::core::error::OmaError;
use crate::core::multisetup::MultiSetupChannelMap;
use crate::core::simulation::SyntheticCampaign;
use crate::core::spectral::preger::estimate_csd_multisetup;
use crate::core::systems::config::{RunConfiguration, SpectralMethod};
use crate::core::types::TimeSeries;
use nalgebra::DMatrix;
use num_complex::Complex64;

fn block(g: &DMatrix<Complex64>, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> DMatrix<Complex64> {
    g.view((rows.start, cols.start), (rows.len(), cols.len())).into_owned()
}

#[test]
fn 전역_텐서_크기와_에르미트_테스트() {
    let campaign = SyntheticCampaign::new(3, 3, 7);
    let (setups, map) = campaign.generate().unwrap();
    let config = RunConfiguration::default().with_segment_length(1024);

    let (freq, tensor) = estimate_csd_multisetup(&setups, &map, &config).unwrap();
    assert_eq!(freq.len(), 513);
    assert_eq!(tensor.len(), 513);
    for g in &tensor {
        assert_eq!(g.shape(), (24, 24));
        assert!((g - g.adjoint()).norm() <= 1e-12 * g.norm());
    }
    println!("✅ 전역 텐서 크기와 에르미트 테스트 통과: {} 채널", tensor[0].nrows());
}

#[test]
fn 가진_수준_정규화_테스트() {
    // 같은 기록을 두 배 크기로 다시 측정한 셋업은 정규화 후 같은 블록이 된다
    let campaign = SyntheticCampaign::new(1, 3, 4).with_seed(3);
    let (mut setups, _) = campaign.generate().unwrap();
    let base = setups.remove(0);
    let louder = TimeSeries::new(base.data().mapv(|v| 2.0 * v), base.fs()).unwrap();
    let map = MultiSetupChannelMap::uniform(vec![0, 1, 2], &[7, 7]).unwrap();
    // 주기도는 자기 스펙트럼 trace가 항상 양수
    let config = RunConfiguration::default()
        .with_segment_length(512)
        .with_spectral_method(SpectralMethod::Periodogram);

    let (_, tensor) = estimate_csd_multisetup(&[base, louder], &map, &config).unwrap();
    for g in tensor.iter().skip(1).take(100) {
        let first = block(g, map.moving_positions(0), map.moving_positions(0));
        let second = block(g, map.moving_positions(1), map.moving_positions(1));
        assert!((&first - &second).norm() <= 1e-9 * first.norm());
    }
    println!("✅ 가진 수준 정규화 테스트 통과");
}

#[test]
fn 셋업_불일치_에러_테스트() {
    let campaign = SyntheticCampaign::new(3, 3, 7);
    let (setups, map) = campaign.generate().unwrap();
    let config = RunConfiguration::default().with_segment_length(512);

    let result = estimate_csd_multisetup(&setups[..2], &map, &config);
    assert!(matches!(result, Err(OmaError::SetupMismatch(_))));

    let resampled = TimeSeries::new(setups[1].data().to_owned(), 100.0).unwrap();
    let mixed = vec![setups[0].clone(), resampled, setups[2].clone()];
    let result = estimate_csd_multisetup(&mixed, &map, &config);
    assert!(matches!(result, Err(OmaError::SetupMismatch(_))));
    println!("✅ 셋업 불일치 에러 테스트 통과");
}
