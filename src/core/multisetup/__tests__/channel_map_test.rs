//! # 채널 맵 단위테스트

use crate::core::error::OmaError;
use crate::core::multisetup::channel_map::{GlobalChannel, MultiSetupChannelMap};

#[test]
fn 전역_채널_배치_테스트() {
    let map = MultiSetupChannelMap::uniform(vec![0, 1, 2], &[10, 10, 10]).unwrap();

    assert_eq!(map.n_setups(), 3);
    assert_eq!(map.n_references(), 3);
    assert_eq!(map.global_channel_count(), 24);
    assert_eq!(map.reference_positions(), 0..3);
    assert_eq!(map.moving_positions(0), 3..10);
    assert_eq!(map.moving_positions(1), 10..17);
    assert_eq!(map.moving_positions(2), 17..24);

    let layout = map.layout();
    assert_eq!(layout.len(), 24);
    assert_eq!(
        layout[0],
        GlobalChannel {
            setup: 0,
            local_index: 0,
            is_reference: true
        }
    );
    assert_eq!(
        layout[10],
        GlobalChannel {
            setup: 1,
            local_index: 3,
            is_reference: false
        }
    );
    println!("✅ 전역 채널 배치 테스트 통과");
}

#[test]
fn 비연속_기준채널_테스트() {
    let map = MultiSetupChannelMap::new(vec![vec![2, 5], vec![0, 1]], &[6, 4]).unwrap();
    assert_eq!(map.setup(0).unwrap().moving, vec![0, 1, 3, 4]);
    assert_eq!(map.setup(1).unwrap().moving, vec![2, 3]);
    assert_eq!(map.global_channel_count(), 2 + 4 + 2);
    assert!(map.setup(2).is_none());
    println!("✅ 비연속 기준채널 테스트 통과");
}

#[test]
fn 잘못된_채널맵_에러_테스트() {
    assert!(matches!(
        MultiSetupChannelMap::new(vec![vec![0, 1], vec![0]], &[4, 4]),
        Err(OmaError::SetupMismatch(_))
    ));
    assert!(matches!(
        MultiSetupChannelMap::new(vec![vec![0, 4]], &[4]),
        Err(OmaError::Configuration { .. })
    ));
    assert!(matches!(
        MultiSetupChannelMap::new(vec![vec![1, 1]], &[4]),
        Err(OmaError::Configuration { .. })
    ));
    assert!(matches!(
        MultiSetupChannelMap::new(vec![Vec::new()], &[4]),
        Err(OmaError::Configuration { .. })
    ));
    assert!(matches!(
        MultiSetupChannelMap::new(Vec::new(), &[]),
        Err(OmaError::SetupMismatch(_))
    ));
    assert!(matches!(
        MultiSetupChannelMap::new(vec![vec![0]], &[4, 4]),
        Err(OmaError::SetupMismatch(_))
    ));
    println!("✅ 잘못된 채널맵 에러 테스트 통과");
}
