//! # 다중 셋업 모듈
//!
//! 채널 맵, PoSER 결과 병합, 셋업별 병렬 실행 보조 함수

pub mod batch;
pub mod channel_map;
pub mod poser;

pub use batch::{collect_modal_results, estimate_all_parallel, run_all_parallel};
pub use channel_map::{GlobalChannel, MultiSetupChannelMap, SetupChannels};
pub use poser::{fuse, FusedModalResult};

#[cfg(test)]
mod __tests__;
