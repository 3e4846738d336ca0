//! 다중 셋업 채널 구성
//!
//! 셋업별 기준 채널(모든 셋업에 공통인 센서)과 이동 채널 인덱스,
//! 그리고 병합 결과의 전역 채널 배치를 정의한다.
//! 전역 순서: [기준 채널, 셋업 0 이동 채널, 셋업 1 이동 채널, ...]

use crate::core::error::{OmaError, OmaResult};
use serde::Serialize;
use std::ops::Range;

/// 한 셋업의 채널 분할
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupChannels {
    pub channel_count: usize,
    /// 기준 채널의 셋업 내 인덱스 (모든 셋업에서 같은 물리 순서)
    pub reference: Vec<usize>,
    /// 나머지 채널, 오름차순
    pub moving: Vec<usize>,
}

/// 전역 채널 하나의 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalChannel {
    pub setup: usize,
    pub local_index: usize,
    pub is_reference: bool,
}

/// 불변 채널 맵
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiSetupChannelMap {
    setups: Vec<SetupChannels>,
}

impl MultiSetupChannelMap {
    /// `reference_indices[s]`는 셋업 s의 기준 채널 인덱스, `channel_counts[s]`는 채널 수
    pub fn new(reference_indices: Vec<Vec<usize>>, channel_counts: &[usize]) -> OmaResult<Self> {
        if reference_indices.is_empty() {
            return Err(OmaError::SetupMismatch("at least one setup is required".to_string()));
        }
        if reference_indices.len() != channel_counts.len() {
            return Err(OmaError::SetupMismatch(format!(
                "{} reference lists for {} setups",
                reference_indices.len(),
                channel_counts.len()
            )));
        }
        let n_ref = reference_indices[0].len();
        if n_ref == 0 {
            return Err(OmaError::configuration(
                "reference_indices",
                "each setup needs at least one reference channel",
            ));
        }

        let mut setups = Vec::with_capacity(channel_counts.len());
        for (s, (reference, &count)) in reference_indices.into_iter().zip(channel_counts).enumerate() {
            if reference.len() != n_ref {
                return Err(OmaError::SetupMismatch(format!(
                    "setup {} has {} reference channels, setup 0 has {}",
                    s,
                    reference.len(),
                    n_ref
                )));
            }
            let mut seen = vec![false; count];
            for &r in &reference {
                if r >= count {
                    return Err(OmaError::configuration(
                        "reference_indices",
                        format!("setup {}: reference index {} out of {} channels", s, r, count),
                    ));
                }
                if seen[r] {
                    return Err(OmaError::configuration(
                        "reference_indices",
                        format!("setup {}: reference index {} listed twice", s, r),
                    ));
                }
                seen[r] = true;
            }
            let moving = (0..count).filter(|&c| !seen[c]).collect();
            setups.push(SetupChannels {
                channel_count: count,
                reference,
                moving,
            });
        }
        Ok(Self { setups })
    }

    /// 모든 셋업이 같은 기준 인덱스를 쓰는 흔한 구성
    pub fn uniform(reference: Vec<usize>, channel_counts: &[usize]) -> OmaResult<Self> {
        Self::new(vec![reference; channel_counts.len()], channel_counts)
    }

    pub fn n_setups(&self) -> usize {
        self.setups.len()
    }

    pub fn n_references(&self) -> usize {
        self.setups[0].reference.len()
    }

    pub fn setups(&self) -> &[SetupChannels] {
        &self.setups
    }

    pub fn setup(&self, index: usize) -> Option<&SetupChannels> {
        self.setups.get(index)
    }

    /// 채널 총합 − 중복 기준 채널
    pub fn global_channel_count(&self) -> usize {
        self.n_references() + self.setups.iter().map(|s| s.moving.len()).sum::<usize>()
    }

    pub fn reference_positions(&self) -> Range<usize> {
        0..self.n_references()
    }

    /// 셋업 s 이동 채널의 전역 위치
    pub fn moving_positions(&self, setup: usize) -> Range<usize> {
        let start = self.n_references()
            + self.setups[..setup].iter().map(|s| s.moving.len()).sum::<usize>();
        start..start + self.setups[setup].moving.len()
    }

    /// 전역 채널 배치. 기준 채널은 마스터(셋업 0) 인덱스로 표기
    pub fn layout(&self) -> Vec<GlobalChannel> {
        let master = &self.setups[0];
        let references = master.reference.iter().map(|&local_index| GlobalChannel {
            setup: 0,
            local_index,
            is_reference: true,
        });
        let moving = self.setups.iter().enumerate().flat_map(|(setup, channels)| {
            channels.moving.iter().map(move |&local_index| GlobalChannel {
                setup,
                local_index,
                is_reference: false,
            })
        });
        references.chain(moving).collect()
    }
}
