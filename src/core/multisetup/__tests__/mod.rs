//! # 다중 셋업 모듈 테스트

pub mod channel_map_test;
