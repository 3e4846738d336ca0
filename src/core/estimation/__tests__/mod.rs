//! # 모드 추정 모듈 테스트

pub mod bell_test;
