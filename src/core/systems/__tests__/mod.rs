//! # 시스템 모듈 테스트
//!
//! 설정, 생명주기, 알고리즘 인터페이스 단위테스트

pub mod config_test;
pub mod state_management_test;
