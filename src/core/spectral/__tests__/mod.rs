//! # 스펙트럼 모듈 테스트
//!
//! CSD 추정, 특이값 분해, PreGER 병합 단위테스트

pub mod preger_test;
