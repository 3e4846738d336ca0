//! # 합성 응답 생성
//!
//! 데모와 테스트용 합성 응답. 같은 시드는 항상 같은 기록을 만든다.
//!
//! - 자유 감쇠: `x_c(t) = Σ A·φ_c·e^{−ζω_n t}·sin(ω_d t) + noise`
//! - 상시 진동: 모드마다 독립 백색 잡음으로 가진한 SDOF 응답 `q_j`를 써서
//!   `x_c(t) = Σ φ_c·q_j(t) + noise`. `q_j`의 정상 상태 표준편차는 `A`

use crate::core::error::{OmaError, OmaResult};
use crate::core::multisetup::MultiSetupChannelMap;
use crate::core::types::TimeSeries;
use nalgebra::{DMatrix, Matrix2, Vector2};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// 응답을 만드는 가진 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Excitation {
    /// t = 0 에서 시작하는 자유 감쇠
    #[default]
    FreeDecay,
    /// 모드별 독립 백색 잡음 가진 (운용 중 상시 진동)
    WhiteNoise,
}

/// 주입할 모드 하나
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticMode {
    pub frequency: f64,
    pub damping: f64,
    /// 채널별 실수 모드 형상
    pub shape: Vec<f64>,
    pub amplitude: f64,
}

impl SyntheticMode {
    pub fn new(frequency: f64, damping: f64, shape: Vec<f64>) -> Self {
        Self {
            frequency,
            damping,
            shape,
            amplitude: 1.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }
}

/// 단일 셋업 자유 감쇠 기록 빌더
#[derive(Debug, Clone)]
pub struct SyntheticSetup {
    pub n_channels: usize,
    pub n_samples: usize,
    pub fs: f64,
    pub modes: Vec<SyntheticMode>,
    /// 균등 분포 측정 잡음 진폭
    pub noise_level: f64,
    pub seed: u64,
    pub excitation: Excitation,
}

impl SyntheticSetup {
    pub fn new(n_channels: usize, n_samples: usize, fs: f64) -> Self {
        Self {
            n_channels,
            n_samples,
            fs,
            modes: Vec::new(),
            noise_level: 0.0,
            seed: 0,
            excitation: Excitation::FreeDecay,
        }
    }

    pub fn with_excitation(mut self, excitation: Excitation) -> Self {
        self.excitation = excitation;
        self
    }

    pub fn with_mode(mut self, mode: SyntheticMode) -> Self {
        self.modes.push(mode);
        self
    }

    pub fn with_noise(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn generate(&self) -> OmaResult<TimeSeries> {
        for mode in &self.modes {
            if mode.shape.len() != self.n_channels {
                return Err(OmaError::InvalidData(format!(
                    "mode at {} Hz has {} shape entries for {} channels",
                    mode.frequency,
                    mode.shape.len(),
                    self.n_channels
                )));
            }
            if !(mode.frequency > 0.0 && mode.frequency < self.fs / 2.0) {
                return Err(OmaError::InvalidData(format!(
                    "mode frequency {} Hz outside (0, {}) Hz",
                    mode.frequency,
                    self.fs / 2.0
                )));
            }
            if !(0.0..1.0).contains(&mode.damping) {
                return Err(OmaError::InvalidData(format!(
                    "damping ratio must lie in [0, 1), got {}",
                    mode.damping
                )));
            }
            if self.excitation == Excitation::WhiteNoise && mode.damping <= 0.0 {
                return Err(OmaError::InvalidData(format!(
                    "white-noise excitation needs positive damping, mode at {} Hz has none",
                    mode.frequency
                )));
            }
        }
        if self.noise_level < 0.0 {
            return Err(OmaError::InvalidData(format!(
                "noise level must be non-negative, got {}",
                self.noise_level
            )));
        }

        let dt = 1.0 / self.fs;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut data = Array2::<f64>::zeros((self.n_channels, self.n_samples));
        for mode in &self.modes {
            let response = match self.excitation {
                Excitation::FreeDecay => free_decay(mode, self.n_samples, dt),
                Excitation::WhiteNoise => white_noise_response(mode, self.n_samples, dt, &mut rng),
            };
            for (t, &q) in response.iter().enumerate() {
                for (c, &phi) in mode.shape.iter().enumerate() {
                    data[[c, t]] += phi * q;
                }
            }
        }
        if self.noise_level > 0.0 {
            data.mapv_inplace(|v| v + rng.gen_range(-self.noise_level..self.noise_level));
        }
        TimeSeries::new(data, self.fs)
    }
}

fn free_decay(mode: &SyntheticMode, n_samples: usize, dt: f64) -> Vec<f64> {
    let omega_n = 2.0 * PI * mode.frequency;
    let omega_d = omega_n * (1.0 - mode.damping * mode.damping).sqrt();
    let decay = mode.damping * omega_n;
    (0..n_samples)
        .map(|t| {
            let time = t as f64 * dt;
            mode.amplitude * (-decay * time).exp() * (omega_d * time).sin()
        })
        .collect()
}

/// `q̈ + 2ζω_n q̇ + ω_n² q = f`, f는 샘플 사이 일정한 균등 분포 [-1, 1) 힘.
/// 상태 전이 `x_{k+1} = Φ x_k + Γ f_k` 는 영차 유지 가정에서 정확하다.
fn white_noise_response(mode: &SyntheticMode, n_samples: usize, dt: f64, rng: &mut StdRng) -> Vec<f64> {
    let omega_n = 2.0 * PI * mode.frequency;
    let sigma = mode.damping * omega_n;
    let omega_d = omega_n * (1.0 - mode.damping * mode.damping).sqrt();
    let (s, c) = (omega_d * dt).sin_cos();
    let decay = (-sigma * dt).exp();

    let phi = Matrix2::new(
        decay * (c + sigma * s / omega_d),
        decay * s / omega_d,
        -decay * omega_n * omega_n * s / omega_d,
        decay * (c - sigma * s / omega_d),
    );
    let gamma = Vector2::new(
        (1.0 - phi[(1, 1)] - 2.0 * sigma * phi[(0, 1)]) / (omega_n * omega_n),
        phi[(0, 1)],
    );

    // 힘 분산 1/3 일 때 Var(q) ≈ dt / (12 ζ ω_n³)
    let stationary_std = (dt / (12.0 * mode.damping * omega_n.powi(3))).sqrt();
    let gain = mode.amplitude / stationary_std;
    // 초기 과도 응답이 e^{-5} 아래로 줄어들 때까지 버린다
    let warm_up = (5.0 / (sigma * dt)).ceil() as usize;

    let mut state = Vector2::<f64>::zeros();
    let mut response = Vec::with_capacity(n_samples);
    for step in 0..warm_up + n_samples {
        let force: f64 = rng.gen_range(-1.0..1.0);
        state = phi * state + gamma * force;
        if step >= warm_up {
            response.push(gain * state[0]);
        }
    }
    response
}

/// 기준 채널을 공유하는 다중 셋업 측정 캠페인
///
/// 각 셋업의 로컬 채널 순서는 [기준 채널, 이동 채널].
/// 전역 채널 g의 위치 좌표는 구조물 길이 방향으로 섞여 있고,
/// j번째 모드 형상은 `sin((j+1)πx)`.
#[derive(Debug, Clone)]
pub struct SyntheticCampaign {
    pub n_setups: usize,
    pub n_references: usize,
    pub moving_per_setup: usize,
    pub n_samples: usize,
    pub fs: f64,
    /// (고유 진동수, 감쇠비)
    pub modes: Vec<(f64, f64)>,
    pub noise_level: f64,
    pub seed: u64,
    pub excitation: Excitation,
}

impl SyntheticCampaign {
    pub fn new(n_setups: usize, n_references: usize, moving_per_setup: usize) -> Self {
        Self {
            n_setups,
            n_references,
            moving_per_setup,
            n_samples: 3000,
            fs: 50.0,
            modes: vec![(2.65, 0.01)],
            noise_level: 1e-3,
            seed: 42,
            excitation: Excitation::FreeDecay,
        }
    }

    pub fn with_modes(mut self, modes: Vec<(f64, f64)>) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_record(mut self, n_samples: usize, fs: f64) -> Self {
        self.n_samples = n_samples;
        self.fs = fs;
        self
    }

    pub fn with_noise(mut self, noise_level: f64) -> Self {
        self.noise_level = noise_level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_excitation(mut self, excitation: Excitation) -> Self {
        self.excitation = excitation;
        self
    }

    pub fn channels_per_setup(&self) -> usize {
        self.n_references + self.moving_per_setup
    }

    pub fn global_channel_count(&self) -> usize {
        self.n_references + self.n_setups * self.moving_per_setup
    }

    /// (전역 채널 수, 모드 수), 전역 순서는 채널 맵 배치와 같다
    pub fn global_mode_shapes(&self) -> DMatrix<f64> {
        let n = self.global_channel_count();
        DMatrix::from_fn(n, self.modes.len(), |g, j| {
            let x = (((g * 7 + 11) % n) as f64 + 0.5) / n as f64;
            ((j + 1) as f64 * PI * x).sin()
        })
    }

    pub fn channel_map(&self) -> OmaResult<MultiSetupChannelMap> {
        MultiSetupChannelMap::uniform(
            (0..self.n_references).collect(),
            &vec![self.channels_per_setup(); self.n_setups],
        )
    }

    /// 셋업별 기록. 셋업마다 가진 크기가 달라 그대로 이어 붙일 수 없다
    pub fn generate(&self) -> OmaResult<(Vec<TimeSeries>, MultiSetupChannelMap)> {
        if self.n_setups == 0 {
            return Err(OmaError::SetupMismatch("at least one setup is required".to_string()));
        }
        let channel_map = self.channel_map()?;
        let global = self.global_mode_shapes();
        let mut setups = Vec::with_capacity(self.n_setups);
        for s in 0..self.n_setups {
            let mut setup = SyntheticSetup::new(self.channels_per_setup(), self.n_samples, self.fs)
                .with_noise(self.noise_level)
                .with_seed(self.seed.wrapping_add(s as u64))
                .with_excitation(self.excitation);
            let moving = channel_map.moving_positions(s);
            for (j, &(frequency, damping)) in self.modes.iter().enumerate() {
                let shape: Vec<f64> = channel_map
                    .reference_positions()
                    .chain(moving.clone())
                    .map(|g| global[(g, j)])
                    .collect();
                let amplitude = (1.0 + 0.35 * s as f64) / (j + 1) as f64;
                setup = setup.with_mode(SyntheticMode::new(frequency, damping, shape).with_amplitude(amplitude));
            }
            setups.push(setup.generate()?);
        }
        Ok((setups, channel_map))
    }
}
