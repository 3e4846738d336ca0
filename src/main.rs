use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use oma_fdd::core::multisetup::{collect_modal_results, estimate_all_parallel, run_all_parallel};
use oma_fdd::core::simulation::SyntheticCampaign;
use oma_fdd::{fuse, EstimationParams, Fdd, FddMethod, FusedModalResult, RunConfiguration};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

/// 데모 구조물에 주입하는 모드 (고유 진동수, 감쇠비)
const DEMO_MODES: [(f64, f64); 2] = [(2.65, 0.01), (7.1, 0.015)];
const DEMO_REFERENCES: usize = 3;
const DEMO_MOVING: usize = 7;

fn main() {
    env_logger::init();

    let matches = Command::new("oma_fdd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("주파수 영역 분해 기반 운용 모드 해석 도구")
        .subcommand(
            Command::new("demo")
                .about("합성 다중 셋업 기록으로 식별 + PoSER 병합 실행")
                .arg(
                    Arg::new("method")
                        .long("method")
                        .short('m')
                        .value_name("METHOD")
                        .help("fdd, efdd, fsdd (기본: efdd)"),
                )
                .arg(
                    Arg::new("frequency")
                        .long("frequency")
                        .short('f')
                        .value_name("HZ")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(f64))
                        .help("선택 주파수, 여러 번 지정 가능"),
                )
                .arg(
                    Arg::new("segment-length")
                        .long("segment-length")
                        .value_name("SAMPLES")
                        .value_parser(value_parser!(usize))
                        .help("스펙트럼 추정 창 길이"),
                )
                .arg(
                    Arg::new("setups")
                        .long("setups")
                        .short('n')
                        .value_name("COUNT")
                        .value_parser(value_parser!(usize))
                        .default_value("3")
                        .help("셋업 수"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("RunConfiguration JSON 파일"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("결과를 JSON으로 출력"),
                ),
        )
        .subcommand(
            Command::new("check-config")
                .about("RunConfiguration JSON 파일 검증")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("검증할 설정 파일"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("demo", sub_matches)) => handle_demo(sub_matches),
        Some(("check-config", sub_matches)) => handle_check_config(sub_matches),
        _ => {
            println!("❌ 명령을 지정해주세요. --help를 참조하세요.");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ 오류: {:#}", e);
        process::exit(1);
    }
}

#[derive(Debug, Serialize)]
struct DemoReport {
    method: FddMethod,
    setups: usize,
    global_channels: usize,
    modes: Vec<ModeReport>,
}

#[derive(Debug, Serialize)]
struct ModeReport {
    frequency: f64,
    frequency_std: f64,
    damping: Option<f64>,
    damping_std: Option<f64>,
    shape_magnitude: Vec<f64>,
    shape_phase_deg: Vec<f64>,
}

fn handle_demo(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => RunConfiguration::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RunConfiguration::new(FddMethod::Efdd).with_segment_length(4096),
    };
    if let Some(method) = matches.get_one::<String>("method") {
        config.method = method.parse()?;
    }
    if let Some(&segment_length) = matches.get_one::<usize>("segment-length") {
        config.segment_length = segment_length;
    }
    let n_setups = matches
        .get_one::<usize>("setups")
        .copied()
        .context("missing --setups")?;
    if n_setups == 0 {
        bail!("--setups must be at least 1");
    }
    let selected: Vec<f64> = match matches.get_many::<f64>("frequency") {
        Some(values) => values.copied().collect(),
        None => DEMO_MODES.iter().map(|&(f, _)| f).collect(),
    };

    let campaign = SyntheticCampaign::new(n_setups, DEMO_REFERENCES, DEMO_MOVING).with_modes(DEMO_MODES.to_vec());
    let (setups, channel_map) = campaign.generate()?;

    println!(
        "🔧 {} 셋업 × {} 채널, {} 방법, 창 길이 {}",
        n_setups,
        campaign.channels_per_setup(),
        config.method.label(),
        config.segment_length
    );

    let mut algorithms = setups
        .into_iter()
        .enumerate()
        .map(|(s, series)| Fdd::with_inputs(format!("setup {}", s), config.clone(), series))
        .collect::<oma_fdd::OmaResult<Vec<_>>>()?;

    for (s, outcome) in run_all_parallel(&mut algorithms).into_iter().enumerate() {
        outcome.with_context(|| format!("setup {} spectral run", s))?;
    }
    let params = EstimationParams::default().with_search_bandwidth(0.5);
    for (s, outcome) in estimate_all_parallel(&mut algorithms, &selected, &params)
        .into_iter()
        .enumerate()
    {
        outcome.with_context(|| format!("setup {} estimation", s))?;
    }

    let fused = fuse(&collect_modal_results(&algorithms)?, &channel_map)?;
    let report = build_report(config.method, n_setups, &fused);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(())
}

fn handle_check_config(matches: &ArgMatches) -> Result<()> {
    let path = matches.get_one::<PathBuf>("file").context("missing FILE")?;
    let config = RunConfiguration::from_json_file(path)
        .with_context(|| format!("validating {}", path.display()))?;
    println!("✅ {} 설정 유효", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn build_report(method: FddMethod, setups: usize, fused: &FusedModalResult) -> DemoReport {
    let modes = (0..fused.n_modes())
        .map(|j| {
            let shape = fused.mode_shapes.column(j);
            ModeReport {
                frequency: fused.frequencies[j],
                frequency_std: fused.frequency_std[j],
                damping: fused.damping.as_ref().map(|d| d[j]),
                damping_std: fused.damping_std.as_ref().map(|d| d[j]),
                shape_magnitude: shape.iter().map(|c| c.norm()).collect(),
                shape_phase_deg: shape.iter().map(|c| c.arg().to_degrees()).collect(),
            }
        })
        .collect();
    DemoReport {
        method,
        setups,
        global_channels: fused.mode_shapes.nrows(),
        modes,
    }
}

fn print_table(report: &DemoReport) {
    println!("\n📊 병합 결과 ({} 전역 채널)", report.global_channels);
    println!("{:>6} {:>12} {:>10} {:>10} {:>10}", "mode", "fn [Hz]", "σ fn", "ζ [%]", "σ ζ [%]");
    for (j, mode) in report.modes.iter().enumerate() {
        let damping = mode
            .damping
            .map_or_else(|| "-".to_string(), |d| format!("{:.3}", 100.0 * d));
        let damping_std = mode
            .damping_std
            .map_or_else(|| "-".to_string(), |d| format!("{:.3}", 100.0 * d));
        println!(
            "{:>6} {:>12.4} {:>10.4} {:>10} {:>10}",
            j + 1,
            mode.frequency,
            mode.frequency_std,
            damping,
            damping_std
        );
    }
}
