//! 合并流水线端到端测试
//!
//! 用 hound 生成输入文件，运行完整的两遍合并，再用 hound 独立读回输出校验。


use acoustic_merge::error::AudioError;
use acoustic_merge::{
    LogLevel, MergeConfig, MergeReporter, Phase, RecordingReporter, SilentReporter, run,
};
use audio_test_fixtures::{
    MergeWorkspace, fmt_payload, log, read_pcm16, riff_bytes, s16le, write_float32, write_pcm16,
};
use std::path::PathBuf;

fn expected_fixed(amplitude: f64) -> i16 {
    (amplitude.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

#[test]
fn test_three_files_concatenate_in_order() {
    log("三个文件按顺序拼接", "Three files concatenate in order");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 1000, 8000);
    ws.add_constant("b.wav", 8000, 2000, 8000);
    ws.add_constant("c.wav", 8000, 3000, 8000);

    let report = run(ws.files(), &ws.config(), &mut SilentReporter).unwrap();
    assert_eq!(report.totals.total_samples, 24000);
    assert_eq!(report.totals.file_count, 3);

    let written = report.output.as_ref().expect("应写出文件");
    assert_eq!(written.output_path, ws.output_path());
    assert_eq!(written.samples_written, 24000);
    assert!(written.is_consistent());
    assert!((written.duration_seconds - 3.0).abs() < 1e-9);

    let (spec, samples) = read_pcm16(&ws.output_path());
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(samples.len(), 24000);
    assert!(samples[..8000].iter().all(|&s| s == 1000));
    assert!(samples[8000..16000].iter().all(|&s| s == 2000));
    assert!(samples[16000..].iter().all(|&s| s == 3000));
}

#[test]
fn test_single_file_is_reproduced() {
    log("单文件原样输出", "Single file is reproduced unchanged");

    let samples: Vec<i16> = (0..4410).map(|i| ((i * 37) % 32000 - 16000) as i16).collect();
    let mut ws = MergeWorkspace::new();
    ws.add("stereo.wav", 44100, 2, &samples);

    let report = run(ws.files(), &ws.config(), &mut SilentReporter).unwrap();
    assert_eq!(report.scale, 1.0);

    let (spec, out) = read_pcm16(&ws.output_path());
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.channels, 2);
    assert_eq!(out, samples);
}

#[test]
fn test_gain_scales_and_clips() {
    log("增益与钳位", "Gain scales and clips");

    let mut ws = MergeWorkspace::new();
    ws.add("mix.wav", 8000, 1, &[1000, -1000, 24000, -24000]);

    let config = MergeConfig {
        gain_percent: 150.0,
        ..ws.config()
    };
    run(ws.files(), &config, &mut SilentReporter).unwrap();
    let (_, out) = read_pcm16(&ws.output_path());
    assert_eq!(out[0], 1500);
    assert_eq!(out[1], -1500);
    // 24000 × 1.5 超出满刻度
    assert_eq!(out[2], i16::MAX);
    assert_eq!(out[3], -i16::MAX);
}

#[test]
fn test_crossfade_ramp_and_length() {
    log("交叉淡化线性过渡", "Crossfade produces a linear ramp");

    let len_a = 50;
    let len_b = 40;
    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 1000, 16000, len_a);
    ws.add_constant("b.wav", 1000, -16000, len_b);

    let config = MergeConfig {
        crossfade_ms: 10,
        ..ws.config()
    };
    let report = run(ws.files(), &config, &mut SilentReporter).unwrap();
    assert_eq!(report.totals.fade_window, 10);
    assert_eq!(report.totals.blended_boundaries, 1);
    assert_eq!(report.totals.total_samples, (len_a + len_b - 10) as u64);

    let (_, out) = read_pcm16(&ws.output_path());
    assert_eq!(out.len(), len_a + len_b - 10);
    assert!(out[..len_a - 10].iter().all(|&s| s == 16000));

    let a = 16000.0 / 32768.0;
    for k in 0..10 {
        let alpha = k as f64 / 10.0;
        let expected = expected_fixed((1.0 - alpha) * a - alpha * a);
        let actual = out[len_a - 10 + k];
        assert!(
            (actual as i32 - expected as i32).abs() <= 1,
            "k={k}: {actual} vs {expected}"
        );
    }
    assert_eq!(out[len_a - 10], 16000);
    assert!(out[len_a..].iter().all(|&s| s == -16000));
}

#[test]
fn test_stereo_crossfade_window_counts_channels() {
    log("立体声交叉淡化", "Stereo crossfade window spans both channels");

    // 1000 Hz、10 ms → 10 帧 → 20 个交错样本
    let frames_a = 30;
    let frames_b = 20;
    let a: Vec<i16> = (0..frames_a).flat_map(|_| [16000, -16000]).collect();
    let b: Vec<i16> = (0..frames_b).flat_map(|_| [0, 8000]).collect();

    let mut ws = MergeWorkspace::new();
    ws.add("a.wav", 1000, 2, &a);
    ws.add("b.wav", 1000, 2, &b);

    let config = MergeConfig {
        crossfade_ms: 10,
        ..ws.config()
    };
    let report = run(ws.files(), &config, &mut SilentReporter).unwrap();
    assert_eq!(report.totals.fade_window, 20);
    assert_eq!(report.totals.blended_boundaries, 1);
    assert_eq!(report.totals.total_samples, (a.len() + b.len() - 20) as u64);

    let (spec, out) = read_pcm16(&ws.output_path());
    assert_eq!(spec.channels, 2);
    assert_eq!(out.len(), a.len() + b.len() - 20);

    let start = a.len() - 20;
    assert_eq!(&out[..start], &a[..start]);
    for k in 0..20 {
        let alpha = k as f64 / 20.0;
        let tail = a[start + k] as f64 / 32768.0;
        let head = b[k] as f64 / 32768.0;
        let expected = expected_fixed((1.0 - alpha) * tail + alpha * head);
        let actual = out[start + k];
        assert!(
            (actual as i32 - expected as i32).abs() <= 1,
            "k={k}: {actual} vs {expected}"
        );
    }

    // 每个声道逐帧单调地从前一文件过渡到后一文件
    let left: Vec<i16> = out[start..start + 20].iter().step_by(2).copied().collect();
    let right: Vec<i16> = out[start + 1..start + 20].iter().step_by(2).copied().collect();
    assert_eq!(left.len(), 10);
    assert!(left.windows(2).all(|w| w[1] < w[0]));
    assert!(right.windows(2).all(|w| w[1] > w[0]));

    assert_eq!(&out[a.len()..], &b[20..]);
}

#[test]
fn test_full_scale_crossfade_from_negative_full_scale() {
    log("满刻度交叉淡化", "Full-scale crossfade");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 1000, i16::MIN, 20);
    ws.add_constant("b.wav", 1000, 0, 20);

    let config = MergeConfig {
        crossfade_ms: 10,
        ..ws.config()
    };
    run(ws.files(), &config, &mut SilentReporter).unwrap();

    let (_, out) = read_pcm16(&ws.output_path());
    assert_eq!(out.len(), 30);
    // -1.0 输出为 -32767
    assert_eq!(out[0], -32767);
    for k in 0..10 {
        let expected = expected_fixed(-(1.0 - k as f64 / 10.0));
        assert_eq!(out[10 + k], expected, "k={k}");
    }
    assert!(out[20..].iter().all(|&s| s == 0));
}

#[test]
fn test_short_file_boundary_abuts_without_loss() {
    log("短文件边界直接拼接", "Short file boundary abuts without loss");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 1000, 100, 50);
    ws.add_constant("b.wav", 1000, 200, 5);
    ws.add_constant("c.wav", 1000, 300, 40);

    let config = MergeConfig {
        crossfade_ms: 10,
        ..ws.config()
    };
    let report = run(ws.files(), &config, &mut SilentReporter).unwrap();
    assert_eq!(report.totals.blended_boundaries, 0);
    assert_eq!(report.totals.total_samples, 95);

    let (_, out) = read_pcm16(&ws.output_path());
    let mut expected = vec![100i16; 50];
    expected.extend(vec![200i16; 5]);
    expected.extend(vec![300i16; 40]);
    assert_eq!(out, expected);
}

#[test]
fn test_scan_total_matches_written_with_mixed_lengths() {
    log("扫描总数与写入数一致", "Scan total matches written count");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("1.wav", 1000, 500, 30);
    ws.add_constant("2.wav", 1000, 600, 10);
    ws.add_constant("3.wav", 1000, 700, 3);
    ws.add_constant("4.wav", 1000, 800, 25);
    ws.add_constant("5.wav", 1000, 900, 10);

    let config = MergeConfig {
        crossfade_ms: 10,
        ..ws.config()
    };
    let mut reporter = RecordingReporter::new();
    let report = run(ws.files(), &config, &mut reporter).unwrap();
    let written = report.output.as_ref().unwrap();

    assert!(written.is_consistent());
    // 1|2 混合，2 被头部用完；2|3 直接拼接；3|4 直接拼接；4|5 混合
    assert_eq!(report.totals.blended_boundaries, 2);
    assert_eq!(report.totals.total_samples, 30 + 10 + 3 + 25 + 10 - 20);
    assert!(
        reporter
            .messages(LogLevel::Warn)
            .iter()
            .all(|m| !m.contains("planned"))
    );

    let (_, out) = read_pcm16(&ws.output_path());
    assert_eq!(out.len() as u64, report.totals.total_samples);
}

#[test]
fn test_normalization_bounds_peak() {
    log("峰值归一化上限", "Peak normalization bound");

    let mut ws = MergeWorkspace::new();
    ws.add("a.wav", 8000, 1, &[8000, -12000, 4000, 0]);
    ws.add("b.wav", 8000, 1, &[-3000, 11000, 100]);

    let target_db = -3.0;
    let config = MergeConfig {
        normalize_db: Some(target_db),
        ..ws.config()
    };
    let report = run(ws.files(), &config, &mut SilentReporter).unwrap();
    assert!((report.totals.peak - 12000.0 / 32768.0).abs() < 1e-6);
    assert!(report.scale > 1.0);

    let target = 10f64.powf(target_db / 20.0);
    let (_, out) = read_pcm16(&ws.output_path());
    let limit = target * 32767.0 + 1.0;
    assert!(out.iter().all(|&s| (s as f64).abs() <= limit));

    let loudest = out.iter().map(|&s| (s as i32).abs()).max().unwrap();
    assert!((loudest as f64 - target * 32767.0).abs() <= 1.0);
}

#[test]
fn test_normalization_above_full_scale_is_capped() {
    log("归一化目标超过 0 dBFS 时按满刻度", "Normalize target above 0 dBFS is capped");

    let mut ws = MergeWorkspace::new();
    ws.add("a.wav", 8000, 1, &[4096, -8192]);

    let config = MergeConfig {
        normalize_db: Some(6.0),
        ..ws.config()
    };
    run(ws.files(), &config, &mut SilentReporter).unwrap();
    let (_, out) = read_pcm16(&ws.output_path());
    assert_eq!(out, vec![16384, -32767]);
}

#[test]
fn test_silent_input_skips_normalization() {
    let mut ws = MergeWorkspace::new();
    ws.add_constant("silence.wav", 8000, 0, 100);

    let config = MergeConfig {
        normalize_db: Some(-1.0),
        ..ws.config()
    };
    let report = run(ws.files(), &config, &mut SilentReporter).unwrap();
    assert_eq!(report.totals.peak, 0.0);
    assert_eq!(report.scale, 1.0);
}

#[test]
fn test_dry_run_writes_nothing() {
    log("dry-run 不写出文件", "Dry run writes nothing");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 1000, 800);
    ws.add_constant("b.wav", 8000, 2000, 800);

    let config = MergeConfig {
        dry_run: true,
        ..ws.config()
    };
    let mut reporter = RecordingReporter::new();
    let report = run(ws.files(), &config, &mut reporter).unwrap();

    assert!(report.is_dry_run());
    assert_eq!(report.totals.total_samples, 1600);
    assert!(!ws.output_path().exists());
    assert!(!ws.root().join("Result").exists());
    assert!(reporter.progress_of(Phase::Merge).is_empty());
    assert!(
        reporter
            .messages(LogLevel::Ok)
            .iter()
            .any(|m| m.contains("dry-run"))
    );
    assert!(reporter.messages(LogLevel::Warn).is_empty());
}

#[test]
fn test_progress_and_log_events() {
    log("进度与日志事件", "Progress and log events");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 1, 10);
    ws.add_constant("b.wav", 8000, 2, 10);
    ws.add_constant("c.wav", 8000, 3, 10);

    let mut reporter = RecordingReporter::new();
    run(ws.files(), &ws.config(), &mut reporter).unwrap();

    let expected = vec![(1, 3), (2, 3), (3, 3)];
    assert_eq!(reporter.progress_of(Phase::Scan), expected);
    assert_eq!(reporter.progress_of(Phase::Merge), expected);

    // 扫描事件全部先于写入事件
    let first_merge = reporter
        .progress
        .iter()
        .position(|(p, _, _)| *p == Phase::Merge)
        .unwrap();
    assert!(
        reporter.progress[..first_merge]
            .iter()
            .all(|(p, _, _)| *p == Phase::Scan)
    );

    let ok = reporter.messages(LogLevel::Ok);
    assert_eq!(ok.len(), 1);
    assert!(ok[0].starts_with("Output saved: "));
}

#[test]
fn test_existing_output_is_not_overwritten() {
    log("已有输出不被覆盖", "Existing output is not overwritten");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 1000, 10);

    std::fs::create_dir_all(ws.output_path().parent().unwrap()).unwrap();
    std::fs::write(ws.output_path(), b"keep me").unwrap();

    let report = run(ws.files(), &ws.config(), &mut SilentReporter).unwrap();
    let expected = ws.root().join("Result").join("merged_1.wav");
    assert_eq!(report.output.unwrap().output_path, expected);
    assert_eq!(std::fs::read(ws.output_path()).unwrap(), b"keep me");

    let (_, out) = read_pcm16(&expected);
    assert_eq!(out.len(), 10);
}

#[test]
fn test_strict_mismatch_fails_before_writing() {
    log("strict 模式格式不一致报错", "Strict format mismatch is fatal");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 1000, 100);
    let odd = ws.add_constant("b.wav", 16000, 1000, 100);

    let err = run(ws.files(), &ws.config(), &mut SilentReporter).unwrap_err();
    match &err {
        AudioError::InFile { path, source } => {
            assert_eq!(path, &odd);
            assert!(matches!(**source, AudioError::FormatMismatch(_)));
        }
        other => panic!("应为 InFile(FormatMismatch)，实际: {other:?}"),
    }
    assert!(!ws.output_path().exists());
}

#[test]
fn test_lenient_mismatch_warns_and_merges() {
    log("非 strict 模式仅警告", "Lenient mode only warns");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 1000, 100);
    ws.add_constant("b.wav", 16000, 2000, 50);

    let config = MergeConfig {
        strict_format: false,
        ..ws.config()
    };
    let mut reporter = RecordingReporter::new();
    let report = run(ws.files(), &config, &mut reporter).unwrap();
    assert_eq!(report.totals.total_samples, 150);
    // 扫描遍和写入遍各警告一次
    let warnings = reporter.messages(LogLevel::Warn);
    assert_eq!(warnings.iter().filter(|m| m.contains("b.wav")).count(), 2);

    let (spec, out) = read_pcm16(&ws.output_path());
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(out.len(), 150);
}

#[test]
fn test_non_pcm16_input_is_rejected() {
    log("拒绝非 PCM16 输入", "Non-PCM16 input is rejected");

    let mut ws = MergeWorkspace::new();
    let path = ws.source_dir().join("float.wav");
    write_float32(&path, 8000, &[0.0, 0.5, -0.5]);
    ws.add_raw("float.wav", &std::fs::read(&path).unwrap());

    let err = run(ws.files(), &ws.config(), &mut SilentReporter).unwrap_err();
    assert!(matches!(err.root(), AudioError::UnsupportedFormat { .. }));
    assert!(!ws.output_path().exists());
}

#[test]
fn test_data_before_fmt_is_rejected() {
    let mut ws = MergeWorkspace::new();
    ws.add_constant("good.wav", 8000, 10, 10);
    let bytes = riff_bytes(&[
        (b"data", s16le(&[1, 2, 3])),
        (b"fmt ", fmt_payload(1, 1, 8000, 16)),
    ]);
    ws.add_raw("bad.wav", &bytes);

    let config = MergeConfig {
        strict_format: false,
        ..ws.config()
    };
    let err = run(ws.files(), &config, &mut SilentReporter).unwrap_err();
    assert!(matches!(err.root(), AudioError::FormatOrder));
}

#[test]
fn test_empty_file_list_reports_no_input() {
    let ws = MergeWorkspace::new();
    let err = run(&[], &ws.config(), &mut SilentReporter).unwrap_err();
    assert!(matches!(err, AudioError::NoInputFiles(dir) if dir == ws.source_dir()));
}

#[test]
fn test_unknown_chunks_are_skipped() {
    let mut ws = MergeWorkspace::new();
    let bytes = riff_bytes(&[
        (b"LIST", b"odd".to_vec()),
        (b"fmt ", fmt_payload(1, 1, 8000, 16)),
        (b"junk", vec![0u8; 7]),
        (b"data", s16le(&[5, -5, 7])),
    ]);
    ws.add_raw("chunky.wav", &bytes);

    run(ws.files(), &ws.config(), &mut SilentReporter).unwrap();
    let (_, out) = read_pcm16(&ws.output_path());
    assert_eq!(out, vec![5, -5, 7]);
}

/// 扫描之后把指定文件改写为另一长度，模拟两遍之间输入被修改
struct RewriteAfterScan {
    inner: RecordingReporter,
    target: PathBuf,
    replacement: Vec<i16>,
    rewritten: bool,
}

impl MergeReporter for RewriteAfterScan {
    fn on_progress(&mut self, phase: Phase, current: usize, total: usize) {
        if phase == Phase::Scan && current == total && !self.rewritten {
            write_pcm16(&self.target, 8000, 1, &self.replacement);
            self.rewritten = true;
        }
        self.inner.on_progress(phase, current, total);
    }

    fn on_log(&mut self, level: LogLevel, message: &str) {
        self.inner.on_log(level, message);
    }
}

#[test]
fn test_input_changed_between_passes_only_warns() {
    log("两遍之间输入变化仅警告", "Input changed between passes only warns");

    let mut ws = MergeWorkspace::new();
    ws.add_constant("a.wav", 8000, 100, 10);
    let b = ws.add_constant("b.wav", 8000, 200, 10);

    let mut reporter = RewriteAfterScan {
        inner: RecordingReporter::new(),
        target: b,
        replacement: vec![300; 5],
        rewritten: false,
    };
    let report = run(ws.files(), &ws.config(), &mut reporter).unwrap();
    assert!(reporter.rewritten);
    assert_eq!(report.totals.total_samples, 20);

    let written = report.output.as_ref().unwrap();
    assert!(!written.is_consistent());
    assert_eq!(written.samples_written, 15);
    assert_eq!(written.planned_samples, 20);

    let warnings = reporter.inner.messages(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("planned=20"));
    assert!(warnings[0].contains("written samples=15"));
    assert_eq!(reporter.inner.messages(LogLevel::Error).len(), 0);
}
