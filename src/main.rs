mod args;

use args::{Args, Source};
use piece_vision::capture::{FrameSource, StaticFrame};
use piece_vision::piece_detection::{ColorTable, DetectionPipeline, DetectionResult, Template};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    let template = match Template::load(&args.config.template_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Loaded template '{}' ({}x{})",
        template.name,
        template.width(),
        template.height()
    );

    match &args.source {
        Source::Screenshot(path) => match StaticFrame::from_file(path) {
            Ok(frame) => {
                println!("🖼️  Screenshot: {}", path.display());
                run(&frame, &args, &template).await
            }
            Err(e) => {
                eprintln!("❌ Could not read screenshot {}: {e}", path.display());
                ExitCode::FAILURE
            }
        },
        Source::Display => run_on_display(&args, &template).await,
    }
}

#[cfg(feature = "screen")]
async fn run_on_display(args: &Args, template: &Template) -> ExitCode {
    match piece_vision::capture::ScreenCapture::primary() {
        Ok(screen) => run(&screen, args, template).await,
        Err(e) => {
            eprintln!("❌ Display capture unavailable: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "screen"))]
async fn run_on_display(_args: &Args, _template: &Template) -> ExitCode {
    eprintln!("❌ Built without display capture; rebuild with --features screen or pass --screenshot=FILE");
    ExitCode::FAILURE
}

/// Detect once, or keep polling when a watch interval is set
async fn run<S: FrameSource>(source: &S, args: &Args, template: &Template) -> ExitCode {
    let pipeline = DetectionPipeline::new(source, ColorTable::standard(), args.config.clone());
    log::debug!(
        "Sampling the current piece and {} queue slots ({:?}, {:?})",
        pipeline.config().queue_length(),
        pipeline.config().strategy,
        pipeline.config().policy
    );

    let Some(interval_ms) = args.watch_interval_ms else {
        let start = Instant::now();
        return match pipeline.run(template) {
            Ok(result) => {
                report(&result, start.elapsed(), args.json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Detection failed: {e}");
                ExitCode::FAILURE
            }
        };
    };

    log::info!("Watching every {interval_ms}ms, Ctrl-C to stop");
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopping watch");
                return ExitCode::SUCCESS;
            }
            _ = ticker.tick() => {
                let start = Instant::now();
                match pipeline.run(template) {
                    Ok(result) => report(&result, start.elapsed(), args.json),
                    // Capture hiccups are transient while watching
                    Err(e) => log::warn!("Detection failed: {e}"),
                }
            }
        }
    }
}

fn report(result: &DetectionResult, elapsed: Duration, json: bool) {
    if json {
        match serde_json::to_string(result) {
            Ok(line) => println!("{line}"),
            Err(e) => log::error!("Failed to serialize result: {e}"),
        }
        return;
    }

    if result.queue.is_empty() {
        println!("⏳ Preview not visible ({}ms)", elapsed.as_millis());
    } else if result.is_complete() {
        println!("✅ {} ({}ms)", result, elapsed.as_millis());
    } else {
        println!("⚠️  {} ({}ms)", result, elapsed.as_millis());
    }
}
