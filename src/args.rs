use piece_vision::piece_detection::{
    CaptureStrategy, ClassifierPolicy, DetectionConfig, SearchRegion, create_fast_config,
    create_precise_config, create_region_scan_config,
};
use std::env;
use std::path::PathBuf;

/// Margin used by `--policy=robust` when no preset sets one
const DEFAULT_ROBUST_MARGIN: f64 = 12.0;

#[derive(Debug, Clone)]
pub enum Source {
    /// Read frames from a saved screenshot
    Screenshot(PathBuf),
    /// Capture the primary display
    Display,
}

#[derive(Debug)]
pub struct Args {
    pub source: Source,
    pub config: DetectionConfig,
    pub watch_interval_ms: Option<u64>,
    pub json: bool,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().collect();
        Self::parse_from(args.iter().skip(1).map(String::as_str))
    }

    fn parse_from<'a>(args: impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut source = Source::Display;
        let mut config = create_fast_config();
        let mut template: Option<PathBuf> = None;
        let mut region: Option<SearchRegion> = None;
        let mut strategy: Option<CaptureStrategy> = None;
        let mut policy: Option<ClassifierPolicy> = None;
        let mut watch_interval_ms: Option<u64> = None;
        let mut json = false;
        let mut debug_mode = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Piece Vision v{} ({})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--json" {
                json = true;
            } else if arg == "--precise" {
                config = create_precise_config();
            } else if arg == "--region-scan" {
                config = create_region_scan_config();
            } else if let Some(path) = arg.strip_prefix("--screenshot=") {
                source = Source::Screenshot(PathBuf::from(path));
            } else if let Some(path) = arg.strip_prefix("--template=") {
                template = Some(PathBuf::from(path));
            } else if let Some(val) = arg.strip_prefix("--region=") {
                match SearchRegion::parse(val) {
                    Some(r) => region = Some(r),
                    None => {
                        eprintln!("❌ Invalid region '{}', expected x,y,width,height", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--strategy=") {
                strategy = Some(match val {
                    "bbox" => CaptureStrategy::BoundingBox,
                    "per-point" => CaptureStrategy::PerPoint,
                    "region-scan" => CaptureStrategy::RegionScan,
                    other => {
                        eprintln!(
                            "❌ Unknown strategy '{}', expected bbox, per-point or region-scan",
                            other
                        );
                        return None;
                    }
                });
            } else if let Some(val) = arg.strip_prefix("--policy=") {
                policy = Some(match val {
                    "fast" => ClassifierPolicy::Fast,
                    "robust" => ClassifierPolicy::Robust {
                        min_margin: DEFAULT_ROBUST_MARGIN,
                    },
                    other => {
                        eprintln!("❌ Unknown policy '{}', expected 'fast' or 'robust'", other);
                        return None;
                    }
                });
            } else if let Some(val) = arg.strip_prefix("--watch=") {
                match val.parse::<u64>() {
                    Ok(ms) => watch_interval_ms = Some(ms),
                    Err(_) => {
                        eprintln!("❌ Invalid watch interval: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        // Explicit flags win over whichever preset was chosen, in any order
        if let Some(path) = template {
            config.template_path = path;
        }
        if let Some(r) = region {
            config.search_region = r;
        }
        if let Some(s) = strategy {
            config.strategy = s;
        }
        if let Some(p) = policy {
            config.policy = p;
        }

        Some(Args {
            source,
            config,
            watch_interval_ms,
            json,
            debug_mode,
        })
    }
}

fn print_help() {
    println!("🧩 Piece Vision - falling-block preview reader");
    println!();
    println!("USAGE:");
    println!("    piece-vision [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)              Detect once on the primary display");
    println!("    --screenshot=FILE       Detect on a saved screenshot instead of the display");
    println!("    --template=FILE         Anchor label image (default: assets/next_template.png)");
    println!("    --region=x,y,w,h        Screen area searched for the anchor");
    println!("    --precise               Full-resolution matching, ambiguous colors reported as unknown");
    println!("    --region-scan           Precise preset plus window scanning around each slot");
    println!("    --policy=<fast|robust>  Color classification policy");
    println!("    --strategy=<bbox|per-point|region-scan>");
    println!("                            How sample points become capture calls");
    println!("    --watch=MS              Repeat detection every MS milliseconds");
    println!("    --json                  Print results as JSON");
    println!("    --debug                 Enable debug logging");
    println!("    --help, -h              Show this help message");
    println!("    --version, -v           Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    piece-vision --screenshot=board.png --precise");
    println!("    piece-vision --region=600,100,800,900 --watch=250 --json");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<Args> {
        Args::parse_from(args.iter().copied())
    }

    #[test]
    fn test_defaults_use_fast_preset_on_display() {
        let args = parse(&[]).unwrap();
        assert!(matches!(args.source, Source::Display));
        assert_eq!(args.config, create_fast_config());
        assert_eq!(args.watch_interval_ms, None);
        assert!(!args.json);
    }

    #[test]
    fn test_flags_override_preset_in_any_order() {
        let args = parse(&[
            "--policy=fast",
            "--region=10,20,300,400",
            "--precise",
            "--screenshot=shot.png",
            "--watch=250",
            "--json",
        ])
        .unwrap();

        assert!(matches!(args.source, Source::Screenshot(ref p) if p == &PathBuf::from("shot.png")));
        assert_eq!(args.config.search_region, SearchRegion::new(10, 20, 300, 400));
        assert_eq!(args.config.policy, ClassifierPolicy::Fast);
        assert_eq!(args.config.resolution_scale, 1.0);
        assert_eq!(args.watch_interval_ms, Some(250));
        assert!(args.json);
    }

    #[test]
    fn test_strategy_flag() {
        let args = parse(&["--strategy=per-point"]).unwrap();
        assert_eq!(args.config.strategy, CaptureStrategy::PerPoint);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(parse(&["--region=1,2,3"]).is_none());
        assert!(parse(&["--watch=soon"]).is_none());
        assert!(parse(&["--policy=lucky"]).is_none());
        assert!(parse(&["--bogus"]).is_none());
    }
}
