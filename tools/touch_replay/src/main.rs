use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use touch_classifier::{
    EngineOutput, GestureConfig, GestureEngine, GestureEvent, Point, TouchBatch, TouchContact,
    UniformGrid, Viewport,
};

/// Time added after the last trace line so deferred offs and hold ticks flush.
const TAIL_FLUSH_MS: u64 = 2_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

#[derive(Clone, Copy, Debug)]
enum ReplayStep {
    Touch {
        ms: u64,
        phase: TouchPhase,
        contact: TouchContact,
        all_touches: Option<u8>,
    },
    Tick {
        ms: u64,
    },
    Shake {
        ms: u64,
    },
}

impl ReplayStep {
    fn ms(&self) -> u64 {
        match self {
            Self::Touch { ms, .. } | Self::Tick { ms } | Self::Shake { ms } => *ms,
        }
    }
}

struct Options {
    trace_path: PathBuf,
    expect_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    viewport: Viewport,
    grid: (u16, u16),
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let config = match &options.config_path {
        Some(path) => GestureConfig::load(path).map_err(|e| e.to_string())?,
        None => GestureConfig::default(),
    };
    let resolver = UniformGrid::new(options.grid.0, options.grid.1)
        .with_center_dead_radius(config.assessment.center_radius);
    let mut engine = GestureEngine::with_resolver(config, resolver);

    let steps = parse_trace(&options.trace_path)?;
    log::info!(
        "replay: {} steps from {}",
        steps.len(),
        options.trace_path.display()
    );

    let emitted = replay(&mut engine, &steps, options.viewport);

    println!("event,ms,name,x,y,detail");
    for (ms, event) in &emitted {
        let (point, detail) = describe(event);
        let (x, y) = point.map_or((String::new(), String::new()), |p| {
            (format!("{:.1}", p.x), format!("{:.1}", p.y))
        });
        println!("event,{ms},{},{x},{y},{detail}", event.name());
    }

    if let Some(expect_path) = options.expect_path {
        let expected = parse_expected_names(&expect_path)?;
        let actual: Vec<&str> = emitted.iter().map(|(_, event)| event.name()).collect();
        if actual != expected {
            eprintln!("expected events: {}", expected.join(","));
            eprintln!("actual events:   {}", actual.join(","));
            return Err("event sequence mismatch".into());
        }
    }

    Ok(())
}

/// Feeds every step to the engine, ticking at each pending deadline first so
/// timer-driven events carry the time they fired at.
fn replay(
    engine: &mut GestureEngine,
    steps: &[ReplayStep],
    viewport: Viewport,
) -> Vec<(u64, GestureEvent)> {
    let mut emitted = Vec::new();

    for step in steps {
        flush_until(engine, step.ms(), &mut emitted);
        let output = match *step {
            ReplayStep::Touch {
                ms,
                phase,
                contact,
                all_touches,
            } => {
                let mut batch = TouchBatch::new(&[contact], Some(viewport));
                if let Some(all_touches) = all_touches {
                    batch = batch.with_all_touches(all_touches);
                }
                match phase {
                    TouchPhase::Began => engine.touch_began(ms, &batch),
                    TouchPhase::Moved => engine.touch_moved(ms, &batch),
                    TouchPhase::Ended => engine.touch_ended(ms, &batch),
                    TouchPhase::Cancelled => engine.touch_cancelled(ms, &batch),
                }
            }
            ReplayStep::Tick { ms } => engine.tick(ms),
            ReplayStep::Shake { ms } => engine.shake(ms),
        };
        record(&mut emitted, output);
    }

    if let Some(last_ms) = steps.last().map(ReplayStep::ms) {
        let tail_ms = last_ms.saturating_add(TAIL_FLUSH_MS);
        flush_until(engine, tail_ms, &mut emitted);
        record(&mut emitted, engine.tick(tail_ms));
    }

    emitted
}

/// Ticks at every deadline strictly before `until_ms`.
fn flush_until(engine: &mut GestureEngine, until_ms: u64, emitted: &mut Vec<(u64, GestureEvent)>) {
    let mut last_due = None;
    while let Some(due) = engine.next_due_ms().filter(|due| *due < until_ms) {
        if last_due.is_some_and(|last| due <= last) {
            log::warn!("replay: deadline {due} did not advance, stop flushing");
            break;
        }
        last_due = Some(due);
        record(emitted, engine.tick(due));
    }
}

fn record(emitted: &mut Vec<(u64, GestureEvent)>, output: EngineOutput) {
    let ms = output.trace.now_ms;
    emitted.extend(output.events.into_iter().map(|event| (ms, event)));
}

fn usage() -> String {
    "usage: touch_replay <trace.csv> [--config gestures.toml] [--viewport WxH] [--grid CxR] [--expect expected.txt]"
        .to_string()
}

fn parse_args() -> Result<Option<Options>, String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path = None;
    let mut config_path = None;
    let mut viewport = Viewport::new(600.0, 600.0);
    let mut grid = (4, 4);

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            flag @ ("--expect" | "--config" | "--viewport" | "--grid") => {
                idx += 1;
                let Some(value) = args.get(idx) else {
                    return Err(format!("missing value after {flag}"));
                };
                match flag {
                    "--expect" => expect_path = Some(PathBuf::from(value)),
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--viewport" => {
                        let (w, h) = parse_pair::<f32>(value, flag)?;
                        viewport = Viewport::new(w, h);
                    }
                    _ => grid = parse_pair::<u16>(value, flag)?,
                }
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(None);
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    Ok(Some(Options {
        trace_path: trace_path.ok_or_else(usage)?,
        expect_path,
        config_path,
        viewport,
        grid,
    }))
}

fn parse_pair<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<(T, T), String> {
    let (a, b) = raw
        .split_once('x')
        .ok_or_else(|| format!("{flag} expects AxB, got '{raw}'"))?;
    match (a.trim().parse::<T>(), b.trim().parse::<T>()) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        _ => Err(format!("{flag} expects AxB, got '{raw}'")),
    }
}

fn parse_trace(path: &Path) -> Result<Vec<ReplayStep>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let field = |idx: usize, name: &str| {
            parts.get(idx).copied().ok_or_else(|| {
                format!("{}:{} missing column {}", path.display(), line_no, name)
            })
        };
        let ms = parse_num::<u64>(field(1, "ms")?, path, line_no, "ms")?;

        let step = match parts[0] {
            "tick" => ReplayStep::Tick { ms },
            "shake" => ReplayStep::Shake { ms },
            "touch" => {
                let phase = match field(2, "phase")? {
                    "began" => TouchPhase::Began,
                    "moved" => TouchPhase::Moved,
                    "ended" => TouchPhase::Ended,
                    "cancelled" => TouchPhase::Cancelled,
                    other => {
                        return Err(format!(
                            "{}:{} invalid phase '{}'",
                            path.display(),
                            line_no,
                            other
                        ))
                    }
                };
                let id = parse_num::<u64>(field(3, "id")?, path, line_no, "id")?;
                let x = parse_num::<f32>(field(4, "x")?, path, line_no, "x")?;
                let y = parse_num::<f32>(field(5, "y")?, path, line_no, "y")?;
                let all_touches = match parts.get(6) {
                    Some(raw) => Some(parse_num::<u8>(raw, path, line_no, "all_touches")?),
                    None => None,
                };
                ReplayStep::Touch {
                    ms,
                    phase,
                    contact: TouchContact::new(id, x, y),
                    all_touches,
                }
            }
            _ => continue,
        };
        out.push(step);
    }

    Ok(out)
}

fn parse_expected_names(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut names = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no + 1))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        names.push(token.to_ascii_lowercase());
    }

    Ok(names)
}

fn describe(event: &GestureEvent) -> (Option<Point>, String) {
    match event {
        GestureEvent::TouchBegan { point, touch } | GestureEvent::TouchMoved { point, touch } => {
            (Some(*point), format!("id={}", touch.id.0))
        }
        GestureEvent::TouchOn(touch)
        | GestureEvent::TouchOffZone(touch)
        | GestureEvent::TouchOffNonZone(touch)
        | GestureEvent::TouchDeferredOff(touch)
        | GestureEvent::TouchLifeComplete(touch)
        | GestureEvent::HoldOnZone(touch)
        | GestureEvent::HoldOnNonZone(touch) => (
            Some(touch.began_point),
            format!("id={} length_ms={}", touch.id.0, touch.touch_length_ms),
        ),
        GestureEvent::DragBegan { point }
        | GestureEvent::DragMoved { point }
        | GestureEvent::DragEnded { point } => (Some(*point), String::new()),
        GestureEvent::SwipeBegan { began } => (Some(*began), String::new()),
        GestureEvent::SwipeEnded { began, ended } => (
            Some(*ended),
            format!("from={:.1}:{:.1}", began.x, began.y),
        ),
        GestureEvent::RotationMoved { angle_deg } => (None, format!("angle={angle_deg:.1}")),
        GestureEvent::RotationEnded { direction } => (None, format!("{direction:?}")),
        GestureEvent::AssessmentComplete
        | GestureEvent::HoldOnCenter
        | GestureEvent::CenterPress
        | GestureEvent::RotationBegan
        | GestureEvent::ReverseRotationCompleted
        | GestureEvent::Shake => (None, String::new()),
    }
}

fn parse_num<T>(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(ms: u64, phase: TouchPhase, x: f32, y: f32) -> ReplayStep {
        ReplayStep::Touch {
            ms,
            phase,
            contact: TouchContact::new(1, x, y),
            all_touches: None,
        }
    }

    #[test]
    fn timer_events_carry_their_due_time() {
        let viewport = Viewport::new(600.0, 600.0);
        let mut engine = GestureEngine::with_resolver(
            GestureConfig::default(),
            UniformGrid::new(4, 4).with_center_dead_radius(50.0),
        );
        let steps = [
            touch(0, TouchPhase::Began, 80.0, 80.0),
            touch(90, TouchPhase::Ended, 80.0, 80.0),
        ];

        let emitted = replay(&mut engine, &steps, viewport);
        let stamped: Vec<(u64, &str)> = emitted
            .iter()
            .map(|(ms, event)| (*ms, event.name()))
            .collect();
        assert_eq!(
            stamped,
            vec![
                (0, "touch_began"),
                (50, "assessment_complete"),
                (50, "touch_on"),
                (90, "drag_ended"),
                (90, "touch_off_zone"),
                (90, "touch_deferred_off"),
                (90, "touch_life_complete"),
            ]
        );
    }
}
