use std::{
    env,
    ffi::OsString,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{bail, Context};
use posematch::{
    config::Config,
    engine::{ComparisonEngine, FormEngine},
    landmark::Snapshot,
    stream::LandmarkReader,
    timer::FpsCounter,
};

const USAGE: &str = "\
usage:
  posematch compare <reference.jsonl> <live.jsonl> [--config FILE] [--loop-reference] [--json]
  posematch hold <stream.jsonl> [--config FILE] [--fps N]";

const DEFAULT_FPS: f64 = 30.0;

fn main() -> anyhow::Result<()> {
    posematch::init_logger!();

    let mut args = env::args_os().skip(1);
    let command = Command::from_arg(args.next().unwrap_or_default())?;
    let args = Args::parse(command, args)?;
    match command {
        Command::Compare => compare(args),
        Command::Hold => hold(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compare,
    Hold,
}

impl Command {
    fn from_arg(arg: OsString) -> anyhow::Result<Self> {
        match arg.to_str() {
            Some("compare") => Ok(Command::Compare),
            Some("hold") => Ok(Command::Hold),
            _ => bail!("{USAGE}"),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Command::Compare => "compare",
            Command::Hold => "hold",
        }
    }

    /// Returns whether `option` is valid for this subcommand.
    fn accepts(self, option: &str) -> bool {
        match (self, option) {
            (_, "--config") => true,
            (Command::Compare, "--loop-reference" | "--json") => true,
            (Command::Hold, "--fps") => true,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    paths: Vec<PathBuf>,
    config: Option<PathBuf>,
    loop_reference: bool,
    json: bool,
    fps: Option<f64>,
}

impl Args {
    fn parse(command: Command, mut args: impl Iterator<Item = OsString>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            let Some(option) = arg.to_str().filter(|arg| arg.starts_with("--")) else {
                parsed.paths.push(arg.into());
                continue;
            };
            if !command.accepts(option) {
                bail!("`{}` does not accept `{option}`\n{USAGE}", command.name());
            }
            match option {
                "--config" => {
                    let path = args.next().context("`--config` requires a file name")?;
                    parsed.config = Some(path.into());
                }
                "--fps" => {
                    let fps = args.next().context("`--fps` requires a number")?;
                    let fps = fps
                        .to_str()
                        .and_then(|s| s.parse::<f64>().ok())
                        .filter(|fps| *fps > 0.0 && fps.is_finite())
                        .with_context(|| format!("invalid frame rate {:?}", fps))?;
                    parsed.fps = Some(fps);
                }
                "--loop-reference" => parsed.loop_reference = true,
                "--json" => parsed.json = true,
                _ => unreachable!("`{option}` accepted but not handled"),
            }
        }
        Ok(parsed)
    }

    fn config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }
}

fn compare(args: Args) -> anyhow::Result<()> {
    let [reference_path, live_path] = &args.paths[..] else {
        bail!("`compare` expects a reference and a live recording\n{USAGE}");
    };
    let config = args.config()?;
    let mut engine = ComparisonEngine::new(&config)?;

    let reference = LandmarkReader::open(reference_path)?
        .collect::<anyhow::Result<Vec<_>>>()
        .with_context(|| format!("failed to load '{}'", reference_path.display()))?;
    log::info!(
        "loaded {} reference frames from '{}'",
        reference.len(),
        reference_path.display()
    );

    let reference: Box<dyn Iterator<Item = &Snapshot> + '_> = if args.loop_reference {
        Box::new(reference.iter().cycle())
    } else {
        Box::new(reference.iter())
    };

    let mut fps = FpsCounter::new("compare");
    let live = LandmarkReader::open(live_path)?;
    for (reference, live) in reference.zip(live) {
        let live = live.with_context(|| format!("failed to read '{}'", live_path.display()))?;
        engine.process(reference, &live);
        fps.tick_with(engine.timers());
    }

    let summary = engine.finalize();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn hold(args: Args) -> anyhow::Result<()> {
    let [path] = &args.paths[..] else {
        bail!("`hold` expects exactly one recording\n{USAGE}");
    };
    let config = args.config()?;
    let mut engine = FormEngine::new(&config)?;
    let frame_time = 1.0 / args.fps.unwrap_or(DEFAULT_FPS);

    // Replays use simulated capture times, so the countdown follows the recording and not the
    // speed at which it is processed.
    let start = Instant::now();
    let mut fps = FpsCounter::new("hold");
    for (i, snapshot) in LandmarkReader::open(path)?.enumerate() {
        let snapshot = snapshot.with_context(|| format!("failed to read '{}'", path.display()))?;
        let now = start + Duration::from_secs_f64(i as f64 * frame_time);
        let feedback = engine.process(&snapshot, now);
        fps.tick_with(engine.timers());

        let knees = match feedback.knee_angles {
            Some(knees) => format!("L {:5.1}° R {:5.1}°", knees.left, knees.right),
            None => String::from("no pose"),
        };
        println!(
            "{i:>6}  {:<6}  {:<17}  {knees:<17}  {:>3}s",
            feedback.label.as_str(),
            feedback.label.message(),
            feedback.state.remaining_seconds,
        );

        if feedback.is_complete() {
            println!("hold completed after {} frames", i + 1);
            return Ok(());
        }
    }

    println!("hold not completed");
    Ok(())
}
