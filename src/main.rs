//! Runs a command script against a headless viewer.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use glam::{Affine3A, Quat, Vec3};
use viso_scenes::options::Options;
use viso_scenes::session::Session;
use viso_scenes::state::ModelId;
use viso_scenes::util::frame_timing::FrameTiming;
use viso_scenes::viewer::{HeadlessViewer, ModelShape};

#[derive(Parser, Debug)]
#[command(name = "viso-scenes")]
#[command(about = "Run a scene and timeline command script against a headless viewer")]
struct Args {
    /// Command script to run; reads stdin when omitted
    script: Option<PathBuf>,

    /// Options TOML file
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Play frames as fast as possible instead of at the timeline frame rate
    #[arg(long)]
    unpaced: bool,
}

fn read_script(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut script = String::new();
            let _ = std::io::stdin().read_to_string(&mut script)?;
            Ok(script)
        }
    }
}

/// Two small demo models so scenes have something to differ in.
fn demo_viewer() -> HeadlessViewer {
    let mut viewer = HeadlessViewer::new().with_thumbnails(64, 48);
    viewer.add_model(
        ModelId(1),
        ModelShape::new(120, 118, 15, 2)
            .with_pseudobonds("hydrogen bonds", 9)
            .with_center(Vec3::new(4.0, -2.0, 1.5)),
    );
    viewer.add_model(
        ModelId(2),
        ModelShape::new(40, 39, 0, 1).with_center(Vec3::new(-6.0, 3.0, 0.0)),
    );
    viewer
}

fn model_id(word: &str) -> Option<ModelId> {
    word.trim_start_matches('#').parse().ok().map(ModelId)
}

/// Viewer manipulations the command set leaves to the host:
/// `turn <model> <degrees>`, `color <model> <r> <g> <b>`,
/// `hide <model>`, `show <model>`, `close <model>`.
fn host_directive(session: &mut Session<HeadlessViewer>, line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["turn", id, degrees] => {
            if let (Some(id), Ok(degrees)) = (model_id(id), degrees.parse::<f32>()) {
                let viewer = session.viewer_mut();
                let current = viewer
                    .state()
                    .named_view
                    .positions
                    .get(&id)
                    .copied()
                    .unwrap_or(Affine3A::IDENTITY);
                let turn = Affine3A::from_quat(Quat::from_rotation_y(degrees.to_radians()));
                viewer.set_model_position(id, turn * current);
            }
            true
        }
        ["color", id, r, g, b] => {
            if let (Some(id), Ok(r), Ok(g), Ok(b)) =
                (model_id(id), r.parse(), g.parse(), b.parse())
            {
                session.viewer_mut().set_atom_colors(id, [r, g, b, 255]);
            }
            true
        }
        ["hide" | "show", id] => {
            if let Some(id) = model_id(id) {
                session.viewer_mut().set_atoms_shown(id, words[0] == "show");
            }
            true
        }
        ["close", id] => {
            if let Some(id) = model_id(id) {
                if session.viewer_mut().remove_model(id) {
                    session.models_closed(&[id]);
                }
            }
            true
        }
        _ => false,
    }
}

/// Drive playback to completion, one frame per frame interval.
fn run_playback(session: &mut Session<HeadlessViewer>, timing: &mut FrameTiming) {
    let mut frames = 0usize;
    loop {
        if !timing.should_render() {
            std::thread::sleep(timing.time_until_next());
            continue;
        }
        let more = session.tick();
        timing.end_frame();
        frames += 1;
        if !more {
            break;
        }
    }
    log::info!(
        "played {frames} frames ({:.1} fps, {} redraws total)",
        timing.fps(),
        session.viewer().frames_rendered()
    );
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let options = match &args.options {
        Some(path) => match Options::load(path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    let script = match read_script(args.script.as_ref()) {
        Ok(script) => script,
        Err(e) => {
            log::error!("cannot read script: {e}");
            std::process::exit(1);
        }
    };

    let target_fps = if args.unpaced { 0 } else { options.timeline.fps };
    let mut timing = FrameTiming::new(target_fps);
    let mut session = Session::new(demo_viewer(), options);

    for line in script.lines() {
        if !host_directive(&mut session, line.trim()) {
            let _ = session.run_line(line);
        }
        if session.animation().is_playing() {
            run_playback(&mut session, &mut timing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse_in_any_order() {
        let args =
            Args::try_parse_from(["viso-scenes", "--unpaced", "demo.cxc", "--options", "o.toml"])
                .unwrap();
        assert_eq!(args.script, Some(PathBuf::from("demo.cxc")));
        assert_eq!(args.options, Some(PathBuf::from("o.toml")));
        assert!(args.unpaced);

        let stdin = Args::try_parse_from(["viso-scenes"]).unwrap();
        assert!(stdin.script.is_none() && stdin.options.is_none() && !stdin.unpaced);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(Args::try_parse_from(["viso-scenes", "--options"]).is_err());
        assert!(Args::try_parse_from(["viso-scenes", "a.cxc", "b.cxc"]).is_err());
        assert!(Args::try_parse_from(["viso-scenes", "--fast"]).is_err());
    }
}
