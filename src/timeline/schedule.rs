//! Per-frame interpolation schedule derived from a timeline's keyframes.

use crate::error::{SceneError, SceneResult};

use super::Keyframe;

/// One frame of the schedule: blend scene `from` toward scene `to` by
/// `fraction`.
#[derive(Debug, Clone, PartialEq)]
pub struct LerpStep {
    /// Scene shown at fraction 0.
    pub from: String,
    /// Scene shown at fraction 1.
    pub to: String,
    /// Blend amount in `[0, 1]`.
    pub fraction: f32,
}

/// Flat list of [`LerpStep`]s, one per frame index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    steps: Vec<LerpStep>,
}

impl Schedule {
    /// Build the schedule for keyframes sorted by time over a timeline of
    /// `length` seconds.
    ///
    /// Every time maps to frame `round(fps * t)`. Before the first keyframe
    /// and after the last one the nearest keyframe is held. The segment
    /// between neighbours runs from the first keyframe's frame up to the
    /// second's, with fractions evenly spaced from 0 to 1 inclusive. A final
    /// frame showing the last keyframe closes the schedule, so it always
    /// holds `round(fps * length) + 1` steps.
    pub fn build(keyframes: &[Keyframe], length: f64, fps: u32) -> SceneResult<Self> {
        let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
            return Err(SceneError::NoKeyframes);
        };
        let fps = f64::from(fps);
        let frame = |time: f64| (time * fps).round().max(0.0) as usize;
        let mut steps = Vec::with_capacity(frame(length) + 1);

        push_segment(&mut steps, &first.name, &first.name, frame(first.time));
        for pair in keyframes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let frames = frame(b.time).saturating_sub(frame(a.time));
            push_segment(&mut steps, &a.name, &b.name, frames);
        }
        let trailing = frame(length).saturating_sub(frame(last.time));
        push_segment(&mut steps, &last.name, &last.name, trailing);
        steps.push(LerpStep {
            from: last.name.clone(),
            to: last.name.clone(),
            fraction: 1.0,
        });

        Ok(Self { steps })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the schedule has no frames.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest valid frame index.
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// The step for a frame index.
    pub fn step(&self, index: usize) -> Option<&LerpStep> {
        self.steps.get(index)
    }

    /// Every step in frame order.
    pub fn steps(&self) -> &[LerpStep] {
        &self.steps
    }
}

fn push_segment(steps: &mut Vec<LerpStep>, from: &str, to: &str, n: usize) {
    for i in 0..n {
        // A one-frame segment has no span to divide.
        let fraction = if n > 1 {
            i as f32 / (n - 1) as f32
        } else {
            0.0
        };
        steps.push(LerpStep {
            from: from.to_owned(),
            to: to.to_owned(),
            fraction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(name: &str, time: f64) -> Keyframe {
        Keyframe::new(name, time)
    }

    #[test]
    fn no_keyframes_is_an_error() {
        assert!(matches!(
            Schedule::build(&[], 5.0, 60),
            Err(SceneError::NoKeyframes)
        ));
    }

    #[test]
    fn covers_every_frame_of_the_timeline() {
        let schedule =
            Schedule::build(&[kf("a", 1.0), kf("b", 3.0)], 5.0, 10).unwrap();
        assert_eq!(schedule.len(), 51);
        assert_eq!(schedule.last_index(), 50);
    }

    #[test]
    fn holds_before_first_and_after_last_keyframe() {
        let schedule =
            Schedule::build(&[kf("a", 1.0), kf("b", 3.0)], 5.0, 10).unwrap();
        for step in &schedule.steps()[..10] {
            assert_eq!((step.from.as_str(), step.to.as_str()), ("a", "a"));
        }
        for step in &schedule.steps()[30..] {
            assert_eq!((step.from.as_str(), step.to.as_str()), ("b", "b"));
        }
        assert_eq!(schedule.step(50).unwrap().fraction, 1.0);
    }

    #[test]
    fn segment_fractions_include_both_ends() {
        let schedule =
            Schedule::build(&[kf("a", 1.0), kf("b", 3.0)], 5.0, 10).unwrap();
        let segment = &schedule.steps()[10..30];
        assert!(segment.iter().all(|s| s.from == "a" && s.to == "b"));
        assert_eq!(segment[0].fraction, 0.0);
        assert_eq!(segment[19].fraction, 1.0);
        assert!(segment.windows(2).all(|w| w[0].fraction < w[1].fraction));
    }

    #[test]
    fn single_frame_segment_uses_fraction_zero() {
        let schedule =
            Schedule::build(&[kf("a", 0.0), kf("b", 0.1)], 1.0, 10).unwrap();
        let step = schedule.step(0).unwrap();
        assert_eq!((step.from.as_str(), step.to.as_str()), ("a", "b"));
        assert_eq!(step.fraction, 0.0);
        assert!(schedule.steps().iter().all(|s| s.fraction.is_finite()));
    }

    #[test]
    fn uneven_keyframe_times_stay_on_their_frames() {
        let keyframes: Vec<Keyframe> = (0..10)
            .map(|i| kf(&format!("k{i}"), 0.15 * f64::from(i)))
            .collect();
        let schedule = Schedule::build(&keyframes, 3.0, 10).unwrap();
        assert_eq!(schedule.len(), 31);

        for keyframe in &keyframes {
            let index = (keyframe.time * 10.0).round() as usize;
            let step = schedule.step(index).unwrap();
            assert_eq!(step.from, keyframe.name);
            assert_eq!(step.fraction, 0.0);
        }
        let last = schedule.step(30).unwrap();
        assert_eq!((last.from.as_str(), last.to.as_str()), ("k9", "k9"));
    }

    #[test]
    fn keyframe_at_zero_has_no_leading_hold() {
        let schedule =
            Schedule::build(&[kf("a", 0.0), kf("b", 1.0)], 1.0, 4).unwrap();
        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule.step(0).unwrap().to, "b");
    }
}
