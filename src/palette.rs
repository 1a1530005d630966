//! Maps solver output to RGBA8 pixels, one pixel per cell, row 0 first.

use std::sync::OnceLock;

use rayon::prelude::*;
use serde::Deserialize;

use crate::Field2;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("MAC_SMOKE_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameField {
    #[default]
    Smoke,
    Pressure,
}

impl FrameField {
    pub fn name(self) -> &'static str {
        match self {
            FrameField::Smoke => "smoke",
            FrameField::Pressure => "pressure",
        }
    }
}

fn to_byte(c: f32) -> u8 {
    (255.0 * c).round() as u8
}

/// Four-band scientific ramp: blue, cyan, green, yellow, red.
///
/// `val` is normalized against `[min, max]`; a flat range maps to the
/// middle of the ramp, and so does an inverted or NaN range.
pub fn sci_color(val: f32, min: f32, max: f32) -> [u8; 4] {
    let d = max - min;
    let val = if !(min <= max) || d == 0.0 {
        0.5
    } else {
        (val.clamp(min, max) - min) / d
    };
    let m = 0.25;
    // 1.0 belongs to the last band, not a fifth one.
    let band = ((val / m).floor() as i32).clamp(0, 3);
    let s = ((val - band as f32 * m) / m).clamp(0.0, 1.0);
    let (r, g, b) = match band {
        0 => (0.0, s, 1.0),
        1 => (0.0, 1.0, 1.0 - s),
        2 => (s, 1.0, 0.0),
        _ => (1.0, (1.0 - s).clamp(0.0, 1.0), 0.0),
    };
    [to_byte(r), to_byte(g), to_byte(b), 255]
}

pub fn smoke_gray(value: f32) -> [u8; 4] {
    let c = to_byte(value.clamp(0.0, 1.0));
    [c, c, c, 255]
}

fn map_into(field: &Field2, out: &mut Vec<u8>, f: impl Fn(f32) -> [u8; 4] + Sync) {
    let values = field.as_slice();
    out.resize(values.len() * 4, 0);
    if should_parallel(values.len()) {
        out.par_chunks_mut(4)
            .zip(values.par_iter())
            .for_each(|(pixel, value)| pixel.copy_from_slice(&f(*value)));
    } else {
        for (pixel, value) in out.chunks_mut(4).zip(values.iter()) {
            pixel.copy_from_slice(&f(*value));
        }
    }
}

/// Normalizes by the field's own finite min/max.
pub fn pressure_to_rgba(pressure: &Field2, out: &mut Vec<u8>) {
    let (min, max) = pressure.min_max();
    map_into(pressure, out, |value| sci_color(value, min, max));
}

pub fn smoke_to_rgba(smoke: &Field2, out: &mut Vec<u8>) {
    map_into(smoke, out, smoke_gray);
}
