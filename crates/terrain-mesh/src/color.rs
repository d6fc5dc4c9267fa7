//! Color ramps for terrain and wind vertices.

use asc_parser::Rgb;
use serde::{Deserialize, Serialize};

/// Six-band hue wheel along the grid diagonal.
///
/// Used when a map has no vegetation palette. The normalized diagonal index
/// `(row + col) / (rows + cols - 2)` walks from magenta at the origin
/// through blue, cyan, green and yellow to red at the far corner.
pub fn hue_gradient(row: usize, col: usize, rows: usize, cols: usize) -> Rgb {
    let span = (rows + cols).saturating_sub(2);
    let t = if span == 0 {
        0.0
    } else {
        (row + col) as f32 / span as f32
    };

    let a = (1.0 - t) / 0.2;
    let band = a.floor();
    let f = a - band;

    match band as i32 {
        i32::MIN..=0 => [1.0, f, 0.0],
        1 => [1.0 - f, 1.0, 0.0],
        2 => [0.0, 1.0, f],
        3 => [0.0, 1.0 - f, 1.0],
        4 => [f, 0.0, 1.0],
        _ => [1.0, 0.0, 1.0],
    }
}

/// Two-segment ramp for normalized wind speed.
///
/// Red → green over `0.0..=0.5`, green → blue over `0.5..=1.0`. Input is
/// clamped to the unit interval.
pub fn wind_speed_color(t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    if t <= 0.5 {
        let t = t * 2.0;
        [1.0 - t, t, 0.0]
    } else {
        let t = t * 2.0 - 1.0;
        [0.0, 1.0 - t, t]
    }
}

/// Selectable color map for streamline speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindPalette {
    /// Red → green → blue, see [`wind_speed_color`].
    #[default]
    Speed,
    Jet,
    Hot,
    Cool,
    Spring,
    Summer,
    Autumn,
    Winter,
    Viridis,
    Magma,
    Plasma,
}

const JET: &[(f32, Rgb)] = &[
    (0.0, [0.0, 0.0, 0.5]),
    (0.125, [0.0, 0.0, 1.0]),
    (0.375, [0.0, 1.0, 1.0]),
    (0.625, [1.0, 1.0, 0.0]),
    (0.875, [1.0, 0.0, 0.0]),
    (1.0, [0.5, 0.0, 0.0]),
];

const HOT: &[(f32, Rgb)] = &[
    (0.0, [0.0416, 0.0, 0.0]),
    (0.365, [1.0, 0.0, 0.0]),
    (0.746, [1.0, 1.0, 0.0]),
    (1.0, [1.0, 1.0, 1.0]),
];

const COOL: &[(f32, Rgb)] = &[(0.0, [0.0, 1.0, 1.0]), (1.0, [1.0, 0.0, 1.0])];
const SPRING: &[(f32, Rgb)] = &[(0.0, [1.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 0.0])];
const SUMMER: &[(f32, Rgb)] = &[(0.0, [0.0, 0.5, 0.4]), (1.0, [1.0, 1.0, 0.4])];
const AUTUMN: &[(f32, Rgb)] = &[(0.0, [1.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 0.0])];
const WINTER: &[(f32, Rgb)] = &[(0.0, [0.0, 0.0, 1.0]), (1.0, [0.0, 1.0, 0.5])];

const VIRIDIS: &[(f32, Rgb)] = &[
    (0.0, [0.267, 0.005, 0.329]),
    (0.25, [0.229, 0.322, 0.546]),
    (0.5, [0.128, 0.567, 0.551]),
    (0.75, [0.369, 0.789, 0.383]),
    (1.0, [0.993, 0.906, 0.144]),
];

const MAGMA: &[(f32, Rgb)] = &[
    (0.0, [0.001, 0.0, 0.014]),
    (0.25, [0.316, 0.071, 0.485]),
    (0.5, [0.716, 0.215, 0.475]),
    (0.75, [0.987, 0.535, 0.382]),
    (1.0, [0.987, 0.991, 0.75]),
];

const PLASMA: &[(f32, Rgb)] = &[
    (0.0, [0.05, 0.03, 0.528]),
    (0.25, [0.494, 0.012, 0.658]),
    (0.5, [0.798, 0.28, 0.47]),
    (0.75, [0.973, 0.585, 0.252]),
    (1.0, [0.94, 0.975, 0.131]),
];

impl WindPalette {
    /// Every palette, in menu order.
    pub const ALL: [Self; 11] = [
        Self::Speed,
        Self::Jet,
        Self::Hot,
        Self::Cool,
        Self::Spring,
        Self::Summer,
        Self::Autumn,
        Self::Winter,
        Self::Viridis,
        Self::Magma,
        Self::Plasma,
    ];

    /// Parse from string (case-insensitive). Unknown names fall back to `Speed`.
    pub fn from_str(s: &str) -> Self {
        let s = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Jet => "jet",
            Self::Hot => "hot",
            Self::Cool => "cool",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
            Self::Viridis => "viridis",
            Self::Magma => "magma",
            Self::Plasma => "plasma",
        }
    }

    /// Color for a normalized speed, clamped to the unit interval.
    pub fn color(&self, t: f32) -> Rgb {
        let stops = match self {
            Self::Speed => return wind_speed_color(t),
            Self::Jet => JET,
            Self::Hot => HOT,
            Self::Cool => COOL,
            Self::Spring => SPRING,
            Self::Summer => SUMMER,
            Self::Autumn => AUTUMN,
            Self::Winter => WINTER,
            Self::Viridis => VIRIDIS,
            Self::Magma => MAGMA,
            Self::Plasma => PLASMA,
        };
        interpolate_stops(stops, t)
    }
}

impl std::fmt::Display for WindPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Piecewise linear blend between sorted `(position, color)` stops.
fn interpolate_stops(stops: &[(f32, Rgb)], t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    for pair in stops.windows(2) {
        let (lo, c0) = pair[0];
        let (hi, c1) = pair[1];
        if t <= hi {
            let f = if hi > lo { (t - lo) / (hi - lo) } else { 0.0 };
            return [
                c0[0] + (c1[0] - c0[0]) * f,
                c0[1] + (c1[1] - c0[1]) * f,
                c0[2] + (c1[2] - c0[2]) * f,
            ];
        }
    }
    stops.last().map(|&(_, c)| c).unwrap_or([0.0; 3])
}

/// Normalize `value` into `0.0..=1.0` over `[min, max]`.
///
/// A flat range maps everything to 0.
pub(crate) fn normalize_in_range(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range.abs() < f32::EPSILON {
        return 0.0;
    }
    ((value - min) / range).clamp(0.0, 1.0)
}
