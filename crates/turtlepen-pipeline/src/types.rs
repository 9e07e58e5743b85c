//! Shared types for the turtlepen compiler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Re-export `GrayImage` so downstream crates can hand raster masks to
/// the pipeline without depending on `image` directly.
pub use image::GrayImage;

/// An integer pixel coordinate in the source mask.
///
/// `x` grows to the right and `y` grows downward, matching image row order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Pixel {
    /// Column (pixels from left edge).
    pub x: u32,
    /// Row (pixels from top edge).
    pub y: u32,
}

impl Pixel {
    /// The top-left corner, where every compilation starts.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a new pixel coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`.
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

/// One of the four cardinal plotter headings.
///
/// Angles are measured clockwise in image space: 0° faces +x and 90°
/// faces +y (down the image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Heading {
    /// 0°, facing +x.
    #[default]
    PositiveX,
    /// 90°, facing +y.
    PositiveY,
    /// 180°, facing −x.
    NegativeX,
    /// 270°, facing −y.
    NegativeY,
}

impl Heading {
    /// All headings in increasing angle order.
    pub const ALL: [Self; 4] = [
        Self::PositiveX,
        Self::PositiveY,
        Self::NegativeX,
        Self::NegativeY,
    ];

    /// The heading angle in degrees, one of 0, 90, 180, 270.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::PositiveX => 0,
            Self::PositiveY => 90,
            Self::NegativeX => 180,
            Self::NegativeY => 270,
        }
    }

    /// The heading for an angle in degrees, normalized modulo 360.
    ///
    /// Returns `None` when the angle is not a multiple of 90.
    #[must_use]
    pub const fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::PositiveX),
            90 => Some(Self::PositiveY),
            180 => Some(Self::NegativeX),
            270 => Some(Self::NegativeY),
            _ => None,
        }
    }

    /// Unit step `(dx, dy)` taken by one forward move along this heading.
    #[must_use]
    pub const fn unit_step(self) -> (i64, i64) {
        match self {
            Self::PositiveX => (1, 0),
            Self::PositiveY => (0, 1),
            Self::NegativeX => (-1, 0),
            Self::NegativeY => (0, -1),
        }
    }
}

/// Whether the pen is marking or travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pen {
    /// Travelling without marking.
    #[default]
    Up,
    /// Marking.
    Down,
}

/// Position, heading, and pen state of the plotter.
///
/// This is the only mutable state of a compile pass. Path compilation
/// takes it by value and hands back the updated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlotterState {
    /// Current position.
    pub position: Pixel,
    /// Current heading.
    pub heading: Heading,
    /// Current pen state.
    pub pen: Pen,
}

/// A single turtle instruction.
///
/// The textual token form (see [`fmt::Display`] and [`FromStr`]) is:
/// `u`, `d`, `r<deg>` (clockwise), `l<deg>` (counter-clockwise), and
/// `m<units>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Lift the pen.
    PenUp,
    /// Lower the pen.
    PenDown,
    /// Rotate by signed degrees in (-180, 180]. Positive is clockwise,
    /// negative counter-clockwise, and 180 is the direction-agnostic
    /// half-turn.
    Rotate(i16),
    /// Move forward by the given number of units.
    Move(u32),
}

impl Command {
    /// Angle of the half-turn rotation.
    pub const HALF_TURN: i16 = 180;

    /// Normalize a signed angle into (-180, 180].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn normalize_angle(degrees: i32) -> i16 {
        let wrapped = degrees.rem_euclid(360);
        if wrapped > 180 {
            (wrapped - 360) as i16
        } else {
            wrapped as i16
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PenUp => f.write_str("u"),
            Self::PenDown => f.write_str("d"),
            Self::Rotate(degrees) if degrees < 0 => write!(f, "l{}", degrees.unsigned_abs()),
            Self::Rotate(degrees) => write!(f, "r{degrees}"),
            Self::Move(units) => write!(f, "m{units}"),
        }
    }
}

/// Errors from parsing a command token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    /// The token was empty.
    #[error("empty command token")]
    Empty,

    /// The token did not start with a known command letter, or a pen
    /// command carried trailing characters.
    #[error("unknown command token {0:?}")]
    Unknown(String),

    /// The numeric part of a rotate or move token was missing or invalid.
    #[error("invalid magnitude in command token {0:?}")]
    InvalidMagnitude(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        let Some(prefix) = chars.next() else {
            return Err(ParseCommandError::Empty);
        };
        let rest = chars.as_str();

        let magnitude = || -> Result<u32, ParseCommandError> {
            if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseCommandError::InvalidMagnitude(token.to_owned()));
            }
            rest.parse::<u32>()
                .map_err(|_| ParseCommandError::InvalidMagnitude(token.to_owned()))
        };

        match prefix {
            'u' if rest.is_empty() => Ok(Self::PenUp),
            'd' if rest.is_empty() => Ok(Self::PenDown),
            'r' | 'l' => {
                let degrees = i32::try_from(magnitude()? % 360)
                    .map_err(|_| ParseCommandError::InvalidMagnitude(token.to_owned()))?;
                let signed = if prefix == 'r' { degrees } else { -degrees };
                Ok(Self::Rotate(Self::normalize_angle(signed)))
            }
            'm' => Ok(Self::Move(magnitude()?)),
            _ => Err(ParseCommandError::Unknown(token.to_owned())),
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

/// A maximal 4-connected group of foreground pixels.
///
/// Pixels are stored in breadth-first visitation order from the seed
/// pixel, which is also the order they are drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island(Vec<Pixel>);

impl Island {
    /// Create an island from pixels in visitation order.
    #[must_use]
    pub const fn new(pixels: Vec<Pixel>) -> Self {
        Self(pixels)
    }

    /// Returns `true` if the island has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pixels in the island.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The entry pixel (the traversal seed).
    #[must_use]
    pub fn first(&self) -> Option<&Pixel> {
        self.0.first()
    }

    /// The last pixel in visitation order.
    #[must_use]
    pub fn last(&self) -> Option<&Pixel> {
        self.0.last()
    }

    /// All pixels in visitation order.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.0
    }
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A compiled turtle program: the ordered command stream plus the
/// canvas size of the mask it was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Commands in execution order.
    pub commands: Vec<Command>,
    /// Source mask dimensions.
    pub dimensions: Dimensions,
}

impl Program {
    /// Tally the commands by kind.
    #[must_use]
    pub fn counts(&self) -> CommandCounts {
        self.commands
            .iter()
            .fold(CommandCounts::default(), |mut counts, command| {
                match *command {
                    Command::PenUp => counts.pen_ups += 1,
                    Command::PenDown => counts.pen_downs += 1,
                    Command::Rotate(_) => counts.rotations += 1,
                    Command::Move(units) => {
                        counts.moves += 1;
                        counts.travel_units += u64::from(units);
                    }
                }
                counts
            })
    }
}

/// Per-kind command totals for a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandCounts {
    /// Number of `PenUp` commands.
    pub pen_ups: usize,
    /// Number of `PenDown` commands.
    pub pen_downs: usize,
    /// Number of `Rotate` commands.
    pub rotations: usize,
    /// Number of `Move` commands.
    pub moves: usize,
    /// Sum of all move distances.
    pub travel_units: u64,
}

/// Configuration for the image filtering front-end.
///
/// The defaults reproduce the reference filter chain: a 5×5 Gaussian
/// kernel, Canny at 50/150, and one 3×3 dilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gaussian blur sigma. Non-positive values skip the blur.
    pub blur_sigma: f32,

    /// Canny low threshold.
    pub canny_low: f32,

    /// Canny high threshold. Must be at least `canny_low`.
    pub canny_high: f32,

    /// Number of 3×3 dilation passes over the edge map.
    pub dilate_iterations: u32,

    /// Whether to invert the edge map, drawing the regions between edges
    /// instead of the edges themselves.
    pub invert: bool,
}

impl PipelineConfig {
    /// Sigma OpenCV derives for a 5×5 kernel: `0.3 * ((5 - 1) * 0.5 - 1) + 0.8`.
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.1;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default number of dilation passes.
    pub const DEFAULT_DILATE_ITERATIONS: u32 = 1;

    /// Check the configuration for values the filters cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if any float is not finite,
    /// a threshold is negative, or `canny_low > canny_high`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [
            ("blur_sigma", self.blur_sigma),
            ("canny_low", self.canny_low),
            ("canny_high", self.canny_high),
        ] {
            if !value.is_finite() {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.canny_low < 0.0 || self.canny_high < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "canny thresholds must be non-negative, got {}..{}",
                self.canny_low, self.canny_high
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(PipelineError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            dilate_iterations: Self::DEFAULT_DILATE_ITERATIONS,
            invert: false,
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Every variant is terminal for the compilation that raised it; no
/// partial program is produced.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The mask has a zero width or height.
    #[error("mask dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The mask data length does not match `width * height`.
    #[error("mask data has {found} cells, expected {expected}")]
    SizeMismatch {
        /// `width * height`.
        expected: usize,
        /// Actual number of cells supplied.
        found: usize,
    },

    /// A mask row has a different length from the first row.
    #[error("mask row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A mask cell is neither background (0) nor foreground (255).
    #[error("mask value {value} at ({x}, {y}) is not binary")]
    NonBinaryValue {
        /// Column of the offending cell.
        x: u32,
        /// Row of the offending cell.
        y: u32,
        /// The value found.
        value: u8,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_origin_facing_x_pen_up() {
        let state = PlotterState::default();
        assert_eq!(state.position, Pixel::ORIGIN);
        assert_eq!(Pixel::default(), Pixel::ORIGIN);
        assert_eq!(state.heading, Heading::PositiveX);
        assert_eq!(state.pen, Pen::Up);
    }

    #[test]
    fn chebyshev_takes_larger_axis() {
        let a = Pixel::new(1, 5);
        let b = Pixel::new(4, 3);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(b.chebyshev_distance(a), 3);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn heading_degrees_round_trip() {
        for heading in Heading::ALL {
            assert_eq!(
                Heading::from_degrees(i32::from(heading.degrees())),
                Some(heading)
            );
        }
        assert_eq!(Heading::from_degrees(-90), Some(Heading::NegativeY));
        assert_eq!(Heading::from_degrees(450), Some(Heading::PositiveY));
        assert_eq!(Heading::from_degrees(45), None);
    }

    #[test]
    fn command_tokens() {
        assert_eq!(Command::PenUp.to_string(), "u");
        assert_eq!(Command::PenDown.to_string(), "d");
        assert_eq!(Command::Rotate(90).to_string(), "r90");
        assert_eq!(Command::Rotate(-90).to_string(), "l90");
        assert_eq!(Command::Rotate(Command::HALF_TURN).to_string(), "r180");
        assert_eq!(Command::Move(1).to_string(), "m1");
    }

    #[test]
    fn parse_tokens() {
        assert_eq!("u".parse::<Command>().unwrap(), Command::PenUp);
        assert_eq!("d".parse::<Command>().unwrap(), Command::PenDown);
        assert_eq!("r90".parse::<Command>().unwrap(), Command::Rotate(90));
        assert_eq!("l90".parse::<Command>().unwrap(), Command::Rotate(-90));
        assert_eq!("m12".parse::<Command>().unwrap(), Command::Move(12));
    }

    #[test]
    fn parse_normalizes_rotation_angles() {
        assert_eq!("l180".parse::<Command>().unwrap(), Command::Rotate(180));
        assert_eq!("r270".parse::<Command>().unwrap(), Command::Rotate(-90));
        assert_eq!("l270".parse::<Command>().unwrap(), Command::Rotate(90));
        assert_eq!("r360".parse::<Command>().unwrap(), Command::Rotate(0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert!(matches!(
            "x1".parse::<Command>(),
            Err(ParseCommandError::Unknown(_))
        ));
        assert!(matches!(
            "up".parse::<Command>(),
            Err(ParseCommandError::Unknown(_))
        ));
        assert!(matches!(
            "m".parse::<Command>(),
            Err(ParseCommandError::InvalidMagnitude(_))
        ));
        assert!(matches!(
            "m-1".parse::<Command>(),
            Err(ParseCommandError::InvalidMagnitude(_))
        ));
        assert!(matches!(
            "r9x".parse::<Command>(),
            Err(ParseCommandError::InvalidMagnitude(_))
        ));
    }

    #[test]
    fn command_serializes_as_token() {
        let commands = vec![Command::PenUp, Command::Rotate(-90), Command::Move(1)];
        let json = serde_json::to_string(&commands).unwrap();
        assert_eq!(json, r#"["u","l90","m1"]"#);
        let back: Vec<Command> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commands);
    }

    #[test]
    fn command_deserialize_rejects_unknown_token() {
        let result: Result<Vec<Command>, _> = serde_json::from_str(r#"["u","z"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn program_counts() {
        let program = Program {
            commands: vec![
                Command::PenUp,
                Command::Move(1),
                Command::Rotate(90),
                Command::Move(3),
                Command::PenDown,
            ],
            dimensions: Dimensions {
                width: 4,
                height: 4,
            },
        };
        let counts = program.counts();
        assert_eq!(counts.pen_ups, 1);
        assert_eq!(counts.pen_downs, 1);
        assert_eq!(counts.rotations, 1);
        assert_eq!(counts.moves, 2);
        assert_eq!(counts.travel_units, 4);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn config_rejects_inverted_thresholds() {
        let config = PipelineConfig {
            canny_low: 200.0,
            canny_high: 100.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_nan() {
        let config = PipelineConfig {
            blur_sigma: f32::NAN,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_json_fills_missing_fields_with_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"invert":true}"#).unwrap();
        assert!(config.invert);
        assert!((config.canny_low - PipelineConfig::DEFAULT_CANNY_LOW).abs() < f32::EPSILON);
    }
}
