/// A mutation requested against one application's session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeCommand {
    /// Add a delta to the linear volume, clamped to `[0.0, 1.0]`.
    Adjust(f32),
    /// Set an absolute level on the 0-100 scale. Out-of-range input is clamped.
    Set(i32),
    /// Flip the mute flag.
    ToggleMute,
}

/// Value left on the session after a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeOutcome {
    /// New volume on the 0-100 scale.
    Volume(u8),
    /// New mute flag.
    Muted(bool),
}

/// Convert a linear scalar to the rounded 0-100 display scale.
pub fn scalar_to_percent(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Convert a 0-100 level to a linear scalar, clamping before the conversion.
pub fn percent_to_scalar(level: i32) -> f32 {
    level.clamp(0, 100) as f32 / 100.0
}
