use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Mono,
    Left,
    Right,
}

impl Eye {
    pub const fn index(self) -> u32 {
        match self {
            Eye::Mono => 0,
            Eye::Left => 1,
            Eye::Right => 2,
        }
    }

    /// Direction of the eye's offset along the head's x axis.
    pub const fn lateral_sign(self) -> f32 {
        match self {
            Eye::Mono => 0.0,
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const MONO = 1;
        const STEREO = 1 << 1;
        /// Passthrough / augmented reality.
        const AR = 1 << 2;
        /// Renders to an external device rather than the main window.
        const EXTERNAL = 1 << 3;
    }
}
