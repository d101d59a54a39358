use std::fmt;

/// OpenGL `(major, minor)` version.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlVersion {
    pub major: i32,
    pub minor: i32,
}

impl GlVersion {
    /// What a context created without negotiation is guaranteed to provide.
    pub const LEGACY: Self = Self::new(1, 1);

    pub const fn new(major: i32, minor: i32) -> Self {
        Self { major, minor }
    }

    pub const fn pair(self) -> (i32, i32) {
        (self.major, self.minor)
    }
}

impl Default for GlVersion {
    fn default() -> Self {
        Self::new(4, 6)
    }
}

impl From<(i32, i32)> for GlVersion {
    fn from((major, minor): (i32, i32)) -> Self {
        Self::new(major, minor)
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parameters for negotiating a shared context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContextInit {
    /// Version requested from the driver.
    pub version: GlVersion,

    /// Request the core profile. Compatibility profile otherwise.
    pub core_profile: bool,
}

impl Default for ContextInit {
    fn default() -> Self {
        Self {
            version: GlVersion::default(),
            core_profile: true,
        }
    }
}
