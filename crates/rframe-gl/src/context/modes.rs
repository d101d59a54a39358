//! Render modes cached by a context, and their native value tables.

use crate::driver::{GlEnum, consts};
use crate::error::{CallFailure, ContextError, Result};

/// Polygon rasterization mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    Point,
    Line,
    #[default]
    Fill,
}

/// Face culling mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CullingMode {
    #[default]
    NoCulling,
    BackCulling,
    FrontCulling,
    /// Culls every polygon; points and lines still render.
    FullCulling,
}

/// Depth buffer testing mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DepthTestMode {
    #[default]
    Disabled,
    /// Test and write depth.
    Enabled,
    /// Test without updating the depth buffer.
    ReadOnly,
}

/// Alpha blending mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Disabled,
    /// `src_alpha, 1 - src_alpha`
    DefaultTransparency,
}

/// Snapshot of the modes cached by a context.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    pub polygon_mode: PolygonMode,
    pub culling_mode: CullingMode,
    pub depth_test_mode: DepthTestMode,
    pub blending_mode: BlendMode,
}

pub(crate) const POLYGON_MODES: &[(PolygonMode, GlEnum)] = &[
    (PolygonMode::Point, consts::POINT),
    (PolygonMode::Line, consts::LINE),
    (PolygonMode::Fill, consts::FILL),
];

/// Faces culled by each culling mode. `NoCulling` disables the feature instead.
pub(crate) const CULLED_FACES: &[(CullingMode, GlEnum)] = &[
    (CullingMode::BackCulling, consts::BACK),
    (CullingMode::FrontCulling, consts::FRONT),
    (CullingMode::FullCulling, consts::FRONT_AND_BACK),
];

/// Depth writes for each depth mode. `Disabled` disables the feature instead.
pub(crate) const DEPTH_WRITES: &[(DepthTestMode, bool)] = &[
    (DepthTestMode::Enabled, true),
    (DepthTestMode::ReadOnly, false),
];

/// Blend factors for each blending mode. `Disabled` disables the feature instead.
pub(crate) const BLEND_FUNCTIONS: &[(BlendMode, (GlEnum, GlEnum))] = &[(
    BlendMode::DefaultTransparency,
    (consts::SRC_ALPHA, consts::ONE_MINUS_SRC_ALPHA),
)];

/// Looks `mode` up in `table`. A missing entry is a mode-edit error.
pub(crate) fn lookup<M, V>(table: &[(M, V)], mode: M, what: &'static str) -> Result<V>
where
    M: Copy + PartialEq,
    V: Copy,
{
    table
        .iter()
        .find(|(key, _)| *key == mode)
        .map(|(_, value)| *value)
        .ok_or(ContextError::ModeEdit(CallFailure::Unmapped { what }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_match_a_fresh_context() {
        let state = RenderState::default();
        assert_eq!(state.polygon_mode, PolygonMode::Fill);
        assert_eq!(state.culling_mode, CullingMode::NoCulling);
        assert_eq!(state.depth_test_mode, DepthTestMode::Disabled);
        assert_eq!(state.blending_mode, BlendMode::Disabled);
    }

    #[test]
    fn every_polygon_mode_is_mapped() {
        for mode in [PolygonMode::Point, PolygonMode::Line, PolygonMode::Fill] {
            assert!(lookup(POLYGON_MODES, mode, "polygon mode").is_ok());
        }
        assert_eq!(lookup(POLYGON_MODES, PolygonMode::Line, "polygon mode").unwrap(), consts::LINE);
    }

    #[test]
    fn culling_table_covers_enabled_modes_only() {
        assert_eq!(
            lookup(CULLED_FACES, CullingMode::FullCulling, "culling").unwrap(),
            consts::FRONT_AND_BACK
        );
        let err = lookup(CULLED_FACES, CullingMode::NoCulling, "culling").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModeEdit);
    }

    #[test]
    fn read_only_depth_does_not_write() {
        assert!(lookup(DEPTH_WRITES, DepthTestMode::Enabled, "depth").unwrap());
        assert!(!lookup(DEPTH_WRITES, DepthTestMode::ReadOnly, "depth").unwrap());
    }

    #[test]
    fn missing_entry_names_the_table() {
        let err = lookup(BLEND_FUNCTIONS, BlendMode::Disabled, "blend function").unwrap_err();
        assert_eq!(err, ContextError::ModeEdit(CallFailure::Unmapped { what: "blend function" }));
    }
}
