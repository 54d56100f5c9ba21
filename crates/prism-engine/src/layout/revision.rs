use std::fmt;
use std::str::FromStr;

use crate::LayoutError;

/// Version tag of the shared CPU/GPU schema.
///
/// Writer and reader must agree on one revision; there is no in-band version field,
/// so the tag travels with the pipeline configuration instead.
///
/// | | V1 | V2 |
/// |---|---|---|
/// | instance record | `PerInstanceUniforms` (64 B) | `PrimitiveInstance` (96 B, object id) |
/// | material | diffuse | diffuse, uv scale/offset |
/// | frame uniforms | `Uniforms` (144 B) | `SceneUniforms` (160 B, near transparency) |
/// | colored vertex color | packed unorm8x4 | float4 |
/// | default sampler addressing | wrap | clamp to edge |
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub enum FormatRevision {
    V1,
    #[default]
    V2,
}

impl FormatRevision {
    pub const LATEST: Self = FormatRevision::V2;
    pub const ALL: [Self; 2] = [FormatRevision::V1, FormatRevision::V2];

    #[inline]
    pub const fn number(self) -> u32 {
        match self {
            FormatRevision::V1 => 1,
            FormatRevision::V2 => 2,
        }
    }
}

impl fmt::Display for FormatRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Accepts `1`, `v1`, `V1` (and likewise for 2).
impl FromStr for FormatRevision {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let digits = t.strip_prefix(['v', 'V']).unwrap_or(t);
        match digits {
            "1" => Ok(FormatRevision::V1),
            "2" => Ok(FormatRevision::V2),
            _ => Err(LayoutError::UnknownRevision(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_prefixed_names() {
        assert_eq!("1".parse::<FormatRevision>(), Ok(FormatRevision::V1));
        assert_eq!("v2".parse::<FormatRevision>(), Ok(FormatRevision::V2));
        assert_eq!(" V1 ".parse::<FormatRevision>(), Ok(FormatRevision::V1));
    }

    #[test]
    fn rejects_unknown_revisions() {
        assert_eq!(
            "v3".parse::<FormatRevision>(),
            Err(LayoutError::UnknownRevision("v3".into()))
        );
        assert!("".parse::<FormatRevision>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for r in FormatRevision::ALL {
            assert_eq!(r.to_string().parse::<FormatRevision>(), Ok(r));
        }
        assert_eq!(FormatRevision::default(), FormatRevision::LATEST);
    }
}
