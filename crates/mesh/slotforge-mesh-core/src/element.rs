//! Structural roles of symbol elements and their mesh fidelity budgets.

use serde::{Deserialize, Serialize};

/// Structural role an element plays inside a symbol.
///
/// The role decides how many vertices the element's mesh keeps and, further
/// downstream, which motion vocabulary it animates with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Wing,
    Body,
    Head,
    Tail,
    Arm,
    Leg,
    Antenna,
    Eye,
    Generic,
}

/// Recognised names per role. Matching is case-insensitive on whole tokens, so
/// `left_wing`, `Wings` and `wing-2` all resolve to [`ElementKind::Wing`].
const ALIASES: &[(ElementKind, &[&str])] = &[
    (ElementKind::Wing, &["wing", "wings", "fin", "fins", "feather"]),
    (ElementKind::Body, &["body", "torso", "core", "hull", "symbol"]),
    (ElementKind::Head, &["head", "face", "skull"]),
    (ElementKind::Tail, &["tail"]),
    (ElementKind::Arm, &["arm", "arms", "hand", "claw", "claws"]),
    (ElementKind::Leg, &["leg", "legs", "foot", "feet"]),
    (ElementKind::Antenna, &["antenna", "antennae", "antennas", "horn", "horns"]),
    (ElementKind::Eye, &["eye", "eyes", "pupil"]),
];

impl ElementKind {
    pub const ALL: [ElementKind; 9] = [
        ElementKind::Wing,
        ElementKind::Body,
        ElementKind::Head,
        ElementKind::Tail,
        ElementKind::Arm,
        ElementKind::Leg,
        ElementKind::Antenna,
        ElementKind::Eye,
        ElementKind::Generic,
    ];

    /// Resolve a free-form element type. Unknown names map to `Generic`.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_ascii_lowercase();
        let tokens = lowered
            .split(|c: char| !c.is_ascii_alphabetic())
            .filter(|t| !t.is_empty());
        for token in tokens {
            for (kind, aliases) in ALIASES {
                if aliases.contains(&token) {
                    return *kind;
                }
            }
        }
        log::debug!("element type '{name}' not recognised; using generic role");
        ElementKind::Generic
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Wing => "wing",
            ElementKind::Body => "body",
            ElementKind::Head => "head",
            ElementKind::Tail => "tail",
            ElementKind::Arm => "arm",
            ElementKind::Leg => "leg",
            ElementKind::Antenna => "antenna",
            ElementKind::Eye => "eye",
            ElementKind::Generic => "generic",
        }
    }

    /// Default simplified vertex budget. Wings keep the most detail because
    /// their silhouette is visible throughout a flutter; eyes need very little.
    pub fn default_target_points(&self) -> usize {
        match self {
            ElementKind::Wing => 25,
            ElementKind::Body => 20,
            ElementKind::Head => 16,
            ElementKind::Tail => 14,
            ElementKind::Arm => 12,
            ElementKind::Leg => 10,
            ElementKind::Antenna => 8,
            ElementKind::Eye => 6,
            ElementKind::Generic => 16,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
