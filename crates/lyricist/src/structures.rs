//! Song structures and the per-section line rules.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Structure {
    pub name: &'static str,
    pub sections: &'static [&'static str],
    /// Shorthand like "I-V1-H-V2-H-B-H-O"
    pub pattern: &'static str,
}

pub const STRUCTURES: [Structure; 6] = [
    Structure {
        name: "classic",
        sections: &["Intro", "Verse 1", "Hook", "Verse 2", "Hook", "Bridge", "Hook", "Outro"],
        pattern: "I-V1-H-V2-H-B-H-O",
    },
    Structure {
        name: "modern",
        sections: &["Intro", "Hook", "Verse 1", "Hook", "Verse 2", "Hook", "Outro"],
        pattern: "I-H-V1-H-V2-H-O",
    },
    Structure {
        name: "trap",
        sections: &["Intro", "Verse 1", "Pre-Hook", "Hook", "Verse 2", "Hook", "Verse 3", "Hook"],
        pattern: "I-V1-PH-H-V2-H-V3-H",
    },
    Structure {
        name: "rn_b",
        sections: &["Intro", "Verse 1", "Hook", "Verse 2", "Hook", "Bridge", "Hook", "Outro"],
        pattern: "I-V1-H-V2-H-B-H-O",
    },
    Structure {
        name: "trance",
        sections: &["Intro", "Break", "Build", "Drop 1", "Break", "Build", "Drop 2", "Outro"],
        pattern: "I-B-BD1-B-BD2-O",
    },
    Structure {
        name: "rock",
        sections: &[
            "Intro",
            "Verse 1",
            "Pre-Chorus",
            "Chorus",
            "Verse 2",
            "Chorus",
            "Bridge",
            "Chorus",
            "Outro",
        ],
        pattern: "I-V1-PC-V2-B-BC-O",
    },
];

/// Look up a structure by name, falling back to "classic".
pub fn structure(name: &str) -> &'static Structure {
    let wanted = name.trim().to_ascii_lowercase();
    STRUCTURES
        .iter()
        .find(|s| s.name == wanted)
        .unwrap_or(&STRUCTURES[0])
}

/// How a section draws lines from a theme's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRule {
    /// `count` lines drawn from the whole pool
    Lines { count: usize },
    /// One line drawn from `pool[start..end]`
    One { start: usize, end: usize },
    /// Heading only (instrumental build/drop)
    Instrumental,
}

impl SectionRule {
    pub fn for_section(section: &str) -> SectionRule {
        if section.starts_with("Pre") {
            SectionRule::One { start: 0, end: 4 }
        } else if section.contains("Hook") || section.contains("Chorus") {
            SectionRule::Lines { count: 4 }
        } else if section.contains("Verse") {
            SectionRule::Lines { count: 8 }
        } else if section.contains("Intro") || section.contains("Outro") {
            SectionRule::One { start: 0, end: 2 }
        } else if section.contains("Break") || section.contains("Bridge") {
            SectionRule::One { start: 2, end: 4 }
        } else {
            SectionRule::Instrumental
        }
    }
}
