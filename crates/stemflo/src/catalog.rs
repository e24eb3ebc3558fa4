//! Style catalog: named presets mapping to tempo, key and genre.
//!
//! The catalog is a plain value handed to the generator, so callers (and
//! tests) can build their own instead of the built-in table. Lookups never
//! fail: an unknown name resolves to the catalog's fallback style.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::key::{Key, KeyMode, Scale};

/// Genre tag. The taxonomy is open-ended; anything unrecognized is kept
/// verbatim in `Other` and handled by the default templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Genre {
    Trap,
    Drill,
    RnB,
    Pop,
    House,
    HipHop,
    Trance,
    Techno,
    Dubstep,
    DnB,
    Ambient,
    Rock,
    ProgressiveHouse,
    Edm,
    LoFi,
    Synthwave,
    Phonk,
    Electronic,
    Other(String),
}

impl Genre {
    /// Genres offered for selection, in menu order.
    pub const MENU: [Genre; 18] = [
        Genre::Trap,
        Genre::Drill,
        Genre::RnB,
        Genre::Pop,
        Genre::House,
        Genre::HipHop,
        Genre::Trance,
        Genre::Techno,
        Genre::Dubstep,
        Genre::DnB,
        Genre::Ambient,
        Genre::Rock,
        Genre::ProgressiveHouse,
        Genre::Edm,
        Genre::LoFi,
        Genre::Synthwave,
        Genre::Phonk,
        Genre::Electronic,
    ];

    /// Lenient parse: case, spacing and punctuation are ignored.
    pub fn from_name(name: &str) -> Genre {
        let folded: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "trap" => Genre::Trap,
            "drill" => Genre::Drill,
            "rb" | "rnb" | "randb" => Genre::RnB,
            "pop" => Genre::Pop,
            "house" => Genre::House,
            "hiphop" => Genre::HipHop,
            "trance" => Genre::Trance,
            "techno" => Genre::Techno,
            "dubstep" => Genre::Dubstep,
            "dnb" | "drumandbass" | "drumnbass" => Genre::DnB,
            "ambient" => Genre::Ambient,
            "rock" => Genre::Rock,
            "progressivehouse" => Genre::ProgressiveHouse,
            "edm" => Genre::Edm,
            "lofi" => Genre::LoFi,
            "synthwave" => Genre::Synthwave,
            "phonk" => Genre::Phonk,
            "electronic" => Genre::Electronic,
            _ => Genre::Other(name.trim().to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Genre::Trap => "Trap",
            Genre::Drill => "Drill",
            Genre::RnB => "R&B",
            Genre::Pop => "Pop",
            Genre::House => "House",
            Genre::HipHop => "Hip Hop",
            Genre::Trance => "Trance",
            Genre::Techno => "Techno",
            Genre::Dubstep => "Dubstep",
            Genre::DnB => "DnB",
            Genre::Ambient => "Ambient",
            Genre::Rock => "Rock",
            Genre::ProgressiveHouse => "Progressive House",
            Genre::Edm => "EDM",
            Genre::LoFi => "Lo-Fi",
            Genre::Synthwave => "Synthwave",
            Genre::Phonk => "Phonk",
            Genre::Electronic => "Electronic",
            Genre::Other(name) => name,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<String> for Genre {
    fn from(value: String) -> Self {
        Genre::from_name(&value)
    }
}

impl From<&str> for Genre {
    fn from(value: &str) -> Self {
        Genre::from_name(value)
    }
}

impl From<Genre> for String {
    fn from(genre: Genre) -> Self {
        genre.display_name().to_string()
    }
}

/// A named style preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub name: String,
    /// Beats per minute, > 0
    pub tempo: u16,
    pub key: Key,
    pub genre: Genre,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub description: String,
    /// Overrides the major/minor scale implied by `key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruments: Vec<String>,
}

impl StyleDescriptor {
    pub fn new(name: impl Into<String>, tempo: u16, key: Key, genre: Genre) -> Self {
        StyleDescriptor {
            name: name.into(),
            tempo,
            key,
            genre,
            mood: String::new(),
            description: String::new(),
            scale: None,
            instruments: Vec::new(),
        }
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_instruments<I, S>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instruments = instruments.into_iter().map(Into::into).collect();
        self
    }

    /// Scale for melodic templates: explicit override, else from the key.
    pub fn scale(&self) -> Scale {
        self.scale.unwrap_or_else(|| self.key.default_scale())
    }

    /// Lowercase, underscore-separated name for output files.
    pub fn slug(&self) -> String {
        let slug: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let mut collapsed = String::with_capacity(slug.len());
        for c in slug.chars() {
            if c == '_' && collapsed.ends_with('_') {
                continue;
            }
            collapsed.push(c);
        }
        collapsed.trim_matches('_').to_string()
    }
}

/// Immutable set of style presets plus the fallback used on a miss.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    styles: Vec<StyleDescriptor>,
    fallback: StyleDescriptor,
}

impl StyleCatalog {
    /// A catalog containing only `fallback`.
    pub fn new(fallback: StyleDescriptor) -> Self {
        StyleCatalog {
            styles: vec![fallback.clone()],
            fallback,
        }
    }

    /// The built-in artist table. Fallback is "Metro Boomin".
    pub fn builtin() -> Self {
        let styles: Vec<StyleDescriptor> = BUILTIN.iter().map(Preset::to_descriptor).collect();
        let fallback = styles[0].clone();
        StyleCatalog { styles, fallback }
    }

    /// Add a style, replacing any existing entry with the same name.
    ///
    /// Replacing the fallback's entry replaces the fallback too.
    pub fn with_style(mut self, style: StyleDescriptor) -> Self {
        if names_match(&self.fallback.name, &style.name) {
            self.fallback = style.clone();
        }
        match self
            .styles
            .iter_mut()
            .find(|existing| names_match(&existing.name, &style.name))
        {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
        self
    }

    /// Make an existing style the fallback. Unknown names leave it unchanged.
    pub fn with_fallback(mut self, name: &str) -> Self {
        if let Some(style) = self.get(name).cloned() {
            self.fallback = style;
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&StyleDescriptor> {
        self.styles
            .iter()
            .find(|style| style.name == name)
            .or_else(|| self.styles.iter().find(|style| names_match(&style.name, name)))
    }

    /// Resolve a style name, falling back to the default on a miss.
    pub fn lookup(&self, name: &str) -> &StyleDescriptor {
        match self.get(name) {
            Some(style) => style,
            None => {
                tracing::debug!(
                    requested = name,
                    fallback = %self.fallback.name,
                    "unknown style, using fallback"
                );
                &self.fallback
            }
        }
    }

    pub fn fallback(&self) -> &StyleDescriptor {
        &self.fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDescriptor> {
        self.styles.iter()
    }

    pub fn by_genre<'a>(&'a self, genre: &'a Genre) -> impl Iterator<Item = &'a StyleDescriptor> {
        self.styles.iter().filter(move |style| &style.genre == genre)
    }

    /// Distinct genres in catalog order.
    pub fn genres(&self) -> Vec<&Genre> {
        let mut genres: Vec<&Genre> = Vec::new();
        for style in &self.styles {
            if !genres.contains(&&style.genre) {
                genres.push(&style.genre);
            }
        }
        genres
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        StyleCatalog::builtin()
    }
}

fn names_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

struct Preset {
    name: &'static str,
    bpm: u16,
    key: Key,
    genre: &'static str,
    mood: &'static str,
    description: &'static str,
    instruments: &'static [&'static str],
}

impl Preset {
    fn to_descriptor(&self) -> StyleDescriptor {
        StyleDescriptor::new(self.name, self.bpm, self.key, Genre::from_name(self.genre))
            .with_mood(self.mood)
            .with_description(self.description)
            .with_instruments(self.instruments.iter().copied())
    }
}

const fn minor(root: u8) -> Key {
    Key::new(root, KeyMode::Minor)
}

const fn major(root: u8) -> Key {
    Key::new(root, KeyMode::Major)
}

const C: u8 = 0;
const D: u8 = 2;
const E: u8 = 4;
const F: u8 = 5;
const G: u8 = 7;
const A: u8 = 9;
const B: u8 = 11;

const SYTRUS_HARMOR: &[&str] = &["Sytrus", "Harmor"];
const HARMOR_SYTRUS: &[&str] = &["Harmor", "Sytrus"];
const SYTRUS: &[&str] = &["Sytrus"];
const HARMOR: &[&str] = &["Harmor"];
const SYTRUS_FPC: &[&str] = &["Sytrus", "FPC"];

macro_rules! preset {
    ($name:expr, $bpm:expr, $key:expr, $genre:expr, $mood:expr, $desc:expr, $inst:expr) => {
        Preset {
            name: $name,
            bpm: $bpm,
            key: $key,
            genre: $genre,
            mood: $mood,
            description: $desc,
            instruments: $inst,
        }
    };
}

// First entry is the fallback.
const BUILTIN: &[Preset] = &[
    // Trap
    preset!("Metro Boomin", 140, minor(C), "Trap", "dark", "Dark 808s, bell melodies, half-time", &["Sytrus", "Harmor", "FPC"]),
    preset!("Southside", 140, minor(G), "Trap", "aggressive", "Heavy 808 slides, crispy hi-hats", &["Sytrus", "Harmor", "FPC"]),
    preset!("Wheezy", 146, minor(D), "Trap", "spacey", "Guitar/flute melodies, spacey", &["Sytrus", "Harmor", "Sakura"]),
    preset!("Nick Mira", 130, minor(A), "Trap", "emo", "Emo/melodic, layered pianos", SYTRUS_HARMOR),
    preset!("Pi'erre Bourne", 146, minor(E), "Trap", "bouncy", "Bouncy drums, harp leads", SYTRUS_HARMOR),
    preset!("Travis Scott", 140, minor(C), "Trap", "ethereal", "Auto-tune, ethereal, heavy reverb", SYTRUS_HARMOR),
    preset!("Zaytoven", 140, minor(F), "Trap", "orchestral", "Orchestral 808s, church organs", SYTRUS_HARMOR),
    preset!("London On Da Track", 145, minor(G), "Trap", "bouncy", "Young Thug style, bouncy", SYTRUS_HARMOR),
    preset!("Tay Keith", 145, minor(C), "Trap", "hard", "Hard 808s, minimal", SYTRUS_FPC),
    preset!("Cash Cobain", 138, minor(D), "Trap", "gritty", "Sample drill, gritty 808s", SYTRUS_FPC),
    // R&B
    preset!("The Weeknd", 120, minor(E), "R&B", "dark", "Dark R&B, atmospheric", HARMOR_SYTRUS),
    preset!("Drake", 85, minor(D), "R&B", "emotional", "Melodic rap, emotional", SYTRUS_HARMOR),
    preset!("SZA", 95, minor(C), "R&B", "introspective", "Alternative R&B, introspective", HARMOR_SYTRUS),
    preset!("Bryson Tiller", 90, minor(G), "R&B", "moody", "Trap-soul, moody", SYTRUS_HARMOR),
    preset!("Giveon", 88, minor(D), "R&B", "romantic", "Deep baritone, romantic", HARMOR),
    preset!("H.E.R.", 92, minor(A), "R&B", "soulful", "Guitar-driven, soulful", HARMOR_SYTRUS),
    // Hip Hop
    preset!("Kendrick Lamar", 120, minor(D), "Hip Hop", "conscious", "Conscious, storytelling", SYTRUS_HARMOR),
    preset!("J Cole", 90, minor(G), "Hip Hop", "thoughtful", "Thoughtful, melodic", SYTRUS_HARMOR),
    preset!("Nas", 92, minor(C), "Hip Hop", "lyrical", "Boom bap, lyrical", SYTRUS),
    preset!("Jay-Z", 95, minor(D), "Hip Hop", "classic", "Marcy Marquis style", SYTRUS),
    preset!("Kanye West", 130, minor(F), "Hip Hop", "soulful", "Chipmunk soul, production", SYTRUS_HARMOR),
    preset!("MF DOOM", 90, minor(A), "Hip Hop", "abstract", "Lo-fi hip hop, abstract beats", HARMOR),
    // Trance
    preset!("Armin van Buuren", 138, minor(A), "Trance", "uplifting", "Uplifting, big drops, soaring synths", SYTRUS_HARMOR),
    preset!("Tiesto", 136, minor(G), "Trance", "energetic", "EDM-Trance hybrid, big room", SYTRUS_HARMOR),
    preset!("Dash Berlin", 138, minor(C), "Trance", "emotional", "Emotional, melodic, big chords", HARMOR_SYTRUS),
    preset!("Paul van Dyk", 140, minor(B), "Trance", "euphoric", "Progressive, euphoric", SYTRUS_HARMOR),
    preset!("Gouryella", 140, minor(E), "Trance", "uplifting", "Classic uplift, massive reverb", HARMOR_SYTRUS),
    preset!("Orjan Nilsen", 138, minor(D), "Trance", "dark", "Dark trance, tech elements", SYTRUS),
    preset!("Aly & Fila", 138, minor(A), "Trance", "uplifting", "Egyptian trance", SYTRUS_HARMOR),
    // House
    preset!("David Guetta", 128, major(C), "House", "energetic", "Electro house, big drops", SYTRUS_HARMOR),
    preset!("Calvin Harris", 128, major(D), "House", "catchy", "Pop-house, catchy vocals", SYTRUS_HARMOR),
    preset!("Fisher", 124, minor(E), "House", "bass-heavy", "Tech house, bass-heavy", SYTRUS_FPC),
    preset!("Daft Punk", 123, minor(A), "House", "funky", "French house, funky, robot voices", HARMOR_SYTRUS),
    preset!("Diplo", 100, major(G), "House", "festival", "World house, festival", SYTRUS_HARMOR),
    preset!("Disclosure", 124, minor(F), "House", "deep", "UK garage, deep", HARMOR_SYTRUS),
    // Rock
    preset!("Pink Floyd", 120, minor(G), "Rock", "psychedelic", "Psychedelic, space rock, epic solos", &["Harmor", "GMS"]),
    preset!("Queen", 120, minor(B), "Rock", "anthem", "Rock anthems, operatic", SYTRUS_HARMOR),
    preset!("Metallica", 130, minor(E), "Rock", "heavy", "Heavy metal, thrash", SYTRUS),
    preset!("Nirvana", 120, minor(F), "Rock", "grunge", "Grunge, alternative", HARMOR),
    preset!("AC/DC", 130, minor(A), "Rock", "hard", "Hard rock, blues-based", SYTRUS),
    // EDM
    preset!("Deadmau5", 128, minor(F), "EDM", "progressive", "Progressive, glitchy, minimal", SYTRUS_HARMOR),
    preset!("Skrillex", 140, minor(D), "Dubstep", "heavy", "Dubstep, heavy bass, growls", SYTRUS),
    preset!("Excision", 140, minor(D), "Dubstep", "heavy", "Riddim, massive bass", SYTRUS),
    // Ambient
    preset!("Boards of Canada", 90, minor(C), "Ambient", "ambient", "Ambient, retro synths, nostalgic", HARMOR),
    preset!("Tycho", 100, major(D), "Ambient", "chill", "Chillwave, atmospheric", HARMOR),
    preset!("Brian Eno", 70, minor(E), "Ambient", "ambient", "Ambient pioneer", HARMOR),
    // Phonk
    preset!("Lost Boy", 140, minor(C), "Phonk", "aggressive", "Cowbell phonk", SYTRUS_FPC),
    preset!("South Phonk", 145, minor(G), "Phonk", "drift", "Drift phonk", SYTRUS_HARMOR),
    preset!("Yung Mal", 142, minor(F), "Phonk", "aggressive", "ATL phonk", SYTRUS),
    // Synthwave
    preset!("Gunship", 110, minor(E), "Synthwave", "dark", "Dark synthwave, retro", HARMOR_SYTRUS),
    preset!("Timecop1983", 105, minor(A), "Synthwave", "dreamy", "Retro synth, dreamy", HARMOR),
];
