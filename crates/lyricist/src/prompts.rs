//! Text-to-music prompt templates, one per genre family.
//!
//! Placeholders: `{genre} {bpm} {key} {mood} {instrument} {adlib}`.

use stemflo::Genre;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub template: &'static str,
    pub adlibs: &'static [&'static str],
}

pub const PROMPTS: [PromptTemplate; 7] = [
    PromptTemplate {
        name: "trap",
        template: "Dark {genre} beat, {bpm} BPM, {key}, {mood}, heavy 808s, {instrument} melody, crispy hi-hats, hard-hitting drums, {adlib}, synth lead, aggressive bass, modern {genre} production",
        adlibs: &["yeah", "uh", "gang", "flex", "hunnid"],
    },
    PromptTemplate {
        name: "rnb",
        template: "{genre} track, {bpm} BPM, {key}, {mood}, smooth {instrument} chords, soft drums, atmospheric pad, romantic melody, emotional vocals, soulful production",
        adlibs: &["baby", "oh", "love", "yeah"],
    },
    PromptTemplate {
        name: "hip_hop",
        template: "{genre} boom bap beat, {bpm} BPM, {key}, {mood}, classic drum pattern, dusty sample, {instrument} loop, bass-heavy, lyrical instrumental",
        adlibs: &["yeah", "uh", "bruh"],
    },
    PromptTemplate {
        name: "trance",
        template: "{genre} anthem, {bpm} BPM, {key}, {mood}, soaring synth lead, massive reverb, driving bass, uplifting arpeggio, euphoric buildup, huge drop, festival-ready",
        adlibs: &["rise", "go", "let it go"],
    },
    PromptTemplate {
        name: "house",
        template: "{genre} groove, {bpm} BPM, {key}, {mood}, four-on-the-floor kick, catchy synth hook, groovy bassline, energetic build, festival anthem",
        adlibs: &["yeah", "come on"],
    },
    PromptTemplate {
        name: "rock",
        template: "{genre} track, {bpm} BPM, {key}, {mood}, distorted guitar riff, powerful drums, anthemic chorus, raw energy, {instrument} driven",
        adlibs: &["yeah", "rock"],
    },
    PromptTemplate {
        name: "phonk",
        template: "{genre} beat, {bpm} BPM, {key}, {mood}, cowbell, heavy 808s, distorted hi-hats, Memphis style, {instrument} melody, aggressive, dark",
        adlibs: &["drift", "skrrt", "fuck"],
    },
];

/// Template for a genre; anything without its own template uses "trap".
pub fn for_genre(genre: &Genre) -> &'static PromptTemplate {
    let name = match genre {
        Genre::RnB => "rnb",
        Genre::HipHop => "hip_hop",
        Genre::Trance => "trance",
        Genre::House => "house",
        Genre::Rock => "rock",
        Genre::Phonk => "phonk",
        _ => "trap",
    };
    PROMPTS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&PROMPTS[0])
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct PromptFields<'a> {
    pub genre: &'a str,
    pub bpm: u16,
    pub key: &'a str,
    pub mood: &'a str,
    pub instrument: &'a str,
    pub adlib: &'a str,
}

impl PromptTemplate {
    pub fn render(&self, fields: &PromptFields<'_>) -> String {
        self.template
            .replace("{genre}", fields.genre)
            .replace("{bpm}", &fields.bpm.to_string())
            .replace("{key}", fields.key)
            .replace("{mood}", fields.mood)
            .replace("{instrument}", fields.instrument)
            .replace("{adlib}", fields.adlib)
    }
}
