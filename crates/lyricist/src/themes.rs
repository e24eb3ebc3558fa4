//! Lyric themes: a mood and a pool of eight lines to draw from.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub topics: &'static [&'static str],
    pub mood: &'static str,
    pub lines: [&'static str; 8],
}

pub const THEMES: [Theme; 6] = [
    Theme {
        name: "flex",
        topics: &["money", "success", "status", "power", "luxury"],
        mood: "aggressive, confident",
        lines: [
            "Started from the bottom, now I'm here",
            "They don't know the struggle, but they know the fame",
            "Bank account look different, it's a different view",
            "I was down bad, now I'm counting bands",
            "Flex on 'em, they can't do what I do",
            "Got my money right, never second guess",
            "From the trap to the top, that's success",
            "Real ones stayed, fake ones left",
        ],
    },
    Theme {
        name: "struggle",
        topics: &["hardship", "grind", "pain", "growth", "triumph"],
        mood: "emotional, reflective",
        lines: [
            "Came from nothing, had to fight to get this",
            "They didn't believe, now they can't deny",
            "Late nights grinding while they were sleeping",
            "Pain made me stronger, now I'm reaping",
            "Started with nothing but a dream and drive",
            "Every scar on my back, I wear with pride",
            "From the mud to the top, I survived",
            "They tried to break me, now I'm elevated",
        ],
    },
    Theme {
        name: "love",
        topics: &["romance", "lust", "heartbreak", "devotion"],
        mood: "romantic, emotional",
        lines: [
            "You're the one I need, can't let you go",
            "Late nights thinking 'bout you, I can't sleep",
            "Heart full of love, but it been hurt before",
            "You my ride or die, that's for sure",
            "Never thought I'd find love like this",
            "With you I found what I been missing",
            "Baby you're my everything",
            "We meant to be, that's what I believe",
        ],
    },
    Theme {
        name: "hustle",
        topics: &["work", "grind", "ambition", "goals"],
        mood: "motivational, driven",
        lines: [
            "Wake up early, go to work, that's the grind",
            "Stack paper, that's the mission",
            "No days off, that's the vision",
            "Hustle hard, never stop",
            "Got my eyes on the prize, won't stop",
            "Working twice as hard to get ahead",
            "They don't know the hours I put in",
            "Grind never stops, that's how I live",
        ],
    },
    Theme {
        name: "party",
        topics: &["celebration", "vibes", "turn up"],
        mood: "energetic, fun",
        lines: [
            "Tonight we turning up, no sleep",
            "DJ play my song, let me hear it bump",
            "Shots coming fast, we about to drunk",
            "Party don't stop, that's how we funk",
            "In the club with my squad, we lit",
            "Celebrating every win, that's it",
            "Turn the music up, let it bump",
            "We don't quit, we just jump",
        ],
    },
    Theme {
        name: "street",
        topics: &["reality", "block", "survival", "loyalty"],
        mood: "raw, honest",
        lines: [
            "On my block, that's where I'm from",
            "Real ones know, fake ones don't",
            "The struggle real, can't fake that",
            "Block taught me how to get bread",
            "Streets talk, I listen, I learned",
            "Real is rare, fake is common",
            "From the block to the check",
            "This the life, no pretending",
        ],
    },
];

/// Look up a theme by name, falling back to "flex".
pub fn theme(name: &str) -> &'static Theme {
    let wanted = name.trim().to_ascii_lowercase();
    THEMES
        .iter()
        .find(|t| t.name == wanted)
        .unwrap_or(&THEMES[0])
}
