//! Swaps overused lyric words for more concrete ones.

use rand::Rng;

/// Words flagged as clichés. Only some have replacements.
pub const CLICHE_WORDS: [&str; 24] = [
    "universe", "galaxy", "stars", "shine", "glow", "dream", "fantasy", "paradise", "heaven",
    "angel", "wings", "fly", "soar", "sky", "beyond", "infinity", "forever", "neverending",
    "magic", "miracle", "heartbeat", "soul", "neon", "vibes",
];

const ALTERNATIVES: [(&str, &[&str]); 16] = [
    ("universe", &["block", "hood", "streets", "world"]),
    ("galaxy", &["streets", "blocks", "trap"]),
    ("stars", &["guap", "bands", "racks", "cash"]),
    ("shine", &["grind", "hustle", "ball"]),
    ("glow", &["flex", "show", "stack"]),
    ("dream", &["scheme", "goal", "bag"]),
    ("fantasy", &["real life", "hustle"]),
    ("paradise", &["my house", "the trap"]),
    ("heaven", &["trap house", "studio"]),
    ("angel", &["shorty", "queen"]),
    ("wings", &["racks", "bands"]),
    ("fly", &["rich", "ball", "flex"]),
    ("soar", &["stack", "hustle"]),
    ("sky", &["roof", "top"]),
    ("magic", &["real", "true"]),
    ("neon", &["diamonds", "racks"]),
];

pub fn alternatives(word: &str) -> Option<&'static [&'static str]> {
    ALTERNATIVES
        .iter()
        .find(|(cliche, _)| *cliche == word)
        .map(|(_, alts)| *alts)
}

/// Cliché words present in `text`, in order of appearance.
pub fn cliches_in(text: &str) -> Vec<&'static str> {
    text.split_whitespace()
        .filter_map(|token| {
            let word = core_word(token).to_ascii_lowercase();
            CLICHE_WORDS.iter().copied().find(|c| *c == word)
        })
        .collect()
}

/// Replace every cliché that has alternatives. Surrounding punctuation and
/// capitalization are kept; whitespace is normalized per line.
pub fn filter_cliches<R: Rng>(text: &str, rng: &mut R) -> String {
    text.lines()
        .map(|line| {
            line.split_whitespace()
                .map(|token| replace_token(token, rng))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn replace_token<R: Rng>(token: &str, rng: &mut R) -> String {
    let word = core_word(token);
    let Some(alts) = alternatives(&word.to_ascii_lowercase()) else {
        return token.to_string();
    };
    let pick = alts[rng.gen_range(0..alts.len())];

    let replacement = if word.len() > 1 && word.chars().all(|c| c.is_ascii_uppercase()) {
        pick.to_ascii_uppercase()
    } else if word.starts_with(|c: char| c.is_ascii_uppercase()) {
        capitalize(pick)
    } else {
        pick.to_string()
    };

    let start = token.find(word).unwrap_or(0);
    format!(
        "{}{}{}",
        &token[..start],
        replacement,
        &token[start + word.len()..]
    )
}

/// The alphabetic core of a token, without leading/trailing punctuation.
fn core_word(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn finds_cliches() {
        assert_eq!(
            cliches_in("Reach for the stars, my Angel, forever"),
            vec!["stars", "angel", "forever"]
        );
        assert!(cliches_in("Stack paper, that's the mission").is_empty());
    }

    #[test]
    fn replaces_and_keeps_punctuation() {
        let mut rng = Pcg32::seed_from_u64(1);
        let out = filter_cliches("Reach for the stars, Angel!", &mut rng);
        assert!(out.starts_with("Reach for the "));
        assert!(out.ends_with('!'));
        assert!(cliches_in(&out).is_empty());
        assert!(out.contains(", "));
    }

    #[test]
    fn words_without_alternatives_stay() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(filter_cliches("forever and ever", &mut rng), "forever and ever");
    }

    #[test]
    fn shouting_stays_shouting() {
        let mut rng = Pcg32::seed_from_u64(3);
        let out = filter_cliches("LIVING THE DREAM", &mut rng);
        let last = out.rsplit(' ').next().unwrap();
        assert!(["SCHEME", "GOAL", "BAG"].contains(&last));
    }

    #[test]
    fn every_alternative_is_a_known_cliche() {
        for (cliche, alts) in ALTERNATIVES {
            assert!(CLICHE_WORDS.contains(&cliche));
            assert!(!alts.is_empty());
        }
    }
}
