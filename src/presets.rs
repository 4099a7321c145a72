//! Named lexer rule sets and grammar tables, as wired up by the surrounding
//! application's pipeline configuration.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::grammar::{ProductionRule, Symbol};
use crate::lexeme::Lexeme;
use crate::lexer::{Lexer, Rule};

// -------------------------------------------------------------------------------------------------

fn note_value(lexeme: &Lexeme) -> Option<f64> {
    lexeme.as_tone().and_then(|tone| tone.note_value)
}

/// Tones longer than a beat whose note value sits on the given meter.
fn beat_like_tone(meter: f64) -> impl Fn(&Lexeme) -> bool {
    move |lexeme| match note_value(lexeme) {
        Some(value) => value > 1.0 && (value % meter).round() == 0.0,
        None => false,
    }
}

fn interval_steps(lexeme: &Lexeme) -> Option<i32> {
    lexeme.as_interval().map(|i| i.half_tone_steps)
}

/// Look up a named lexer rule set. Rule order is part of the configuration:
/// specific predicates come before catch-alls.
pub fn lexer(name: &str) -> Option<Lexer> {
    let rules = match name {
        "default" => vec![
            Rule::new("tone", Lexeme::is_tone),
            Rule::new("rest", Lexeme::is_rest),
        ],
        "peaks" => vec![
            Rule::new("peak", |l: &Lexeme| {
                l.as_tone().map(|t| t.peak == Some(true)).unwrap_or(false)
            }),
            Rule::new("fill", |l: &Lexeme| {
                l.as_tone().map(|t| t.peak != Some(true)).unwrap_or(false)
            }),
            Rule::new("rest", Lexeme::is_rest),
        ],
        "beat-like" => vec![
            Rule::new("r", Lexeme::is_rest),
            Rule::new("3", beat_like_tone(3.0)),
            Rule::new("2", beat_like_tone(2.0)),
            Rule::new("1", |l: &Lexeme| note_value(l) == Some(1.0)),
            Rule::new("1/2", |l: &Lexeme| {
                note_value(l).map(|v| (v * 2.0 - 1.0).abs() < 0.001).unwrap_or(false)
            }),
            Rule::new("1/3", |l: &Lexeme| {
                note_value(l).map(|v| (v * 3.0 - 1.0).abs() < 0.001).unwrap_or(false)
            }),
            Rule::new("?", Lexeme::is_tone),
        ],
        "intervallic" => vec![
            Rule::new("unison", |l: &Lexeme| interval_steps(l) == Some(0)),
            Rule::new("scale-up", |l: &Lexeme| {
                matches!(interval_steps(l), Some(1..=2))
            }),
            Rule::new("scale-down", |l: &Lexeme| {
                matches!(interval_steps(l), Some(-2..=-1))
            }),
            Rule::new("arpeg-up", |l: &Lexeme| {
                matches!(interval_steps(l), Some(3..=7))
            }),
            Rule::new("arpeg-down", |l: &Lexeme| {
                matches!(interval_steps(l), Some(-7..=-3))
            }),
            Rule::new("jump-up", |l: &Lexeme| {
                matches!(interval_steps(l), Some(steps) if steps > 7)
            }),
            Rule::new("jump-down", |l: &Lexeme| {
                matches!(interval_steps(l), Some(steps) if steps < -7)
            }),
        ],
        _ => return None,
    };
    Some(Lexer::new(rules))
}

// -------------------------------------------------------------------------------------------------

fn prod(lhs: &str, weight: f32, rhs: &[&str]) -> ProductionRule {
    ProductionRule::new(lhs, weight, rhs.iter().map(|s| Symbol::from(*s)).collect())
}

lazy_static! {
    static ref GRAMMARS: HashMap<&'static str, Vec<ProductionRule>> = {
        let mut grammars = HashMap::new();

        grammars.insert(
            "default",
            vec![
                prod("S", 0.0, &["MORE"]),
                prod("MORE", 1.0, &["*", "MORE"]),
                prod("MORE", -1.0, &[""]),
            ],
        );

        grammars.insert(
            "rest-separated",
            vec![
                prod("S", 0.0, &["MORE"]),
                prod("MORE", 0.0, &["TONES", "rest", "MORE"]),
                prod("MORE", 0.0, &["TONES"]),
                prod("TONES", 0.0, &["tone", "TONES"]),
                prod("TONES", -1.0, &["tone"]),
            ],
        );

        grammars.insert(
            "vol-peak-seq",
            vec![
                prod("S", 0.0, &["MORE"]),
                prod("MORE", 0.0, &["TOKEN", "MORE"]),
                prod("MORE", 0.0, &["TOKEN"]),
                prod("TOKEN", 0.0, &["peak"]),
                prod("TOKEN", 0.0, &["fill"]),
                prod("TOKEN", 0.0, &["rest"]),
            ],
        );

        grammars.insert(
            "beat-like-seq",
            vec![
                prod("S", 0.0, &["MORE"]),
                prod("MORE", 0.0, &["TRIPLES", "MORE"]),
                prod("MORE", 0.0, &["TRIPLES"]),
                prod("MORE", 0.0, &["DOUBLES", "MORE"]),
                prod("MORE", 0.0, &["DOUBLES"]),
                prod("MORE", 0.0, &["SINGLES", "MORE"]),
                prod("MORE", 0.0, &["SINGLES"]),
                prod("MORE", 0.0, &["HALVES", "MORE"]),
                prod("MORE", 0.0, &["HALVES"]),
                prod("MORE", 0.0, &["THIRDS", "MORE"]),
                prod("MORE", 0.0, &["THIRDS"]),
                prod("MORE", 0.0, &["RESTS", "MORE"]),
                prod("MORE", 0.0, &["RESTS"]),
                prod("MORE", 0.0, &["UNKNOWN", "MORE"]),
                prod("MORE", 0.0, &["UNKNOWN"]),
                prod("TRIPLES", 0.0, &["3", "TRIPLES"]),
                prod("TRIPLES", 0.0, &["3"]),
                prod("DOUBLES", 0.0, &["2", "DOUBLES"]),
                prod("DOUBLES", 0.0, &["2"]),
                prod("SINGLES", 0.0, &["1", "SINGLES"]),
                prod("SINGLES", 0.0, &["1"]),
                prod("HALVES", 0.0, &["1/2", "HALVES"]),
                prod("HALVES", 0.0, &["1/2"]),
                prod("THIRDS", 0.0, &["1/3", "THIRDS"]),
                prod("THIRDS", 0.0, &["1/3"]),
                prod("RESTS", 0.0, &["r", "RESTS"]),
                prod("RESTS", 0.0, &["r"]),
                prod("UNKNOWN", 0.0, &["?", "UNKNOWN"]),
                prod("UNKNOWN", 0.0, &["?"]),
            ],
        );

        grammars.insert(
            "rhythmic-seq",
            vec![
                prod("S", 0.0, &["MORE"]),
                prod("S", 0.0, &["ANY", "MORE"]), // upbeat
                prod("MORE", 0.0, &["PAIR", "MORE"]),
                prod("MORE", 0.0, &["ANY", "MORE"]), // account for dirtily short tokens
                prod("MORE", 0.0, &["PAIR"]),
                prod("MORE", 0.0, &["ANY"]), // single one left
                prod("MORE", 0.0, &[""]), // avoid termination in any-any instead of pair(x)
                prod("PAIR", 0.0, &["STRAIGHT"]),
                prod("PAIR", 0.0, &["SWING"]),
                prod("STRAIGHT", 0.0, &["1", "1"]),
                prod("STRAIGHT", 0.0, &["1/2", "1/2"]),
                prod("SWING", 0.0, &["1", "1/2"]),
                prod("ANY", 0.0, &["r"]),
                prod("ANY", 0.0, &["3"]),
                prod("ANY", 0.0, &["2"]),
                prod("ANY", 0.0, &["1"]),
                prod("ANY", 0.0, &["1/2"]),
                prod("ANY", 0.0, &["1/3"]),
                prod("ANY", 0.0, &["?"]),
            ],
        );

        grammars.insert(
            "any-two-motives",
            vec![
                prod("S", 0.0, &["LEFT", "RIGHT"]),
                prod("LEFT", 5.0, &["*", "LEFT"]),
                prod("LEFT", 1.0, &[""]),
                prod("RIGHT", 1.0, &["*", "RIGHT"]),
                prod("RIGHT", -1.0, &[""]),
            ],
        );

        grammars.insert(
            "monotone-intervallic",
            vec![
                prod("S", 0.0, &["PHRASE"]),
                prod("PHRASE", 0.0, &["UNISO", "PHRASE"]),
                prod("PHRASE", 0.0, &["SCALE", "PHRASE"]),
                prod("PHRASE", 0.0, &["ARPEG", "PHRASE"]),
                prod("PHRASE", 0.0, &["JUMPS", "PHRASE"]),
                prod("PHRASE", -1.0, &[""]),
                prod("UNISO", 0.0, &["unison", "UNISO"]),
                prod("UNISO", -1.0, &["unison"]),
                prod("SCALE", 0.0, &["SCALEU"]),
                prod("SCALEU", 0.0, &["scale-up", "SCALEU"]),
                prod("SCALEU", -1.0, &["scale-up"]),
                prod("SCALE", 0.0, &["SCALED"]),
                prod("SCALED", 0.0, &["scale-down", "SCALED"]),
                prod("SCALED", -1.0, &["scale-down"]),
                prod("ARPEG", 0.0, &["ARPEGU"]),
                prod("ARPEGU", 0.0, &["arpeg-up", "ARPEGU"]),
                prod("ARPEGU", -1.0, &["arpeg-up"]),
                prod("ARPEG", 0.0, &["ARPEGD"]),
                prod("ARPEGD", 0.0, &["arpeg-down", "ARPEGD"]),
                prod("ARPEGD", -1.0, &["arpeg-down"]),
                prod("JUMPS", 0.0, &["JUMPSU"]),
                prod("JUMPSU", 0.0, &["jump-up", "JUMPSU"]),
                prod("JUMPSU", -1.0, &["jump-up"]),
                prod("JUMPS", 0.0, &["JUMPSD"]),
                prod("JUMPSD", 0.0, &["jump-down", "JUMPSD"]),
                prod("JUMPSD", -1.0, &["jump-down"]),
            ],
        );

        grammars.insert(
            "intervallic",
            vec![
                prod("S", 0.0, &["PHRASE"]),
                prod("PHRASE", 2.0, &["UNISO", "PHRASE"]),
                prod("PHRASE", 2.0, &["SCALE", "PHRASE"]),
                prod("PHRASE", 2.0, &["ARPEG", "PHRASE"]),
                prod("PHRASE", 2.0, &["JUMPS", "PHRASE"]),
                prod("PHRASE", -1.0, &[""]),
                prod("UNISO", 0.0, &["unison", "UNISO"]),
                prod("UNISO", -1.0, &["unison"]),
                prod("SCALE", 0.0, &["scale-up", "SCALE"]),
                prod("SCALE", 0.0, &["scale-down", "SCALE"]),
                prod("SCALE", -1.0, &["scale-up"]),
                prod("SCALE", -1.0, &["scale-down"]),
                prod("ARPEG", 0.0, &["arpeg-up", "ARPEG"]),
                prod("ARPEG", 0.0, &["arpeg-down", "ARPEG"]),
                prod("ARPEG", -1.0, &["arpeg-up"]),
                prod("ARPEG", -1.0, &["arpeg-down"]),
                prod("JUMPS", 0.0, &["jump-up", "JUMPS"]),
                prod("JUMPS", 0.0, &["jump-down", "JUMPS"]),
                prod("JUMPS", -1.0, &["jump-up"]),
                prod("JUMPS", -1.0, &["jump-down"]),
            ],
        );

        grammars
    };
}

/// Look up a named production table. Feed it to
/// [`Grammar::from_rules`](crate::Grammar::from_rules) together with the matching
/// lexer's terminals.
pub fn grammar_rules(name: &str) -> Option<&'static [ProductionRule]> {
    GRAMMARS.get(name).map(Vec::as_slice)
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::{grammar_rules, lexer};
    use crate::grammar::Grammar;
    use crate::lexeme::{Lexeme, Rest, Tone};

    #[test]
    fn unknown_names() {
        assert!(lexer("no-such-lexer").is_none());
        assert!(grammar_rules("no-such-grammar").is_none());
    }

    #[test]
    fn grammars_validate_against_their_lexers() {
        // each grammar must only reference terminals its lexer can produce
        for (lexer_name, grammar_names) in [
            ("default", vec!["default", "rest-separated", "any-two-motives"]),
            ("peaks", vec!["vol-peak-seq"]),
            ("beat-like", vec!["beat-like-seq", "rhythmic-seq"]),
            ("intervallic", vec!["monotone-intervallic", "intervallic"]),
        ] {
            let terminals = lexer(lexer_name).unwrap().terminals();
            for grammar_name in grammar_names {
                let rules = grammar_rules(grammar_name).unwrap().to_vec();
                assert!(
                    Grammar::from_rules(terminals.clone(), rules).is_ok(),
                    "grammar '{}' does not fit lexer '{}'",
                    grammar_name,
                    lexer_name
                );
            }
        }
    }

    #[test]
    fn beat_like_rules_classify_note_values() {
        let lexer = lexer("beat-like").unwrap();
        let mut tone = Tone::new(0.0, 500.0, 60, 90).unwrap();
        tone.note_value = Some(2.0);
        let mut half = Tone::new(0.0, 250.0, 62, 90).unwrap();
        half.note_value = Some(0.5);
        let lexemes = vec![
            Lexeme::from(tone),
            Lexeme::from(half),
            Lexeme::from(Rest::new(0.0, 500.0)),
        ];
        let names: Vec<String> = lexer
            .run(&lexemes)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["2", "1/2", "r"]);
    }
}
