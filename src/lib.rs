//! An experimental probabilistic grammar engine for musical phrases: classifies
//! symbolic MIDI events into tokens, parses them with weighted context-free
//! productions and re-synthesizes transformed variants of the recognized phrases.

pub mod note;
pub use note::Note;

pub mod lexeme;
pub use lexeme::{Interval, Lexeme, Rest, Tone};

pub mod lexer;
pub use lexer::{LexError, Lexer, Rule, Token};

pub mod grammar;
pub use grammar::{Contraction, Grammar, GrammarError, ProductionRule, Symbol};

pub mod parser;
pub use parser::{FailReason, ParseError, Parser, START_SYMBOL};

pub mod tree;
pub use tree::{Ast, SyntaxTree, TreeError, TreeNode};

pub mod transform;
pub use transform::{AstTransform, Pipeline};

pub mod annotate;
pub mod presets;

pub mod prelude;

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::prelude::*;

    fn tone(start: f64, note_number: u8) -> Lexeme {
        Lexeme::from(Tone::new(start, 250.0, note_number, 90).unwrap())
    }

    fn rest(start: f64) -> Lexeme {
        Lexeme::from(Rest::new(start, 250.0))
    }

    fn rhs(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| Symbol::from(*n)).collect()
    }

    /// Lex, parse, contract and serialize through the identity pipeline; the output
    /// must reproduce the input lexemes exactly (round-trip law).
    fn round_trip(lexer: &Lexer, parser: &mut Parser, lexemes: &[Lexeme]) -> Vec<Lexeme> {
        let tokens = lexer.run(lexemes).unwrap();
        let tree = parser.run(&tokens).unwrap();
        let ast = tree.to_ast().unwrap().unwrap();
        let mut pipeline = Pipeline::by_name("default", None).unwrap();
        let (_, output) = pipeline.run(&ast);
        output
    }

    #[test]
    fn tone_rest_sequence_round_trips() {
        // default tone/rest grammar over 3 tones and 2 rests in arbitrary order
        let lexer = presets::lexer("default").unwrap();
        let grammar = Grammar::from_rules(
            lexer.terminals(),
            vec![
                ProductionRule::new("S", 0.0, rhs(&["MORE"])),
                ProductionRule::new("MORE", 0.0, rhs(&["TOKEN", "MORE"])),
                ProductionRule::new("MORE", 0.0, rhs(&["TOKEN"])),
                ProductionRule::new("TOKEN", 0.0, rhs(&["tone"])),
                ProductionRule::new("TOKEN", 0.0, rhs(&["rest"])),
            ],
        )
        .unwrap();
        let mut parser = Parser::new(grammar).with_seed(17);

        let lexemes = vec![
            tone(0.0, 60),
            rest(250.0),
            tone(500.0, 64),
            tone(750.0, 67),
            rest(1000.0),
        ];
        assert_eq!(round_trip(&lexer, &mut parser, &lexemes), lexemes);
    }

    #[test]
    fn bab_grammar_contracts_into_three_groups() {
        // S -> B A B ; B -> b B | ε ; A -> a A | ε over [b, b, a, b]
        let lexer = Lexer::new(vec![
            Rule::new("b", |l: &Lexeme| {
                l.as_tone().map(|t| t.note.number() < 64).unwrap_or(false)
            }),
            Rule::new("a", Lexeme::is_tone),
        ]);
        let grammar = Grammar::from_rules(
            lexer.terminals(),
            vec![
                ProductionRule::new("S", 0.0, rhs(&["B", "A", "B"])),
                ProductionRule::new("B", 0.0, rhs(&["b", "B"])),
                ProductionRule::new("B", -1.0, rhs(&[""])),
                ProductionRule::new("A", 0.0, rhs(&["a", "A"])),
                ProductionRule::new("A", -1.0, rhs(&[""])),
            ],
        )
        .unwrap();
        let mut parser = Parser::new(grammar).with_seed(5);

        let lexemes = vec![tone(0.0, 60), tone(250.0, 62), tone(500.0, 70), tone(750.0, 61)];
        let tokens = lexer.run(&lexemes).unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "b", "a", "b"]);

        let tree = parser.run(&tokens).unwrap();
        let ast = tree.to_ast().unwrap().unwrap();

        // expect the flat grouping B(b b) A(a) B(b)
        let Ast::Node(root) = &ast else {
            panic!("expected a node");
        };
        let shape: Vec<(String, usize)> = root
            .children
            .iter()
            .map(|child| (child.label().to_string(), child.children().len()))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("B".to_string(), 2),
                ("A".to_string(), 1),
                ("B".to_string(), 1)
            ]
        );

        let flat = flatten(&ast);
        assert_eq!(flat, lexemes);
    }

    /// Custom contraction like the production tables attach: keep the node but
    /// annotate it with its transformed child count.
    fn count_children(node: &StNode) -> Result<Option<Ast>, TreeError> {
        let mut children = Vec::new();
        for child in &node.children {
            if let Some(ast) = child.to_ast()? {
                children.push(ast);
            }
        }
        Ok(Some(Ast::node(
            node.label.clone(),
            Some(AstValue::Count(children.len())),
            children,
        )))
    }

    #[test]
    fn custom_contractions_override_the_defaults() {
        let lexer = presets::lexer("default").unwrap();
        let grammar = Grammar::from_rules(
            lexer.terminals(),
            vec![
                ProductionRule::new("S", 0.0, rhs(&["tone", "S"]))
                    .with_contraction(Contraction::Custom(count_children)),
                ProductionRule::new("S", -1.0, rhs(&[""])),
            ],
        )
        .unwrap();
        let mut parser = Parser::new(grammar).with_seed(1);

        let lexemes = vec![tone(0.0, 60), tone(250.0, 62), tone(500.0, 64)];
        let tokens = lexer.run(&lexemes).unwrap();
        let ast = parser.run(&tokens).unwrap().to_ast().unwrap().unwrap();

        let Ast::Node(root) = &ast else {
            panic!("expected a node");
        };
        // leaf plus nested S node; the chain is kept, not contracted
        assert_eq!(root.value, Some(AstValue::Count(2)));
        assert_eq!(flatten(&ast), lexemes);
    }

    #[test]
    fn lexer_gap_aborts_the_whole_pipeline() {
        let lexer = presets::lexer("default").unwrap();
        let lexemes = vec![tone(0.0, 60), Lexeme::from(Interval::new(2)), tone(500.0, 62)];
        assert_eq!(
            lexer.run(&lexemes),
            Err(LexError::NoMatchingRule { index: 1 })
        );
    }

    #[test]
    fn intervallic_phrase_survives_cancer_twice() {
        // annotate a scale run into intervals, parse it, retrograde it twice and
        // expect the original tone line back
        let lexemes = vec![
            tone(0.0, 60),
            tone(250.0, 62),
            tone(500.0, 64),
            tone(750.0, 65),
        ];
        let intervals = derive_intervals(&lexemes).unwrap();

        let lexer = presets::lexer("intervallic").unwrap();
        let grammar = Grammar::from_rules(
            lexer.terminals(),
            presets::grammar_rules("monotone-intervallic").unwrap().to_vec(),
        )
        .unwrap();
        let mut parser = Parser::new(grammar).with_seed(2);

        let tokens = lexer.run(&intervals).unwrap();
        let tree = parser.run(&tokens).unwrap();
        let ast = tree.to_ast().unwrap().unwrap();

        let mut pipeline = Pipeline::by_name("scale-cancer", None).unwrap();
        let (retrograde, _) = pipeline.run(&ast);
        let (back, output) = pipeline.run(&retrograde);

        // cancer is an involution on the interval nodes
        assert_eq!(back, ast);

        let notes: Vec<u8> = output
            .iter()
            .filter_map(|l| l.as_tone().map(|t| t.note.number()))
            .collect();
        assert_eq!(notes, vec![60, 62, 64, 65]);
    }

    #[test]
    fn pipeline_output_feeds_visualization_untouched() {
        let lexer = presets::lexer("default").unwrap();
        let grammar = Grammar::from_rules(
            lexer.terminals(),
            presets::grammar_rules("rest-separated").unwrap().to_vec(),
        )
        .unwrap();
        let mut parser = Parser::new(grammar).with_seed(23);

        let lexemes = vec![tone(0.0, 60), tone(250.0, 62), rest(500.0), tone(750.0, 64)];
        let tokens = lexer.run(&lexemes).unwrap();
        let tree = parser.run(&tokens).unwrap();

        let before = tree.clone();
        let dot = to_dot(&tree, &|leaf: &SyntaxTree| leaf.label().to_string());
        assert!(dot.contains("graph G {"));
        assert_eq!(tree, before);

        // and the tree still serializes to the original sequence afterwards
        let ast = tree.to_ast().unwrap().unwrap();
        assert_eq!(flatten(&ast), lexemes);
    }
}
