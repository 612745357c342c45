use tss::parser::{Declaration, Parser, Variables, parse_stylesheet};
use tss::types::{BorderEdge, BorderKind, Display, Edge, RgbaColor, Scalar, Spacing, Unit};
use tss::{ParseError, ParseErrorKind};

fn parse_err(source: &str) -> ParseError {
    parse_stylesheet(source).expect_err("stylesheet should be rejected")
}

#[test]
fn test_declarations_are_typed() {
    let sheet = parse_stylesheet(
        r#"
        Panel {
            color: #ff000080;
            background: rgb(0, 0, 255);
            width: 50%;
            height: 10vh;
            min-width: auto;
            margin: 1 2 3;
            border: 2 dashed white;
            display: flex;
            opacity: 40%;
        }
        "#,
    )
    .unwrap();

    let block = sheet.find_block("panel").unwrap();
    assert_eq!(
        block.declarations,
        vec![
            Declaration::Color(RgbaColor::rgba(255, 0, 0, 128.0 / 255.0)),
            Declaration::Background(RgbaColor::rgb(0, 0, 255)),
            Declaration::Width(Scalar::percent(50.0)),
            Declaration::Height(Scalar {
                value: 10.0,
                unit: Unit::ViewHeight
            }),
            Declaration::MinWidth(Scalar::AUTO),
            Declaration::Margin(Spacing {
                top: Scalar::points(1.0),
                right: Scalar::points(2.0),
                bottom: Scalar::points(3.0),
                left: Scalar::points(2.0),
            }),
            Declaration::Border(BorderEdge::new(
                BorderKind::Dashed,
                2.0,
                Some(RgbaColor::white())
            )),
            Declaration::Display(Display::Flex),
            Declaration::Opacity(0.4),
        ]
    );
}

#[test]
fn test_last_declaration_wins_within_a_block() {
    let sheet = parse_stylesheet(
        "Label { color: red; background: blue; background-color: green; color: white; }",
    )
    .unwrap();
    let block = sheet.find_block("label").unwrap();
    assert_eq!(
        block.declarations,
        vec![
            Declaration::Background(RgbaColor::rgb(0, 128, 0)),
            Declaration::Color(RgbaColor::white()),
        ]
    );
    assert_eq!(block.styles.color, Some(RgbaColor::white()));
}

#[test]
fn test_edge_longhands_override_shorthand_sides() {
    let sheet = parse_stylesheet("Box { padding: 1; padding-left: 4; border-top: double red; }").unwrap();
    let styles = &sheet.find_block("box").unwrap().styles;
    assert_eq!(styles.padding[Edge::Top as usize], Some(Scalar::points(1.0)));
    assert_eq!(styles.padding[Edge::Left as usize], Some(Scalar::points(4.0)));
    let top = styles.border[Edge::Top as usize].unwrap();
    assert_eq!(top.kind, BorderKind::Double);
    assert_eq!(styles.border[Edge::Bottom as usize], None);
}

#[test]
fn test_unknown_properties_are_kept_but_ignored() {
    let sheet = parse_stylesheet("Label { tint: red 50%; color: blue; }").unwrap();
    let block = sheet.find_block("label").unwrap();
    assert_eq!(
        block.declarations[0],
        Declaration::Unknown {
            name: "tint".into(),
            value: "red 50%".into()
        }
    );
    assert_eq!(block.styles.color, Some(RgbaColor::rgb(0, 0, 255)));
}

#[test]
fn test_important_is_accepted() {
    let sheet = parse_stylesheet("Label { color: red !important; }").unwrap();
    assert_eq!(
        sheet.find_block("label").unwrap().styles.color,
        Some(RgbaColor::rgb(255, 0, 0))
    );
}

#[test]
fn test_empty_blocks_are_dropped() {
    let sheet = parse_stylesheet("Empty { } Outer { Inner { } } Kept { color: red; }").unwrap();
    assert_eq!(sheet.block_count(), 1);
    assert!(sheet.find_block("kept").is_some());
}

#[test]
fn test_blocks_record_file_and_line() {
    let sheet = parse_stylesheet("\n\nLabel {\n  color: red;\n}\n").unwrap();
    let block = sheet.find_block("label").unwrap();
    assert_eq!(block.file, "<string>");
    assert_eq!(block.line, 3);
}

#[test]
fn test_load_order_follows_source_order() {
    let sheet = parse_stylesheet("A { color: red; } B { color: red; C { color: red; } }").unwrap();
    let orders: Vec<u64> = sheet.blocks().map(|block| block.load_order).collect();
    assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));

    let later = parse_stylesheet("D { color: red; }").unwrap();
    assert!(later.blocks().next().unwrap().load_order > orders[2]);
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_comments_are_stripped() {
    let sheet = parse_stylesheet(
        r#"
        /* header comment */
        Label {
            // line comment
            color: /* inline */ red;
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        sheet.find_block("label").unwrap().styles.color,
        Some(RgbaColor::rgb(255, 0, 0))
    );
}

#[test]
fn test_comments_keep_line_numbers() {
    let err = parse_err("/* one\n two\n three */\nLabel {\n  color: nope;\n}");
    assert_eq!(err.line, 5);
    assert!(matches!(err.kind, ParseErrorKind::InvalidValue { .. }));
}

#[test]
fn test_comment_markers_inside_strings_and_after_colon() {
    let sheet = parse_stylesheet(
        "Label { font-family: \"/* not a comment */\"; animation-name: fade; }",
    )
    .unwrap();
    let block = sheet.find_block("label").unwrap();
    assert_eq!(block.styles.font_family.as_deref(), Some("/* not a comment */"));
    assert_eq!(block.styles.animation_name.as_deref(), Some("fade"));
}

#[test]
fn test_unterminated_comment() {
    let err = parse_err("Label { color: red; }\n/* never closed\n");
    assert!(matches!(err.kind, ParseErrorKind::UnterminatedComment));
    assert_eq!(err.line, 2);
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn test_variables_substitute_in_values_and_definitions() {
    let sheet = parse_stylesheet(
        r#"
        $base: #102030;
        $accent: $base;
        $gap: 2;
        Panel { background: $accent; margin: $gap 1; }
        "#,
    )
    .unwrap();
    let styles = &sheet.find_block("panel").unwrap().styles;
    assert_eq!(styles.background, Some(RgbaColor::rgb(0x10, 0x20, 0x30)));
    assert_eq!(styles.margin[Edge::Top as usize], Some(Scalar::points(2.0)));
    assert_eq!(sheet.variables.get("accent"), Some("#102030"));
}

#[test]
fn test_default_only_applies_when_unset() {
    let mut seeded = Variables::new();
    seeded.define("accent", "blue");
    let source = "$accent: red !default; $muted: gray !default; Label { color: $accent; }";

    let sheet = Parser::new().parse(source, "theme.tss", &seeded).unwrap();
    assert_eq!(
        sheet.find_block("label").unwrap().styles.color,
        Some(RgbaColor::rgb(0, 0, 255))
    );
    assert_eq!(sheet.variables.get("muted"), Some("gray"));

    let unseeded = parse_stylesheet(source).unwrap();
    assert_eq!(
        unseeded.find_block("label").unwrap().styles.color,
        Some(RgbaColor::rgb(255, 0, 0))
    );
}

#[test]
fn test_undefined_variable() {
    let err = parse_err("Label {\n  color: $missing;\n}");
    assert!(matches!(err.kind, ParseErrorKind::UnknownVariable(ref name) if name == "missing"));
    assert_eq!(err.line, 2);
}

// ============================================================================
// Keyframes
// ============================================================================

#[test]
fn test_keyframes_are_sorted_and_merged() {
    let sheet = parse_stylesheet(
        r#"
        @keyframes pulse {
            to { opacity: 1; }
            0%, 50% { opacity: 0; }
            from { color: red; }
        }
        Label { animation-name: pulse; animation-duration: 1.5s; }
        "#,
    )
    .unwrap();

    let pulse = sheet.keyframes("pulse").unwrap();
    let offsets: Vec<f32> = pulse.frames.iter().map(|frame| frame.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.5, 1.0]);

    let start = pulse.frame_at(0.0).unwrap();
    assert_eq!(start.styles.opacity, Some(0.0));
    assert_eq!(start.styles.color, Some(RgbaColor::rgb(255, 0, 0)));

    let label = sheet.find_block("label").unwrap();
    assert_eq!(label.styles.animation_duration, Some(1.5));
    assert_eq!(sheet.block_count(), 1);
}

#[test]
fn test_keyframes_offsets_are_validated() {
    let err = parse_err("@keyframes bad {\n  150% { opacity: 1; }\n}");
    assert!(matches!(err.kind, ParseErrorKind::InvalidValue { .. }));
    assert_eq!(err.line, 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_kinds_and_lines() {
    let cases: [(&str, usize, fn(&ParseErrorKind) -> bool); 8] = [
        ("Label {\n  color: red;\n", 1, |k| {
            matches!(k, ParseErrorKind::UnterminatedBlock)
        }),
        ("\nLabel:glow { color: red; }", 2, |k| {
            matches!(k, ParseErrorKind::UnknownPseudoClass(_))
        }),
        ("Label > > Button { color: red; }", 1, |k| {
            matches!(k, ParseErrorKind::MalformedSelector { .. })
        }),
        ("\n\n@media screen { Label { color: red; } }", 3, |k| {
            matches!(k, ParseErrorKind::UnknownAtRule(name) if name == "media")
        }),
        ("Label {\n  width: lots;\n}", 2, |k| {
            matches!(k, ParseErrorKind::InvalidValue { property, .. } if property == "width")
        }),
        ("color: red;", 1, |k| matches!(k, ParseErrorKind::InvalidSyntax(_))),
        ("Label { color: red; }\n}", 2, |k| {
            matches!(k, ParseErrorKind::InvalidSyntax(_))
        }),
        ("& { color: red; }", 1, |k| {
            matches!(k, ParseErrorKind::MalformedSelector { .. })
        }),
    ];

    for (source, line, check) in cases {
        let err = parse_err(source);
        assert_eq!(err.line, line, "wrong line for {source:?}: {err}");
        assert!(check(&err.kind), "wrong kind for {source:?}: {err}");
        assert_eq!(err.file, "<string>");
    }
}

#[test]
fn test_error_display_includes_location() {
    let err = Parser::new()
        .parse("Label {\n  color: $nope;\n}", "app.tss", &Variables::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "app.tss:2: unknown variable `$nope`");
}
