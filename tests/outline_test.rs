//! Integration tests for outline inference over synthetic documents.

use pdfoutline::{
    infer_outline, BBox, HeadingLevel, InferenceConfig, OutlineEngine, TextRun,
};

const BODY: &str = "Ordinary paragraph text that carries most of the characters here.";

fn run(text: &str, size: f32, bold: bool, page: u32, y: f32) -> TextRun {
    TextRun::new(
        text,
        if bold { "Helvetica-Bold" } else { "Helvetica" },
        size,
        bold,
        BBox::new(72.0, y, 72.0 + text.len() as f32 * size * 0.45, y + size),
        page,
    )
}

fn body(page: u32, from_y: f32, count: usize) -> Vec<TextRun> {
    (0..count)
        .map(|i| run(BODY, 11.0, false, page, from_y + i as f32 * 15.0))
        .collect()
}

/// Page 1: 24pt title over a 12pt paragraph. Page 2: 16pt bold numbered
/// heading over an 11pt paragraph.
fn annual_report() -> Vec<TextRun> {
    let mut runs = vec![
        run("Annual Report", 24.0, true, 1, 72.0),
        run(BODY, 12.0, false, 1, 120.0),
        run("1. Introduction", 16.0, true, 2, 72.0),
    ];
    runs.extend(body(2, 100.0, 3));
    runs
}

// ==================== Scenario Tests ====================

#[test]
fn test_annual_report_outline() {
    let outline = infer_outline(&annual_report(), &InferenceConfig::default()).unwrap();

    assert_eq!(outline.title_text(), Some("Annual Report"));
    assert_eq!(outline.headings.len(), 1);
    assert_eq!(outline.headings[0].level, HeadingLevel::H1);
    assert_eq!(outline.headings[0].text, "1. Introduction");
    assert_eq!(outline.headings[0].page, 2);
}

#[test]
fn test_annual_report_json() {
    let outline = infer_outline(&annual_report(), &InferenceConfig::default()).unwrap();
    let json = serde_json::to_value(&outline).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "title": "Annual Report",
            "outline": [{"level": "H1", "text": "1. Introduction", "page": 2}]
        })
    );
}

#[test]
fn test_shouted_body_line_is_rejected() {
    let shouted = "THIS IS SHOUTED BODY TEXT THAT GOES ON FOR FIFTEEN WORDS WITHOUT EVER BEING A HEADING.";
    let mut runs = annual_report();
    runs.push(run(shouted, 11.0, false, 2, 160.0));

    let diagnostics = OutlineEngine::new(InferenceConfig::default())
        .diagnose(&runs)
        .unwrap();
    let line = diagnostics
        .lines
        .iter()
        .find(|d| d.line.text == shouted)
        .unwrap();
    assert_eq!(line.evaluation.rejected_by, Some("body_paragraph"));
    assert!(!line.accepted);

    let outline = infer_outline(&runs, &InferenceConfig::default()).unwrap();
    assert!(outline.headings.iter().all(|h| h.text != shouted));
}

fn confidential_document() -> Vec<TextRun> {
    let mut runs = vec![
        run("Quarterly Review", 24.0, true, 1, 72.0),
        run(BODY, 11.0, false, 1, 120.0),
    ];
    let headings = ["1. Introduction", "2. Methods", "3. Results"];
    for (page, heading) in (2..=4).zip(headings) {
        runs.push(run(&format!("Confidential — Page {}", page), 14.0, true, page, 30.0));
        runs.push(run(heading, 16.0, true, page, 72.0));
        runs.extend(body(page, 100.0, 3));
    }
    runs
}

#[test]
fn test_running_header_is_excluded() {
    let outline = infer_outline(&confidential_document(), &InferenceConfig::default()).unwrap();

    let texts: Vec<&str> = outline.headings.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["1. Introduction", "2. Methods", "3. Results"]);
    assert!(outline.headings.iter().all(|h| h.level == HeadingLevel::H1));
}

#[test]
fn test_running_header_rejection_rule() {
    let diagnostics = OutlineEngine::new(InferenceConfig::default())
        .diagnose(&confidential_document())
        .unwrap();

    let headers: Vec<_> = diagnostics
        .lines
        .iter()
        .filter(|d| d.line.text.starts_with("Confidential"))
        .collect();
    assert_eq!(headers.len(), 3);
    for header in headers {
        assert_eq!(header.evaluation.rejected_by, Some("running_header"));
        assert!(header.evaluation.score >= 3.0);
    }
}

#[test]
fn test_header_on_two_pages_is_not_running() {
    let config = InferenceConfig::default().with_repeat_min_pages(4);
    let outline = infer_outline(&confidential_document(), &config).unwrap();
    assert!(outline
        .headings
        .iter()
        .any(|h| h.text.starts_with("Confidential")));
}

#[test]
fn test_numbered_chapters_at_same_position_are_kept() {
    let mut runs = vec![
        run("Handbook", 28.0, true, 1, 60.0),
        run(BODY, 11.0, false, 1, 120.0),
    ];
    for page in 2..=4 {
        runs.push(run(&format!("Chapter {}", page - 1), 20.0, true, page, 72.0));
        runs.extend(body(page, 110.0, 3));
        runs.push(run(&format!("Page {} of 4", page), 14.0, true, page, 760.0));
    }

    let outline = infer_outline(&runs, &InferenceConfig::default()).unwrap();
    let texts: Vec<&str> = outline.headings.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
    assert!(outline.headings.iter().all(|h| h.level == HeadingLevel::H1));
}

#[test]
fn test_nested_levels_follow_size() {
    let mut runs = vec![run("Field Guide", 28.0, true, 1, 60.0)];
    runs.extend(body(1, 120.0, 2));
    runs.push(run("Chapter One", 20.0, true, 2, 60.0));
    runs.push(run("1.1 Scope", 16.0, true, 2, 100.0));
    runs.extend(body(2, 130.0, 4));
    runs.push(run("1.2 Audience", 16.0, true, 3, 60.0));
    runs.extend(body(3, 90.0, 4));

    let outline = infer_outline(&runs, &InferenceConfig::default()).unwrap();
    let levels: Vec<(&str, HeadingLevel)> = outline
        .headings
        .iter()
        .map(|h| (h.text.as_str(), h.level))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("Chapter One", HeadingLevel::H1),
            ("1.1 Scope", HeadingLevel::H2),
            ("1.2 Audience", HeadingLevel::H2),
        ]
    );
}

#[test]
fn test_single_size_document_has_no_headings() {
    let mut runs = vec![run("Plain Memo", 11.0, false, 1, 60.0)];
    runs.extend(body(1, 90.0, 5));
    runs.push(run("Next Steps", 11.0, false, 2, 60.0));
    runs.extend(body(2, 90.0, 5));

    let outline = infer_outline(&runs, &InferenceConfig::default()).unwrap();
    assert!(outline.headings.is_empty());
}

// ==================== Threshold Sweeps ====================

#[test]
fn test_score_threshold_sweep() {
    for threshold in [1.5_f32, 2.0, 2.5, 3.0, 3.5, 4.0, 5.0, 6.0] {
        let config = InferenceConfig::default().with_score_threshold(threshold);
        let outline = infer_outline(&annual_report(), &config).unwrap();
        assert_eq!(
            outline.headings.len(),
            1,
            "threshold {} changed the heading count",
            threshold
        );
        assert_eq!(outline.headings[0].text, "1. Introduction");
    }
}

#[test]
fn test_short_line_ratio_sweep() {
    for ratio in [0.5_f32, 0.6, 0.75, 0.9, 1.0] {
        let config = InferenceConfig::default().with_short_line_ratio(ratio);
        let outline = infer_outline(&confidential_document(), &config).unwrap();
        assert_eq!(outline.headings.len(), 3, "short line ratio {}", ratio);
        assert_eq!(outline.title_text(), Some("Quarterly Review"));
    }
}

#[test]
fn test_long_line_words_sweep() {
    let shouted = "THIS IS SHOUTED BODY TEXT THAT GOES ON FOR FIFTEEN WORDS WITHOUT EVER BEING A HEADING.";
    let mut runs = annual_report();
    runs.push(run(shouted, 11.0, false, 2, 160.0));

    for words in 8..=14 {
        let config = InferenceConfig::default().with_long_line_words(words);
        let diagnostics = OutlineEngine::new(config).diagnose(&runs).unwrap();
        let line = diagnostics
            .lines
            .iter()
            .find(|d| d.line.text == shouted)
            .unwrap();
        assert_eq!(
            line.evaluation.rejected_by,
            Some("body_paragraph"),
            "long line words {}",
            words
        );
    }
}

#[test]
fn test_unreachable_threshold_leaves_only_title() {
    let config = InferenceConfig::default().with_score_threshold(100.0);
    let outline = infer_outline(&annual_report(), &config).unwrap();
    assert!(outline.headings.is_empty());
    assert_eq!(outline.title_text(), Some("Annual Report"));
}
