use changelog::parser::Parser;
use changelog::{Changelog, ChangelogError, EmptySectionPolicy, Extraction, Release, extract_release};

const CHANGELOG: &str = "\
## Unreleased
- Fixed bug A
- Added feature B

## 1.0.0
- Initial release
";

fn parse(source: &str) -> Changelog {
    Parser::new(source, 0).parse().expect("parse failed")
}

fn release(s: &str) -> Release {
    s.parse().unwrap()
}

fn entries(source: &str, selector: &str) -> String {
    match extract_release(&parse(source), &release(selector), EmptySectionPolicy::Lenient) {
        Ok(Extraction::Entries(entries)) => entries,
        other => panic!("expected entries for {selector:?}, got {other:?}"),
    }
}

#[test]
fn default_selector_returns_unreleased_entries() {
    let result = extract_release(&parse(CHANGELOG), &Release::default(), EmptySectionPolicy::Lenient);
    assert_eq!(
        result.unwrap(),
        Extraction::Entries("- Fixed bug A\n- Added feature B".to_string())
    );
}

#[test]
fn named_release() {
    assert_eq!(entries(CHANGELOG, "1.0.0"), "- Initial release");
}

#[test]
fn latest_skips_unreleased() {
    assert_eq!(entries(CHANGELOG, "latest"), "- Initial release");
    assert_eq!(entries(CHANGELOG, "LATEST"), "- Initial release");
}

#[test]
fn unknown_release_is_section_not_found() {
    let err = extract_release(&parse(CHANGELOG), &release("2.0.0"), EmptySectionPolicy::Lenient)
        .unwrap_err();
    match &err {
        ChangelogError::SectionNotFound { release, available } => {
            assert_eq!(release, &Release::Named("2.0.0".to_string()));
            assert_eq!(available, &vec!["Unreleased".to_string(), "1.0.0".to_string()]);
        }
        other => panic!("expected SectionNotFound, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Changelog does not contain '2.0.0' section");
}

#[test]
fn section_not_found_ignores_lists_elsewhere() {
    let source = "# Changelog\n- stray list\n\n### Unreleased\n- level three\n";
    let err = extract_release(&parse(source), &Release::Unreleased, EmptySectionPolicy::Lenient)
        .unwrap_err();
    assert!(matches!(err, ChangelogError::SectionNotFound { .. }));
}

#[test]
fn heading_match_is_case_insensitive() {
    for selector in ["unreleased", "UNRELEASED", "Unreleased"] {
        assert_eq!(entries(CHANGELOG, selector), "- Fixed bug A\n- Added feature B");
    }
    assert_eq!(entries("## UNRELEASED\n- shout\n", "unreleased"), "- shout");
    assert_eq!(entries("## Beta\n- b\n", "BETA"), "- b");
}

#[test]
fn first_matching_heading_wins() {
    let source = "## 1.0.0\n- first\n\n## 1.0.0\n- second\n";
    assert_eq!(entries(source, "1.0.0"), "- first");

    // The first match has no list; the second one is never consulted.
    let source = "## 1.0.0\nNo list here.\n\n## 1.0.0\n- second\n";
    let result = extract_release(&parse(source), &release("1.0.0"), EmptySectionPolicy::Lenient);
    assert!(matches!(result, Ok(Extraction::Empty { .. })));
}

#[test]
fn list_must_directly_follow_the_heading() {
    let source = "## Unreleased\nA paragraph.\n\n- Not picked up\n";
    let result = extract_release(&parse(source), &Release::Unreleased, EmptySectionPolicy::Lenient);
    match result.unwrap() {
        Extraction::Empty { heading } => assert_eq!(source[heading].trim_end(), "## Unreleased"),
        other => panic!("expected Empty, got {other:?}"),
    }
}

#[test]
fn empty_section_is_an_error_under_strict_policy() {
    let source = "## Unreleased\nA paragraph.\n";
    let err = extract_release(&parse(source), &Release::Unreleased, EmptySectionPolicy::Strict)
        .unwrap_err();
    match &err {
        ChangelogError::EmptySection { release, span } => {
            assert_eq!(release, &Release::Unreleased);
            assert_eq!(span.start, 0);
        }
        other => panic!("expected EmptySection, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Changelog does not contain elements in the 'Unreleased' section"
    );
}

#[test]
fn heading_at_end_of_document_is_empty() {
    let result = extract_release(&parse("## Unreleased\n"), &Release::Unreleased, EmptySectionPolicy::Lenient);
    assert!(matches!(result, Ok(Extraction::Empty { .. })));

    let result = extract_release(&parse("## Unreleased\n"), &Release::Unreleased, EmptySectionPolicy::Strict);
    assert!(matches!(result, Err(ChangelogError::EmptySection { .. })));
}

#[test]
fn strict_policy_does_not_change_successful_extraction() {
    let result = extract_release(&parse(CHANGELOG), &release("1.0.0"), EmptySectionPolicy::Strict);
    assert_eq!(result.unwrap(), Extraction::Entries("- Initial release".to_string()));
}

#[test]
fn keep_a_changelog_layout() {
    let source = "\
# Changelog

All notable changes to this project will be documented in this file.

## [Unreleased]

## [1.1.0] - 2024-03-01
- Added `--strict` flag
  - with nested detail

## [1.0.0] - 2024-01-01
- Initial release

[1.1.0]: https://example.com/compare/v1.0.0...v1.1.0
";
    let changelog = parse(source);
    // Bracketed headings without a link definition keep their brackets.
    let result = extract_release(&changelog, &release("[unreleased]"), EmptySectionPolicy::Lenient);
    assert!(matches!(result, Ok(Extraction::Empty { .. })));

    assert_eq!(
        entries(source, "1.1.0 - 2024-03-01"),
        "- Added `--strict` flag\n  - with nested detail"
    );
    assert_eq!(entries(source, "[1.0.0] - 2024-01-01"), "- Initial release");
}
