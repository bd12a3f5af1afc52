//! Text sanitization and garbage filtering.
//!
//! Legacy presentations interleave real text with stream names, font names,
//! template placeholders and binary decoded as UTF-16 by accident. The
//! predicates here decide what survives into the presentation record. All
//! classification works on explicit code-point ranges rather than regular
//! expressions, so behavior does not depend on a regex engine's idea of
//! Unicode classes.

/// Placeholder text, font names and package-structure names that carry no
/// presentation content. Matched case-insensitively against the full string.
static SYSTEM_STRINGS: phf::Set<&'static str> = phf::phf_set! {
    "click to edit master title style",
    "click to edit master text styles",
    "click to edit master subtitle style",
    "edit master text styles",
    "master title",
    "master text",
    "master subtitle",
    "second level",
    "third level",
    "fourth level",
    "fifth level",
    "default design",
    "___ppt10",
    "___ppt9",
    "title placeholder",
    "text placeholder",
    "date placeholder",
    "footer placeholder",
    "slide number placeholder",
    "arial",
    "times new roman",
    "calibri",
    "tahoma",
    "verdana",
    "root entry",
    "powerpoint document",
    "current user",
    "summaryinformation",
    "documentsummaryinformation",
    "pictures",
    "[content_types].xml",
    "_rels",
    "docprops",
};

/// Normalize whitespace and strip control characters.
///
/// Newlines are normalized first so carriage returns cannot survive as
/// controls; C0 controls other than tab and newline are dropped; any run of
/// whitespace collapses to a single space; the result is trimmed.
/// Idempotent: sanitizing a sanitized string is a no-op.
pub fn sanitize(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped: String = normalized
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || !('\u{0}'..'\u{20}').contains(&c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a character counts as textual content.
///
/// Covers Latin (ASCII, Latin-1 Supplement, Extended A/B), Cyrillic, Greek,
/// digits, common punctuation and spacing.
fn is_textual(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == ' '
        || c.is_ascii_punctuation()
        || ('\u{00A0}'..='\u{024F}').contains(&c)
        || ('\u{0370}'..='\u{03FF}').contains(&c)
        || ('\u{0400}'..='\u{04FF}').contains(&c)
}

/// Whether a character belongs to the script ranges that show up when
/// arbitrary binary is misread as UTF-16LE (Tibetan, CJK, Hangul, Thai,
/// Arabic, Hebrew, Private Use Area).
fn is_exotic(c: char) -> bool {
    ('\u{0F00}'..='\u{0FFF}').contains(&c)
        || ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{1100}'..='\u{11FF}').contains(&c)
        || ('\u{AC00}'..='\u{D7AF}').contains(&c)
        || ('\u{0E00}'..='\u{0E7F}').contains(&c)
        || ('\u{0600}'..='\u{06FF}').contains(&c)
        || ('\u{0590}'..='\u{05FF}').contains(&c)
        || ('\u{E000}'..='\u{F8FF}').contains(&c)
}

/// Whether the string matches one of the known-garbage shapes: hex dumps,
/// CFB stream names, package artifacts, bare digits.
fn is_garbage_pattern(text: &str) -> bool {
    // Long runs of hex digits are leaked binary, not prose.
    if text.len() >= 8
        && text.chars().all(|c| c.is_ascii_hexdigit())
        && text.chars().any(|c| c.is_ascii_digit())
    {
        return true;
    }

    if text.starts_with("PK") && text.len() <= 8 {
        return true;
    }
    if text.contains("[Content_Types]") || text.contains("_rels/") {
        return true;
    }
    if text.ends_with(".xml") || text.ends_with(".rels") {
        return true;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    false
}

/// Whether the string is a well-known placeholder, font or package name.
pub fn is_system_string(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if SYSTEM_STRINGS.contains(lowered.as_str()) {
        return true;
    }
    // The master-style placeholders come in many phrasings.
    lowered.starts_with("click to edit")
}

/// Acceptance predicate for decoded strings.
///
/// A string is kept only when it is long enough, mostly textual, contains at
/// least one letter, carries no control characters, is not dominated by the
/// exotic ranges and matches none of the garbage or system patterns.
pub fn is_valid_text(text: &str) -> bool {
    let trimmed = text.trim();
    let total = trimmed.chars().count();
    if total < 2 {
        return false;
    }
    if trimmed
        .chars()
        .any(|c| ('\u{0}'..'\u{20}').contains(&c) && c != '\t' && c != '\n')
    {
        return false;
    }

    let textual = trimmed.chars().filter(|&c| is_textual(c)).count();
    if textual * 2 < total {
        return false;
    }
    if !trimmed.chars().any(|c| c.is_alphabetic()) {
        return false;
    }

    let exotic = trimmed.chars().filter(|&c| is_exotic(c)).count();
    if exotic * 5 >= total {
        return false;
    }

    !is_garbage_pattern(trimmed) && !is_system_string(trimmed)
}
