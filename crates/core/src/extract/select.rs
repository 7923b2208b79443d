// ABOUTME: Selector-cascade field extraction over parsed markup documents.
// ABOUTME: Candidates are CSS selectors tried in order; first non-empty match wins.

//! Markup field extraction.
//!
//! Key behaviors:
//! - Selectors are tried in order; the first selector yielding a non-empty
//!   match wins.
//! - Text extraction joins inner text with spaces and normalizes whitespace.
//! - Attribute extraction returns the attribute value trimmed.
//! - Invalid selectors are skipped, never errors.
//! - An empty selector refers to the scoped element itself, which is how
//!   per-row extraction addresses the row element's own text or attributes.

use scraper::{ElementRef, Selector};

use super::Candidate;

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> Option<String> {
    let text = normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn element_attr(el: ElementRef<'_>, attr: &str) -> Option<String> {
    el.value().attr(attr).and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Extract values for one candidate, in document order.
fn candidate_values(scope: ElementRef<'_>, candidate: &Candidate) -> Vec<String> {
    let (css, attr) = match candidate {
        Candidate::Path(css) => (css.as_str(), None),
        Candidate::PathAttr(parts) => match parts.as_slice() {
            [css, attr, ..] => (css.as_str(), Some(attr.as_str())),
            [css] => (css.as_str(), None),
            [] => return Vec::new(),
        },
    };

    let pick = |el: ElementRef<'_>| match attr {
        Some(attr) => element_attr(el, attr),
        None => element_text(el),
    };

    if css.is_empty() {
        return pick(scope).into_iter().collect();
    }

    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    scope.select(&selector).filter_map(pick).collect()
}

/// All candidate values flattened in candidate order, for typed coercion
/// that must skip unusable values.
pub fn texts<'a>(
    scope: ElementRef<'a>,
    candidates: &'a [Candidate],
) -> impl Iterator<Item = String> + 'a {
    candidates
        .iter()
        .flat_map(move |candidate| candidate_values(scope, candidate))
}

/// First candidate yielding a non-empty value.
pub fn first_text(scope: ElementRef<'_>, candidates: &[Candidate]) -> Option<String> {
    candidates
        .iter()
        .find_map(|candidate| candidate_values(scope, candidate).into_iter().next())
}

/// All values from the first candidate that yields at least one match.
pub fn all_texts(scope: ElementRef<'_>, candidates: &[Candidate]) -> Vec<String> {
    for candidate in candidates {
        let values = candidate_values(scope, candidate);
        if !values.is_empty() {
            return values;
        }
    }
    Vec::new()
}

/// Resolve result rows: the first selector yielding at least one element
/// wins. Returns `None` only when every selector failed to parse.
pub fn rows<'a>(scope: ElementRef<'a>, selectors: &[String]) -> Option<Vec<ElementRef<'a>>> {
    let mut any_valid = false;
    for css in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        any_valid = true;
        let matched: Vec<ElementRef<'a>> = scope.select(&selector).collect();
        if !matched.is_empty() {
            return Some(matched);
        }
    }
    if any_valid {
        Some(Vec::new())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <body>
            <div class="item">
                <h3>  Solo   Max  </h3>
                <a href="/manga/solo-max"><img src="/covers/solo.jpg" data-src="/lazy/solo.jpg"></a>
                <span class="status">Ongoing</span>
            </div>
            <div class="item">
                <h3>Second</h3>
                <a href="/manga/second"><img data-src="/lazy/second.jpg"></a>
            </div>
            <div class="empty-status"></div>
        </body>
        </html>
    "#;

    fn css(s: &str) -> Candidate {
        Candidate::Path(s.to_string())
    }

    fn attr(sel: &str, attr: &str) -> Candidate {
        Candidate::PathAttr(vec![sel.to_string(), attr.to_string()])
    }

    #[test]
    fn first_selector_with_match_wins() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let root = doc.root_element();
        let result = first_text(root, &[css(".missing"), css("h3"), css(".status")]);
        assert_eq!(result, Some("Solo Max".to_string()));
    }

    #[test]
    fn attribute_extraction() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let root = doc.root_element();
        assert_eq!(
            first_text(root, &[attr("a", "href")]),
            Some("/manga/solo-max".to_string())
        );
    }

    #[test]
    fn attr_cascade_falls_back_per_candidate() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let rows = rows(doc.root_element(), &["div.item".to_string()]).unwrap();
        // Second row's img has no src, only data-src.
        let second = rows[1];
        let result = first_text(second, &[attr("img", "src"), attr("img", "data-src")]);
        assert_eq!(result, Some("/lazy/second.jpg".to_string()));
    }

    #[test]
    fn empty_selector_addresses_the_scope_itself() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let item_rows = rows(doc.root_element(), &["div.item h3".to_string()]).unwrap();
        assert_eq!(
            first_text(item_rows[0], &[css("")]),
            Some("Solo Max".to_string())
        );
    }

    #[test]
    fn empty_elements_are_skipped() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let root = doc.root_element();
        let result = first_text(root, &[css(".empty-status"), css(".status")]);
        assert_eq!(result, Some("Ongoing".to_string()));
    }

    #[test]
    fn all_texts_returns_winning_candidate_matches() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let root = doc.root_element();
        let result = all_texts(root, &[css(".missing"), css("div.item h3")]);
        assert_eq!(result, vec!["Solo Max".to_string(), "Second".to_string()]);
    }

    #[test]
    fn invalid_selector_is_skipped() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let root = doc.root_element();
        let result = first_text(root, &[css("[[[invalid"), css("h3")]);
        assert_eq!(result, Some("Solo Max".to_string()));
    }

    #[test]
    fn rows_none_only_when_all_selectors_invalid() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let root = doc.root_element();
        assert!(rows(root, &["[[[".to_string()]).is_none());
        assert_eq!(rows(root, &[".nothing".to_string()]).unwrap().len(), 0);
        assert_eq!(rows(root, &["div.item".to_string()]).unwrap().len(), 2);
    }
}
