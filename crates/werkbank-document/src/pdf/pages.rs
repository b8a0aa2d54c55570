// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page range expressions: `"1-3,5,7"` to a sorted set of 1-based pages.
//
// Tokens that are malformed or out of bounds are dropped without error; an
// expression with nothing valid yields an empty set.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static SINGLE_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("single page pattern is valid"));
static PAGE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)-([0-9]+)$").expect("page span pattern is valid"));

/// Ascending, duplicate-free list of 1-based page numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet(Vec<u32>);

impl PageSet {
    /// Build from any page numbers; the result is sorted and deduplicated.
    /// Page 0 does not exist and is dropped.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>) -> Self {
        let set: BTreeSet<u32> = pages.into_iter().filter(|&page| page >= 1).collect();
        Self(set.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn first(&self) -> Option<u32> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl From<PageSet> for Vec<u32> {
    fn from(set: PageSet) -> Self {
        set.0
    }
}

/// Pages accepted from an expression, plus the tokens that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRangeReport {
    pub pages: PageSet,
    pub rejected: Vec<String>,
}

/// Parse a page range expression against a document of `max_page` pages.
///
/// Each comma-separated token (surrounding whitespace ignored) is either a
/// page number `n`, kept when `1 <= n <= max_page`, or a span `a-b`, kept
/// when `a >= 1`, `b <= max_page` and `a <= b`. Anything else is ignored.
pub fn parse_page_range(expr: &str, max_page: u32) -> PageSet {
    parse_page_range_report(expr, max_page).pages
}

/// Like [`parse_page_range`], but also returns the rejected tokens so a
/// front end can point them out. Empty tokens are not reported.
pub fn parse_page_range_report(expr: &str, max_page: u32) -> PageRangeReport {
    let mut pages = BTreeSet::new();
    let mut rejected = Vec::new();

    for token in expr.split(',').map(str::trim) {
        let accepted = if SINGLE_PAGE.is_match(token) {
            match token.parse::<u32>() {
                Ok(page) if (1..=max_page).contains(&page) => {
                    pages.insert(page);
                    true
                }
                _ => false,
            }
        } else if let Some(caps) = PAGE_SPAN.captures(token) {
            // Digits that overflow u32 are necessarily beyond `max_page`.
            match (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
                (Ok(start), Ok(end)) if start >= 1 && end <= max_page && start <= end => {
                    pages.extend(start..=end);
                    true
                }
                _ => false,
            }
        } else {
            false
        };

        if !accepted && !token.is_empty() {
            rejected.push(token.to_string());
        }
    }

    PageRangeReport {
        pages: PageSet(pages.into_iter().collect()),
        rejected,
    }
}
