//! Hằng số trình bày bơm vào các trang PCI do vendor host.

use crate::StyleRules;

type RuleEntry = (&'static str, &'static [(&'static str, &'static str)]);

/// Style cho view PIN độc lập.
const PIN_RULES: [RuleEntry; 1] = [(
    ".pin",
    &[
        ("color", "#1f2933"),
        ("font-size", "28px"),
        ("letter-spacing", "4px"),
        ("text-align", "center"),
    ],
)];

/// Bộ style cố định cho view chi tiết thẻ, mỗi selector một mục.
const DETAIL_RULES: [RuleEntry; 8] = [
    (
        ".details",
        &[
            ("color", "#1f2933"),
            ("font-family", "'Inter', system-ui, sans-serif"),
        ],
    ),
    (
        ".details__label",
        &[
            ("color", "#52606d"),
            ("font-size", "12px"),
            ("text-transform", "uppercase"),
        ],
    ),
    (
        ".details__content",
        &[("color", "#11181c"), ("font-size", "16px")],
    ),
    (
        ".card-number",
        &[("font-size", "20px"), ("letter-spacing", "2px")],
    ),
    (".card-holder", &[("font-size", "14px")]),
    (".expiry", &[("font-size", "16px")]),
    (
        ".cvv",
        &[("font-size", "16px"), ("letter-spacing", "1px")],
    ),
    (
        ".copy-icon",
        &[("cursor", "pointer"), ("fill", "#2563eb")],
    ),
];

pub fn pin_rules() -> StyleRules {
    build_rules(&PIN_RULES)
}

pub fn detail_rules() -> StyleRules {
    build_rules(&DETAIL_RULES)
}

fn build_rules(entries: &[RuleEntry]) -> StyleRules {
    entries
        .iter()
        .map(|(selector, declarations)| {
            let body = declarations
                .iter()
                .map(|(property, value)| (property.to_string(), value.to_string()))
                .collect();
            (selector.to_string(), body)
        })
        .collect()
}
