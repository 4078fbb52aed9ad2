use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::record::BusinessRecord;

// Ordered strategies per field. The detail panel markup shifts between
// rollouts, so each field carries the selectors seen in the wild, newest
// first; the first one that yields usable text wins.
const NAME_SELECTORS: &[&str] = &[
    "h1.DUwDvf.lfPIob",
    "h1[data-attrid='title']",
    "h1.DUwDvf",
    "h1.qrShPb",
    "h1.x3AX1-LfntMc-header-title-title",
];

const INFO_SELECTORS: &[&str] = &[
    "div.Io6YTe.fontBodyMedium.kR99db.fdkmkc",
    "div.Io6YTe.fontBodyMedium",
    "button[data-item-id='address']",
    "div[data-item-id='address']",
];

const RATING_SELECTORS: &[&str] = &[
    "div.F7nice span[aria-hidden='true']",
    "div[class*='F7nice'] span[aria-hidden='true']",
    "span[aria-hidden='true']",
];

const REVIEW_LABEL_SELECTORS: &[&str] = &[
    "span[aria-label*='avaliações']",
    "span[aria-label*='avaliação']",
    "div.F7nice span[aria-label*='avaliações']",
    "div.F7nice span[aria-label*='avaliação']",
];

const REVIEW_FALLBACK_SELECTOR: &str = "div.F7nice span";

const ADDRESS_KEYWORDS: &[&str] = &[
    "rua", "av", "avenida", "estrada", "rodovia", "praça", "bairro", "centro", "distrito", "vila",
    "jardim", "- pr", "- sp", "- mg", "- rj", "- sc", "- rs", "- ba", "- go", "- pe", "- ce",
    "- df", "- es", "- mt", "- ms", "- pa", "- pb", "- al", "- se", "- to", "- pi", "- ma", "- rn",
    "- ap", "- ac", "- rr", "- ro", "- am",
];

// Anything longer than this is prose that happens to contain digits, not a
// phone number.
const MAX_PHONE_CHARS: usize = 20;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"\(?\d{2}\)?\s?\d{4,5}[-.\s]?\d{4}").unwrap();
    static ref POSTAL_CODE_RE: Regex = Regex::new(r"\d{5}-?\d{3}").unwrap();
    static ref RATING_RE: Regex = Regex::new(r"^\d+[,.]?\d*$").unwrap();
    static ref FIRST_INT_RE: Regex = Regex::new(r"(\d+)").unwrap();
    static ref PAREN_INT_RE: Regex = Regex::new(r"\((\d+)\)").unwrap();
}

/// Best-effort extraction over a captured detail view. Never fails: each
/// field falls through its strategies independently and keeps the sentinel
/// when none of them produce usable text.
pub fn extract_record(html: &str) -> BusinessRecord {
    let document = Html::parse_document(html);
    let mut record = BusinessRecord::not_informed();

    if let Some(nome) = first_text(&document, NAME_SELECTORS) {
        record.nome = nome;
    }

    let (endereco, telefone) = classify_info_snippets(collect_snippets(&document));
    if let Some(endereco) = endereco {
        record.endereco = endereco;
    }
    if let Some(telefone) = telefone {
        record.telefone = telefone;
    }

    if let Some(avaliacao) = extract_rating(&document) {
        record.avaliacao = avaliacao;
    }
    if let Some(num_avaliacoes) = extract_review_count(&document) {
        record.num_avaliacoes = num_avaliacoes;
    }

    record
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Candidate address/phone snippets in document order, deduplicated.
fn collect_snippets(document: &Html) -> Vec<String> {
    let mut snippets: Vec<String> = vec![];
    for selector in INFO_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() && !snippets.contains(&text) {
                snippets.push(text);
            }
        }
    }
    snippets
}

/// First phone-looking snippet wins the phone slot, first address-looking
/// snippet wins the address slot; later candidates for a filled slot are
/// ignored. A phone-looking snippet is never considered as an address.
fn classify_info_snippets(snippets: Vec<String>) -> (Option<String>, Option<String>) {
    let mut endereco = None;
    let mut telefone = None;

    for snippet in snippets {
        let is_phone =
            PHONE_RE.is_match(&snippet) && snippet.chars().count() <= MAX_PHONE_CHARS;
        if is_phone {
            if telefone.is_none() {
                telefone = Some(snippet);
            }
            continue;
        }

        let lowered = snippet.to_lowercase();
        let is_address = ADDRESS_KEYWORDS.iter().any(|word| lowered.contains(word))
            || POSTAL_CODE_RE.is_match(&snippet);
        if is_address && endereco.is_none() {
            endereco = Some(snippet);
        }
    }

    (endereco, telefone)
}

fn extract_rating(document: &Html) -> Option<String> {
    for selector in RATING_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() && RATING_RE.is_match(&text) {
                return Some(text.replace('.', ","));
            }
        }
    }
    None
}

fn extract_review_count(document: &Html) -> Option<String> {
    // Preferred: the accessible label carries the count as plain digits.
    for selector in REVIEW_LABEL_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(label) = element.value().attr("aria-label") {
                if let Some(captures) = FIRST_INT_RE.captures(label) {
                    return Some(captures[1].to_string());
                }
            }
        }
    }

    // Fallback: a parenthesized count in the visible rating block.
    let Ok(selector) = Selector::parse(REVIEW_FALLBACK_SELECTOR) else {
        return None;
    };
    for element in document.select(&selector) {
        let text: String = element.text().collect::<String>().trim().to_string();
        if let Some(captures) = PAREN_INT_RE.captures(&text) {
            return Some(captures[1].to_string());
        }
    }
    None
}
