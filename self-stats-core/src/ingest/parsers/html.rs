//! Shared helpers for the Takeout HTML (`My Activity`) exports.
//!
//! Each activity is an `outer-cell` card. Its body cell holds the links and
//! a `<br>`-separated date line; a caption cell may hold a maps link for the
//! search location.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Body cell of one activity card, excluding the empty right-hand cell.
static ENTRY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "div.content-cell.mdl-cell--6-col.mdl-typography--body-1:not(.mdl-typography--text-right)",
    )
    .expect("valid selector")
});

static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Location link in a card caption.
static MAPS_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="maps"]"#).expect("valid selector"));

/// Every activity body cell in document order.
pub(crate) fn entries(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&ENTRY).collect()
}

/// Links inside an entry, with their trimmed text.
pub(crate) fn links<'a>(entry: ElementRef<'a>) -> Vec<(&'a str, String)> {
    entry
        .select(&LINK)
        .map(|a| {
            let href = a.value().attr("href").unwrap_or_default();
            (href, a.text().collect::<String>().trim().to_string())
        })
        .collect()
}

/// Which `<br>` of an entry precedes its date line.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DateLine {
    AfterFirstBreak,
    AfterLastBreak,
}

/// Text node directly following the chosen `<br>` child.
pub(crate) fn date_text(entry: ElementRef<'_>, line: DateLine) -> Option<String> {
    let mut breaks = entry
        .children()
        .filter(|node| node.value().as_element().is_some_and(|e| e.name() == "br"));
    let br = match line {
        DateLine::AfterFirstBreak => breaks.next(),
        DateLine::AfterLastBreak => breaks.last(),
    }?;
    let text = br.next_sibling()?.value().as_text()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// URL of the "this general area" maps link on the entry's card.
pub(crate) fn location_url(entry: ElementRef<'_>) -> Option<String> {
    let card = entry.parent().and_then(ElementRef::wrap)?;
    card.select(&MAPS_LINK)
        .find(|a| a.text().collect::<String>().contains("this general area"))
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}
