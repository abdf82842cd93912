use maud::Markup;
use scraper::{ElementRef, Html, Selector};

pub(crate) fn parse_html_document(markup: &Markup) -> Html {
    Html::parse_document(&markup.0)
}

pub(crate) fn parse_html_fragment(markup: &Markup) -> Html {
    Html::parse_fragment(&markup.0)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn must_select<'a>(html: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    let parsed = Selector::parse(selector).expect("Invalid selector");
    let elements: Vec<_> = html.select(&parsed).collect();

    assert!(
        !elements.is_empty(),
        "Could not find any element matching '{selector}'"
    );

    elements
}

#[track_caller]
pub(crate) fn must_select_one<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
    let elements = must_select(html, selector);

    assert_eq!(
        elements.len(),
        1,
        "Expected exactly one element matching '{selector}', got {}",
        elements.len()
    );

    elements[0]
}
