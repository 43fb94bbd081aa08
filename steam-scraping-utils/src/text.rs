use scraper::ElementRef;

/// All text nodes below `element`, concatenated and trimmed.
pub fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::element_text;

    #[test]
    fn element_text_is_trimmed() {
        let html = Html::parse_fragment("<div>\n  Half-Life <b>2</b>  \n</div>");
        let div = html.select(selector!("div")).next().unwrap();
        assert_eq!(element_text(div), "Half-Life 2");
    }
}
