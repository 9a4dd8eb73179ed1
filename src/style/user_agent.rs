//! Default stylesheet applied beneath author styles.

use super::stylesheet::Stylesheet;

const USER_AGENT_CSS: &str = r#"
    /* Block elements */
    html, body, div, section, article, aside, nav, header, footer, main,
    address, blockquote, figure, figcaption, details, summary, center,
    dl, dt, dd, hgroup, form, fieldset, legend {
        display: block;
    }

    /* Headings */
    h1, h2, h3, h4, h5, h6 {
        display: block;
        font-weight: bold;
        page-break-after: avoid;
    }
    h1 { font-size: 2em; margin-top: 0.67em; margin-bottom: 0.67em; }
    h2 { font-size: 1.5em; margin-top: 0.83em; margin-bottom: 0.83em; }
    h3 { font-size: 1.17em; margin-top: 1em; margin-bottom: 1em; }
    h4 { margin-top: 1.33em; margin-bottom: 1.33em; }
    h5 { font-size: 0.83em; margin-top: 1.67em; margin-bottom: 1.67em; }
    h6 { font-size: 0.67em; margin-top: 2.33em; margin-bottom: 2.33em; }

    p {
        display: block;
        margin-top: 1em;
        margin-bottom: 1em;
    }

    /* Lists */
    ul, ol, menu, dir {
        display: block;
        margin-top: 1em;
        margin-bottom: 1em;
        margin-left: 30pt;
    }
    li {
        display: list-item;
    }
    dd {
        margin-left: 30pt;
    }

    /* Inline formatting */
    em, i, cite, var, dfn, address {
        font-style: italic;
    }
    strong, b, th, dt {
        font-weight: bold;
    }
    code, kbd, samp, tt, pre, listing, xmp, plaintext {
        font-family: monospace;
    }
    big { font-size: larger; }
    small { font-size: smaller; }
    sup {
        vertical-align: super;
        font-size: smaller;
    }
    sub {
        vertical-align: sub;
        font-size: smaller;
    }
    u, ins {
        text-decoration: underline;
    }
    s, strike, del {
        text-decoration: line-through;
    }
    a[href] {
        color: blue;
        text-decoration: underline;
    }
    center {
        text-align: center;
    }

    /* Preformatted */
    pre, listing, xmp, plaintext {
        display: block;
        white-space: pre;
        margin-top: 1em;
        margin-bottom: 1em;
    }
    nobr {
        white-space: nowrap;
    }

    blockquote {
        margin-top: 1em;
        margin-bottom: 1em;
        margin-left: 40px;
        margin-right: 40px;
    }

    hr {
        display: block;
        margin-top: 0.5em;
        margin-bottom: 0.5em;
    }

    /* Tables */
    table { display: table; }
    caption { display: table-caption; text-align: center; }
    thead { display: table-header-group; }
    tbody { display: table-row-group; }
    tfoot { display: table-footer-group; }
    colgroup { display: table-column-group; }
    col { display: table-column; }
    tr { display: table-row; }
    td, th { display: table-cell; }
    th { text-align: center; }

    /* Never rendered */
    head, script, style, link, meta, title, template, noscript, base,
    area, datalist, param {
        display: none;
    }
"#;

/// The built-in stylesheet giving HTML elements their usual presentation.
pub fn user_agent_stylesheet() -> Stylesheet {
    Stylesheet::parse(USER_AGENT_CSS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_parses_every_rule() {
        let sheet = user_agent_stylesheet();
        let rule_count = USER_AGENT_CSS.matches('{').count();
        assert_eq!(sheet.rules.len(), rule_count);
    }
}
