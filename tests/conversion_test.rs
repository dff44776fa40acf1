//! End-to-end conversion tests through the public API.
//!
//! These feed raw markup through `hamlize::convert` so parser choice,
//! fragment handling and rendering are exercised together.

use hamlize::{AttributeStyle, Error, Options, convert, convert_bytes};

fn haml(source: &str) -> String {
    convert(source, &Options::default()).unwrap()
}

fn xhtml(source: &str) -> String {
    convert(source, &Options::new().with_xhtml(true)).unwrap()
}

// ============================================================================
// Tags and shorthand
// ============================================================================

#[test]
fn test_void_element_attributes_are_sorted() {
    assert_eq!(
        haml(r#"<input type="text" name="login">"#),
        "%input{:name => \"login\", :type => \"text\"}/\n"
    );
}

#[test]
fn test_div_with_id_and_whitespace_only() {
    assert_eq!(haml(r#"<div id="foo"> </div>"#), "#foo\n");
}

#[test]
fn test_nested_shorthand() {
    assert_eq!(
        haml(r#"<div id="main"><p class="lead">Hello</p></div>"#),
        "#main\n  %p.lead Hello\n"
    );
}

#[test]
fn test_class_tokens_split_between_shorthand_and_block() {
    assert_eq!(
        haml(r#"<div class="col w-1/2 span">x</div>"#),
        ".col.span{:class => \"w-1/2\"} x\n"
    );
}

#[test]
fn test_fragment_has_no_wrapper() {
    assert_eq!(haml("<ul><li>one</li><li>two</li></ul>"), "%ul\n  %li one\n  %li two\n");
}

#[test]
fn test_boolean_attribute_gets_its_name() {
    assert_eq!(
        haml("<input type=\"checkbox\" checked>"),
        "%input{:checked => \"checked\", :type => \"checkbox\"}/\n"
    );
}

// ============================================================================
// Attribute styles
// ============================================================================

#[test]
fn test_html_style_attributes() {
    let options = Options::new().with_html_style_attributes(true);
    assert_eq!(
        convert(r#"<a href="/" title="Home">x</a>"#, &options).unwrap(),
        "%a(href=\"/\" title=\"Home\") x\n"
    );
}

#[test]
fn test_ruby19_style_attributes() {
    let options = Options::new().with_attribute_style(AttributeStyle::Ruby19);
    assert_eq!(
        convert(r#"<a href="/" data-id="7">x</a>"#, &options).unwrap(),
        "%a{\"data-id\" => \"7\", href: \"/\"} x\n"
    );
}

#[test]
fn test_html_style_wins_over_ruby19() {
    let options = Options::new()
        .with_ruby19_style_attributes(true)
        .with_html_style_attributes(true);
    assert_eq!(
        convert(r#"<img src="a.png">"#, &options).unwrap(),
        "%img(src=\"a.png\")/\n"
    );
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn test_interpolation_is_escaped() {
    assert_eq!(haml("Foo #{bar} baz"), "Foo \\#{bar} baz\n");
}

#[test]
fn test_text_entities_stay_escaped() {
    assert_eq!(haml("<p>a &amp; b &lt; c</p>"), "%p a &amp; b &lt; c\n");
}

#[test]
fn test_special_characters_escaped_in_blocks() {
    assert_eq!(
        haml("<div>\n  = not script\n  - not silent\n</div>"),
        "%div\n  \\= not script\n  \\- not silent\n"
    );
}

#[test]
fn test_pre_is_preserved() {
    assert_eq!(
        haml("<pre>line one\n  line two</pre>"),
        "%pre\n  :preserve\n    line one\n      line two\n"
    );
}

#[test]
fn test_textarea_is_preserved() {
    assert_eq!(
        haml("<textarea>a\nb</textarea>"),
        "%textarea\n  :preserve\n    a\n    b\n"
    );
}

// ============================================================================
// Inline whitespace
// ============================================================================

#[test]
fn test_glued_inline_element_nukes_whitespace() {
    assert_eq!(
        haml(r#"<p>foo<a href="/">bar</a>baz</p>"#),
        "%p\n  foo\n  %a{:href => \"/\"}> bar\n  baz\n"
    );
}

#[test]
fn test_trailing_punctuation_uses_succeed() {
    assert_eq!(
        haml("<p>see <a>here</a>, then more</p>"),
        "%p\n  see\n  = succeed \",\" do\n    %a here\n  then more\n"
    );
}

#[test]
fn test_spaced_inline_element_is_plain() {
    assert_eq!(
        haml("<p>read <em>this</em> now</p>"),
        "%p\n  read\n  %em this\n  now\n"
    );
}

// ============================================================================
// Comments, filters and doctypes
// ============================================================================

#[test]
fn test_comments() {
    assert_eq!(haml("<!-- note -->"), "/ note\n");
    assert_eq!(
        haml("<!--[if IE]><p>old</p><![endif]-->"),
        "/[if IE] <p>old</p>\n"
    );
}

#[test]
fn test_script_becomes_javascript_filter() {
    assert_eq!(
        haml("<script type=\"text/javascript\">\n  var a = 1;\n  go(a);\n</script>"),
        ":javascript\n  var a = 1;\n  go(a);\n"
    );
}

#[test]
fn test_style_becomes_css_filter() {
    assert_eq!(
        haml("<style>\n  p { color: red; }\n</style>"),
        ":css\n  p { color: red; }\n"
    );
}

#[test]
fn test_html5_document() {
    assert_eq!(
        haml("<!DOCTYPE html><html><head><title>Hi</title></head><body><p>x</p></body></html>"),
        "!!!\n%html\n  %head\n    %title Hi\n  %body\n    %p x\n"
    );
}

#[test]
fn test_xhtml_strict_document() {
    let source = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
        <!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
        \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n\
        <html><body><p>x</p></body></html>";
    assert_eq!(
        xhtml(source),
        "!!! XML\n!!! Strict\n%html\n  %body\n    %p x\n"
    );
}

#[test]
fn test_invalid_doctype_is_an_error() {
    let source = "<!DOCTYPE html PUBLIC \"-//Acme//Custom//EN\"><html></html>";
    let err = convert(source, &Options::new().with_xhtml(true)).unwrap_err();
    assert!(matches!(err, Error::InvalidDoctype(_)));
    assert!(err.to_string().starts_with("Invalid doctype"));
}

#[test]
fn test_xhtml_self_closing_and_cdata() {
    assert_eq!(xhtml("<p>Hello <br/> world</p>"), "%p\n  Hello\n  %br/\n  world\n");
    assert_eq!(xhtml("<![CDATA[ raw <b> ]]>"), ":cdata\n  raw <b>\n");
}

#[test]
fn test_cdata_switches_to_xml_parser() {
    assert_eq!(haml("<div><![CDATA[kept]]></div>"), "%div\n  :cdata\n    kept\n");
}

// ============================================================================
// Input bytes
// ============================================================================

#[test]
fn test_convert_bytes_strips_bom() {
    let output = convert_bytes(b"\xEF\xBB\xBF<p>hi</p>", &Options::default()).unwrap();
    assert_eq!(output, "%p hi\n");
}

#[test]
fn test_convert_bytes_reports_bad_encoding() {
    let err = convert_bytes(b"<p>ok</p>\n<p>b\xFEad</p>", &Options::default()).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert_eq!(
        err.to_string(),
        "Line 2: Invalid UTF-8 character \"\\xFE\""
    );
}

#[test]
fn test_depth_limit() {
    let source = "<div>".repeat(64);
    let options = Options::new().with_max_depth(16);
    assert!(matches!(
        convert(&source, &options),
        Err(Error::TooDeep { depth: 16 })
    ));
}

#[test]
fn test_deep_markup_inside_script_and_loud() {
    let nested = "<b>".repeat(100_000);

    let script = format!("<script>{nested}</script>");
    assert_eq!(xhtml(&script), ":javascript\n");

    let loud = format!("<loud>{nested} total </loud>");
    let options = Options::new().with_xhtml(true).with_erb(true);
    assert_eq!(convert(&loud, &options).unwrap(), "= total\n");
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn test_named_entities_match_across_parsers() {
    let source = "<p>&copy; 2024 &mdash; all&hellip;</p>";
    assert_eq!(haml(source), "%p \u{a9} 2024 \u{2014} all\u{2026}\n");
    assert_eq!(xhtml(source), haml(source));
}

#[test]
fn test_named_entities_with_cdata_in_source() {
    assert_eq!(
        haml("<p>&copy; 2024</p><div><![CDATA[x]]></div>"),
        "%p \u{a9} 2024\n%div\n  :cdata\n    x\n"
    );
}
