use bkd::{RenderOptions, parse_str, render_html_string};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn assert_html(markup: &str, expected: &str) {
    let doc = parse_str(markup);
    let html = render_html_string(&doc, &RenderOptions::default(), &mut []).unwrap();
    assert_eq!(html, expected);
}

#[test]
fn renders_empty_and_whitespace_input() {
    assert_html("", "");
    assert_html("   \n\n\t\n", "");
}

#[test]
fn renders_hello_world_paragraph() {
    assert_html("Hello, World!", "<p>Hello, World!</p>");
}

#[test]
fn renders_headers_by_hash_count() {
    assert_html("# Title", "<h1>Title</h1>");
    assert_html("### Sub", "<h3>Sub</h3>");
    assert_html("####### too deep", "<h6>too deep</h6>");
}

#[test]
fn paragraph_joins_lines_until_blank() {
    assert_html(
        "line one\nline two\n\nline three",
        "<p>line one line two</p><p>line three</p>",
    );
}

#[test]
fn renders_inline_styles() {
    assert_html(
        "[B:bold] and [I:italic]",
        "<p><strong>bold</strong> and <em>italic</em></p>",
    );
    assert_html(
        "[S:gone] [U:under] [C:mono]",
        "<p><del>gone</del> <u>under</u> <code>mono</code></p>",
    );
}

#[test]
fn combined_flags_nest_in_canonical_order() {
    assert_html("[BIS:x]", "<p><strong><em><del>x</del></em></strong></p>");
    assert_html("[SIB:x]", "<p><strong><em><del>x</del></em></strong></p>");
}

#[test]
fn renders_links_with_data_payload() {
    assert_html(
        "[L:click](http://x)",
        "<p><a href=\"http://x\">click</a></p>",
    );
}

#[test]
fn renders_images() {
    assert_html(
        "See [P:a cat](cat.png) here",
        "<p>See <img src=\"cat.png\" alt=\"a cat\"> here</p>",
    );
}

#[test]
fn renders_bullet_list() {
    assert_html("* one\n* two", "<ul><li>one</li><li>two</li></ul>");
}

#[test]
fn renders_numbered_list() {
    assert_html("% first\n% second", "<ol><li>first</li><li>second</li></ol>");
}

#[test]
fn renders_code_block_with_language() {
    assert_html(
        ">>lang\ncode line\n>>",
        "<pre><code data-bkd-language=\"lang\">code line</code></pre>",
    );
}

#[test]
fn renders_code_block_without_language() {
    assert_html(">>\nplain\n>>", "<pre><code>plain</code></pre>");
}

#[test]
fn code_block_text_is_never_inline_parsed() {
    assert_html(
        ">>\n[B:not bold] <tag>\n>>",
        "<pre><code>[B:not bold] &#x3C;tag&#x3E;</code></pre>",
    );
}

#[test]
fn renders_rules_by_style() {
    assert_html("---", "<hr class=\"bkd-solid\">");
    assert_html("```", "<hr class=\"bkd-dotted\">");
    assert_html("===", "<hr class=\"bkd-solid\">");
}

#[test]
fn renders_comment_blocks() {
    assert_html("> a comment", "<blockquote>a comment</blockquote>");
    assert_html(
        "> first\n> second",
        "<blockquote>first<br>second</blockquote>",
    );
}

#[test]
fn comment_text_carries_inline_markup() {
    assert_html(
        "> [B:warn] here",
        "<blockquote><strong>warn</strong> here</blockquote>",
    );
}

#[test]
fn indented_content_becomes_a_subdocument() {
    assert_html(
        "top\n\n    inner",
        "<p>top</p><div class=\"bkd-subdoc\"><p>inner</p></div>",
    );
}

#[test]
fn nested_list_sits_inside_its_item() {
    assert_html(
        "* outer\n    * inner",
        "<ul><li><div class=\"bkd-subdoc\">outer<div class=\"bkd-subdoc\">\
         <ul><li>inner</li></ul></div></div></li></ul>",
    );
}

#[test]
fn item_continuation_lines_join_with_spaces() {
    assert_html(
        "* one\n  still one\n* two",
        "<ul><li>one still one</li><li>two</li></ul>",
    );
}

#[test]
fn headers_terminate_open_paragraphs_only_after_blank() {
    // A header line at the same indent folds into the paragraph; blocks
    // end on blank lines or indent changes.
    assert_html("text\n# not a header", "<p>text # not a header</p>");
    assert_html("text\n\n# header", "<p>text</p><h1>header</h1>");
}

#[test]
fn unmatched_span_never_fails() {
    assert_html("[B:open forever", "<p><strong>open forever</strong></p>");
    assert_html("plain ] bracket", "<p>plain ] bracket</p>");
}

#[test]
fn escapes_keep_markup_literal() {
    assert_html("\\[B:x\\]", "<p>[B:x]</p>");
}

#[test]
fn hex_escape_resolves_to_codepoint() {
    assert_html("A\\(2192)B", "<p>A&#x2192;B</p>");
}

#[test]
fn text_is_hex_escaped() {
    assert_html(
        "a < b & c > d \"quoted\"",
        "<p>a &#x3C; b &#x26; c &#x3E; d &#x22;quoted&#x22;</p>",
    );
    assert_html("caf\u{e9}", "<p>caf&#xE9;</p>");
}

#[rstest]
#[case("[UB:x]")]
#[case("[BU:x]")]
fn flag_order_never_changes_output(#[case] markup: &str) {
    let doc = parse_str(markup);
    let html = render_html_string(&doc, &RenderOptions::default(), &mut []).unwrap();
    assert_eq!(html, "<p><strong><u>x</u></strong></p>");
}

#[test]
fn rendered_tags_balance_for_mixed_document() {
    let markup = "# Head\n\npara [B:bold [I:deep]] tail\n\n* one\n* [L:two](u)\n\n> note\n\n>>c\nx\n>>";
    let doc = parse_str(markup);
    let html = render_html_string(&doc, &RenderOptions::default(), &mut []).unwrap();
    for tag in ["p", "h1", "strong", "em", "ul", "li", "a", "blockquote", "pre", "code"] {
        let opens =
            html.matches(&format!("<{tag}>")).count() + html.matches(&format!("<{tag} ")).count();
        let closes = html.matches(&format!("</{tag}>")).count();
        assert_eq!(opens, closes, "unbalanced <{tag}> in {html}");
    }
}

#[test]
fn standalone_document_shell() {
    let doc = parse_str("# T");
    let html = render_html_string(&doc, &RenderOptions { standalone: true }, &mut []).unwrap();
    assert!(html.starts_with("<!DOCTYPE html><html><head>"));
    assert!(html.ends_with("</body></html>"));
    assert!(html.contains("<h1>T</h1>"));
}
