//! End-to-end conversion into in-memory lexicons.

use std::sync::Arc;

use cidian::lexicon::{MemoryLexicon, Term};
use cidian::{ConvertConfig, Converter, RawEntry, RunReport, split_entries};

const SAMPLE: &str = include_str!("fixtures/guifan_sample.txt");

async fn convert(entries: &[RawEntry]) -> (RunReport, MemoryLexicon, MemoryLexicon) {
    let (mut pinyin, mut zhuyin) = (MemoryLexicon::new(), MemoryLexicon::new());
    let report = Converter::new(ConvertConfig::default())
        .convert(entries, &mut pinyin, &mut zhuyin)
        .await
        .expect("conversion should succeed");
    (report, pinyin, zhuyin)
}

fn only<'a>(lexicon: &'a MemoryLexicon, headword: &'a str) -> &'a Term {
    let terms: Vec<_> = lexicon.terms_for(headword).collect();
    assert_eq!(terms.len(), 1, "expected one term for {headword}");
    terms[0]
}

#[tokio::test]
async fn test_sample_report() {
    let entries = split_entries(SAMPLE).unwrap();
    assert_eq!(entries.len(), 6);

    let (report, pinyin, zhuyin) = convert(&entries).await;
    assert_eq!(report.entries, 6);
    assert_eq!(report.forwarding, 3);
    assert_eq!(report.terms, 4);
    assert_eq!(report.linked_terms, 2);
    assert_eq!(report.images, 1);
    assert_eq!(report.missing_image_sources, 0);

    assert_eq!(pinyin.terms().len(), 6);
    assert_eq!(zhuyin.terms().len(), 6);
}

#[tokio::test]
async fn test_forward_reference_borrows_target_definition() {
    let entries = split_entries(SAMPLE).unwrap();
    let (_, pinyin, zhuyin) = convert(&entries).await;

    let target = only(&pinyin, "哪");
    assert_eq!(target.reading, "nǎ");

    let linked = only(&pinyin, "哪儿");
    assert_eq!(linked.reading, "nǎr");
    assert!(Arc::ptr_eq(&linked.definition, &target.definition));

    let linked = only(&zhuyin, "哪儿");
    assert_eq!(linked.reading, "ㄋㄚˇㄦ");
    assert!(Arc::ptr_eq(&linked.definition, &target.definition));
}

#[tokio::test]
async fn test_backward_reference_resolves_too() {
    let entries = split_entries(SAMPLE).unwrap();
    let (_, pinyin, _) = convert(&entries).await;

    let target = only(&pinyin, "哪");
    let linked = only(&pinyin, "哪兒");
    assert_eq!(linked.reading, "nǎr");
    assert!(Arc::ptr_eq(&linked.definition, &target.definition));
}

#[tokio::test]
async fn test_linked_terms_follow_main_pass_in_directive_order() {
    let entries = split_entries(SAMPLE).unwrap();
    let (_, pinyin, _) = convert(&entries).await;

    let headwords: Vec<_> = pinyin.terms().iter().map(|t| t.headword.as_str()).collect();
    assert_eq!(headwords, ["爱", "哪", "阿", "阿", "哪儿", "哪兒"]);
}

#[tokio::test]
async fn test_unresolved_reference_is_skipped() {
    let entries = vec![RawEntry::new("甲", "@@@LINK=乙")];
    let (report, pinyin, zhuyin) = convert(&entries).await;

    assert!(pinyin.terms().is_empty());
    assert!(zhuyin.terms().is_empty());
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].source, "甲");
    assert_eq!(report.unresolved[0].target, "乙");
}

#[tokio::test]
async fn test_directive_inside_content_is_plain_text() {
    let entries = vec![RawEntry::new(
        "甲",
        r#"<div class="HYGF2"><x-hw>甲</x-hw><x-pr>jiǎ</x-pr><x-dfn>天干第一位。参见@@@LINK=乙</x-dfn></div>"#,
    )];
    let (report, pinyin, _) = convert(&entries).await;

    assert_eq!(report.forwarding, 0);
    assert!(report.unresolved.is_empty());
    let term = only(&pinyin, "甲");
    assert_eq!(term.reading, "jiǎ");
    let json = serde_json::to_value(term.definition.as_ref()).unwrap();
    assert!(json.to_string().contains("参见@@@LINK=乙"));
}

#[tokio::test]
async fn test_link_to_plain_entry_is_unresolved() {
    // 爱 has no erhua pairing, so it is never stored as a link target.
    let entries = vec![
        RawEntry::new(
            "爱",
            r#"<div class="HYGF2"><x-hw>爱</x-hw><x-pr>ài</x-pr></div>"#,
        ),
        RawEntry::new("愛", "@@@LINK=爱"),
    ];
    let (report, pinyin, _) = convert(&entries).await;

    assert_eq!(pinyin.terms_for("愛").count(), 0);
    assert_eq!(report.unresolved.len(), 1);
}

#[tokio::test]
async fn test_both_lexicons_share_content() {
    let entries = split_entries(SAMPLE).unwrap();
    let (_, pinyin, zhuyin) = convert(&entries).await;

    for (p, z) in pinyin.terms().iter().zip(zhuyin.terms()) {
        assert_eq!(p.headword, z.headword);
        assert!(Arc::ptr_eq(&p.definition, &z.definition));
        assert!(!z.reading.contains(' '));
    }

    let love = only(&zhuyin, "爱");
    assert_eq!(love.reading, "ㄞˋ");
}

#[tokio::test]
async fn test_images_persist_once_per_lexicon() {
    let entries = split_entries(SAMPLE).unwrap();
    let (_, pinyin, zhuyin) = convert(&entries).await;

    for lexicon in [&pinyin, &zhuyin] {
        assert_eq!(lexicon.file_writes(), 1);
        let path = lexicon.file_paths().next().unwrap();
        assert!(path.starts_with("img/") && path.ends_with(".png"));
        assert_eq!(lexicon.file(path), Some(&b"hi"[..]));
    }
}

#[tokio::test]
async fn test_traditional_form_and_link_in_content() {
    let entries = split_entries(SAMPLE).unwrap();
    let (_, pinyin, _) = convert(&entries).await;

    let json = serde_json::to_value(only(&pinyin, "爱").definition.as_ref()).unwrap();
    assert_eq!(json["type"], "structured-content");

    let root = &json["content"];
    assert_eq!(root["data"]["guifan"], "definitions-parent");
    assert_eq!(root["lang"], "zh-CN");
    assert_eq!(root["content"][0]["data"]["guifan"], "simp");
    assert_eq!(root["content"][1]["data"]["guifan"], "trad");
    assert_eq!(root["content"][1]["content"][0], "愛");
    assert_eq!(root["content"][1]["lang"], "zh-TW");

    let text = json.to_string();
    assert!(text.contains(r#""href":"?query=%E5%96%9C%E6%AC%A2&wildcards=off""#));
}
