use std::path::PathBuf;
use std::sync::OnceLock;

use linguist_core::services::{placeholder, writer};
use linguist_core::{load_file, parse, Catalog, UnfinishedPolicy};
use proptest::prelude::*;

fn dock_fi() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("dde-dock_fi.ts");
        load_file(&path, UnfinishedPolicy::SourceText).expect("fixture loads")
    })
}

fn xml_safe_text() -> impl Strategy<Value = String> {
    // printable text including markup characters and %N markers
    "[ a-zA-Z0-9äöÄÖ<>&\"'%.,:-]{0,24}"
}

proptest! {
    #[test]
    fn unknown_keys_return_source(context in "[A-Za-z]{1,12}", source in "[ -~]{0,40}") {
        let cat = dock_fi();
        prop_assume!(cat.lookup(&context, &source, None).is_none());
        prop_assert_eq!(cat.translate(&context, &source, &[]), source);
    }

    #[test]
    fn substitution_without_markers_is_identity(text in "[^%]{0,40}", args in prop::collection::vec("[a-z0-9]{0,6}", 0..4)) {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        prop_assert_eq!(placeholder::substitute(&text, &args), text);
    }

    #[test]
    fn markers_are_replaced_once(arg in "[a-z%0-9]{0,8}") {
        let out = placeholder::substitute("<%1>", &[arg.as_str()]);
        prop_assert_eq!(out, format!("<{arg}>"));
    }

    #[test]
    fn written_catalog_reparses_identically(
        entries in prop::collection::vec((xml_safe_text(), xml_safe_text(), any::<bool>()), 1..8)
    ) {
        let mut doc = String::from("<TS version=\"2.1\" language=\"fi\"><context><name>Prop</name>");
        for (source, translation, finished) in &entries {
            let kind = if *finished { "" } else { " type=\"unfinished\"" };
            doc.push_str(&format!(
                "<message><source>{}</source><translation{kind}>{}</translation></message>",
                quick_escape(source),
                quick_escape(translation),
            ));
        }
        doc.push_str("</context></TS>");

        let first = parse(&doc).unwrap();
        let second = parse(&writer::write(&first)).unwrap();
        prop_assert_eq!(first.contexts(), second.contexts());
    }
}

fn quick_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
