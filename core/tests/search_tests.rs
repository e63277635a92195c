use proptest::prelude::*;
use sitesearch_core::persist::{load_artifacts, save_artifacts, IndexPaths};
use sitesearch_core::{
    Document, IndexBuilder, MatchWeights, QueryEngine, RenderedPage, Renderer, SearchConfig, SearchOutcome,
    SearchSession, SessionState, Stemming, Tokenizer, TokenizerConfig,
};
use std::sync::Arc;
use tempfile::tempdir;

fn corpus() -> Vec<Document> {
    vec![
        Document::new("/a/", "Getting Started", "This guide explains installation steps."),
        Document::new("/b/", "Installation Notes", "Getting started is easy."),
    ]
}

fn engine_for(docs: &[Document], config: &SearchConfig) -> (QueryEngine, sitesearch_core::DocumentStore) {
    let tokenizer = Arc::new(Tokenizer::new(config.tokenizer.clone()));
    let out = IndexBuilder::new(&tokenizer, config).build(docs);
    (QueryEngine::new(Arc::new(out.index), tokenizer, config.matching), out.store)
}

#[test]
fn title_match_ranks_above_body_match() {
    let (engine, _) = engine_for(&corpus(), &SearchConfig::default());
    let results = engine.search("installation");
    let refs: Vec<&str> = results.iter().map(|r| r.reference.as_str()).collect();
    assert_eq!(refs, vec!["/b/", "/a/"]);
    assert!(results[0].score >= results[1].score);
}

#[test]
fn title_only_beats_body_only_with_stemming() {
    let config = SearchConfig {
        tokenizer: TokenizerConfig { stemming: Stemming::Enabled, ..Default::default() },
        ..Default::default()
    };
    let (engine, _) = engine_for(&corpus(), &config);
    let results = engine.search("Installations");
    assert_eq!(results[0].reference, "/b/");
    assert_eq!(results.len(), 2);
}

#[test]
fn empty_and_whitespace_queries_return_nothing() {
    let (engine, _) = engine_for(&corpus(), &SearchConfig::default());
    assert!(engine.search("").is_empty());
    assert!(engine.search("   \t\n").is_empty());
}

#[test]
fn special_characters_never_panic() {
    let (engine, store) = engine_for(&corpus(), &SearchConfig::default());
    let renderer = Renderer::new(Default::default(), engine.tokenizer().clone());
    for q in ["\"", "*", "install*", "title:", ":", "+", "-", "~1", "^10", "(", "[a-", "\\", "'\"<>&", "foo:bar:baz"] {
        let results = engine.search(q);
        let page = renderer.render(&results, &store, q);
        assert!(!page.to_html().contains("<script"));
    }
    assert_eq!(engine.search("install*")[0].reference, "/b/");
}

#[test]
fn serialized_index_answers_like_the_in_memory_one() {
    let config = SearchConfig::default();
    let tokenizer = Tokenizer::new(config.tokenizer.clone());
    let docs = vec![
        Document::new("/a/", "Getting Started", "This guide explains installation steps."),
        Document::new("/b/", "Installation Notes", "Getting started is easy."),
        Document::new("/c/", "全文検索", "静的サイトに全文検索を追加する"),
    ];
    let out = IndexBuilder::new(&tokenizer, &config).build(&docs);

    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_artifacts(&paths, &out.index, &out.store).unwrap();
    let (index, store) = load_artifacts(&paths).unwrap();
    assert_eq!(index, out.index);
    assert_eq!(store, out.store);

    let tokenizer = Arc::new(tokenizer);
    let direct = QueryEngine::new(Arc::new(out.index), tokenizer.clone(), MatchWeights::default());
    let loaded = QueryEngine::new(Arc::new(index), tokenizer, MatchWeights::default());
    for q in ["installation", "getting started", "検索", "静", "+guide", "title:notes"] {
        assert_eq!(direct.search(q), loaded.search(q), "query {q:?}");
    }
}

#[test]
fn session_loads_from_disk_and_reports_failures() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());

    let broken = SearchSession::new(SearchConfig::default());
    assert_eq!(broken.load(&paths).unwrap(), SessionState::Failed);
    assert!(matches!(broken.search("installation"), RenderedPage::Unavailable { .. }));

    let config = SearchConfig::default();
    let tokenizer = Tokenizer::new(config.tokenizer.clone());
    let out = IndexBuilder::new(&tokenizer, &config).build(&corpus());
    save_artifacts(&paths, &out.index, &out.store).unwrap();

    let session = SearchSession::new(config);
    assert_eq!(session.load(&paths).unwrap(), SessionState::Ready);
    match session.outcome("installation") {
        SearchOutcome::Results(r) => assert_eq!(r.len(), 2),
        SearchOutcome::Unavailable => panic!("expected results"),
    }
    let html = session.search("installation").to_html();
    assert!(html.contains("<mark class=\"bg-yellow-200 rounded-sm px-1\">Installation</mark> Notes"));
}

#[test]
fn partial_artifacts_disable_search() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let config = SearchConfig::default();
    let tokenizer = Tokenizer::new(config.tokenizer.clone());
    let out = IndexBuilder::new(&tokenizer, &config).build(&corpus());
    sitesearch_core::persist::save_index(&paths, &out.index).unwrap();

    let session = SearchSession::new(config);
    assert_eq!(session.load(&paths).unwrap(), SessionState::Failed);
    assert!(!session.input_enabled());
}

fn arb_docs() -> impl Strategy<Value = Vec<Document>> {
    let word = prop::sample::select(vec![
        "rust", "search", "index", "検索", "全文", "サイト", "の", "install", "notes", "", "を",
    ]);
    let text = prop::collection::vec(word, 0..8).prop_map(|w| w.join(" "));
    prop::collection::vec((text.clone(), text), 0..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (title, body))| Document::new(format!("/p{i}/"), title, body))
            .collect()
    })
}

proptest! {
    #[test]
    fn tokenizing_twice_is_identical(text in "\\PC{0,64}") {
        let t = Tokenizer::default();
        prop_assert_eq!(t.tokenize(text.as_str()), t.tokenize(text.as_str()));
    }

    #[test]
    fn every_indexed_doc_has_a_store_entry(docs in arb_docs()) {
        let tokenizer = Tokenizer::default();
        let out = IndexBuilder::new(&tokenizer, &SearchConfig::default()).build(&docs);
        for r in &out.index.refs {
            prop_assert!(out.store.contains_key(r));
        }
        for entry in out.index.terms.values() {
            for posting in entry.fields.values().flatten() {
                prop_assert!((posting.doc as usize) < out.index.refs.len());
            }
        }
        prop_assert_eq!(out.index.refs.len() + out.skipped.len(), docs.len());
    }

    #[test]
    fn arbitrary_queries_never_panic(q in "\\PC{0,32}") {
        let (engine, store) = engine_for(&corpus(), &SearchConfig::default());
        let results = engine.search(&q);
        let renderer = Renderer::new(Default::default(), engine.tokenizer().clone());
        let _ = renderer.render(&results, &store, &q).to_html();
    }
}
