use criterion::{criterion_group, criterion_main, Criterion};
use sitesearch_core::tokenizer::Tokenizer;

const TEXT: &str = "静的サイトジェネレーターで生成したページに全文検索を追加する方法について説明します。\
ビルド時にすべてのHTMLファイルからタイトルと本文を抽出し、転置インデックスを作成します。\
Search runs entirely in the browser once the index has been fetched.";

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::default();
    c.bench_function("tokenize_mixed_page", |b| b.iter(|| tokenizer.tokenize(TEXT)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
