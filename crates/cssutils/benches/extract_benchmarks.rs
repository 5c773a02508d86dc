use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cssutils::{Dialect, extract_all_selectors, extract_all_selectors_with_dialect, find_matching_rules};

fn stylesheet(rules: usize) -> String {
    let mut css = String::from("@charset \"UTF-8\";\n@import url(\"base.css\");\n");
    for i in 0..rules {
        if i % 10 == 0 {
            css.push_str(&format!("/* section {} */\n", i / 10));
        }
        if i % 25 == 0 {
            css.push_str("@media screen and (min-width: 600px) {\n");
            css.push_str(&format!("  .wide-{i} > li:hover {{ margin: 0 auto; }}\n}}\n"));
        }
        css.push_str(&format!(
            "div.item-{i},\n#id-{i} a[href^=\"http\"]::after {{\n  color: #{:06x};\n  content: \"}}\";\n}}\n",
            i * 97 % 0xffffff
        ));
    }
    css
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_all_selectors");

    for rules in [10, 100, 1000] {
        let css = stylesheet(rules);
        group.throughput(Throughput::Bytes(css.len() as u64));
        group.bench_with_input(BenchmarkId::new("css", rules), &css, |b, css| {
            b.iter(|| extract_all_selectors(black_box(css)))
        });
    }

    group.finish();
}

fn bench_extract_less(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_less");

    let mut less = String::from("@base: #333;\n// generated\n");
    less.push_str(&stylesheet(100));

    group.bench_function("less_100", |b| {
        b.iter(|| extract_all_selectors_with_dialect(black_box(&less), Dialect::Less))
    });

    group.finish();
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_matching_rules");

    let records = extract_all_selectors(&stylesheet(1000));
    for query in ["div", ".item-500", "#id-999", "li"] {
        group.bench_with_input(BenchmarkId::new("query", query), &query, |b, query| {
            b.iter(|| find_matching_rules(black_box(query), &records))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract, bench_extract_less, bench_match);
criterion_main!(benches);
