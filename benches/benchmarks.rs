use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geoipdb::countries;
use geoipdb::variant::{CountryRow, CITY_SCHEMA, COUNTRY_SCHEMA};
use geoipdb::{CityRecord, Charset};
use std::hint::black_box;

// A record with every string field populated
fn sample_city() -> CityRecord {
    CityRecord {
        country_code: "GB".into(),
        country_code3: "GBR".into(),
        country_name: "United Kingdom".into(),
        region: "ENG".into(),
        city: "London".into(),
        postal_code: "EC1A".into(),
        latitude: 51.5142,
        longitude: -0.0931,
        metro_code: 0,
        dma_code: 0,
        area_code: 0,
        charset: Charset::Utf8,
        continent_code: "EU".into(),
    }
}

fn bench_country_codes(c: &mut Criterion) {
    let codes: Vec<&str> = (1..countries::len() as u32)
        .filter_map(countries::by_id)
        .map(|country| country.code)
        .collect();

    let mut group = c.benchmark_group("country_codes");
    group.throughput(Throughput::Elements(codes.len() as u64));
    group.bench_function("id_by_code", |b| {
        b.iter(|| {
            for code in &codes {
                black_box(countries::id_by_code(black_box(code)));
            }
        })
    });
    group.finish();
}

fn bench_country_projection(c: &mut Criterion) {
    let row = CountryRow::from_id(225).unwrap();
    let requests: [&[&str]; 3] = [&[], &["code"], &["name", "code", "continent", "code3"]];

    let mut group = c.benchmark_group("country_projection");
    for fields in requests {
        group.bench_with_input(
            BenchmarkId::from_parameter(fields.len()),
            &fields,
            |b, fields| {
                let selection = COUNTRY_SCHEMA.select(*fields).unwrap();
                b.iter(|| black_box(selection.render(black_box(&row))))
            },
        );
    }
    group.finish();
}

fn bench_city_projection(c: &mut Criterion) {
    let record = sample_city();

    let mut group = c.benchmark_group("city_projection");
    group.bench_function("select_and_render_full", |b| {
        b.iter(|| {
            let none: [&str; 0] = [];
            let selection = CITY_SCHEMA.select(&none).unwrap();
            black_box(selection.render(&record))
        })
    });
    group.bench_function("select_and_render_two", |b| {
        b.iter(|| {
            let selection = CITY_SCHEMA.select(&["city", "latitude"]).unwrap();
            black_box(selection.render(&record))
        })
    });
    group.bench_function("to_json", |b| {
        let none: [&str; 0] = [];
        let result = CITY_SCHEMA.select(&none).unwrap().render(&record);
        b.iter(|| black_box(serde_json::to_string(&result).unwrap()))
    });
    group.finish();
}

fn bench_transcode(c: &mut Criterion) {
    let text = "Zürich, Łódź, São Paulo, 東京";

    let mut group = c.benchmark_group("transcode");
    group.throughput(Throughput::Bytes(text.len() as u64));
    for charset in Charset::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(charset),
            &charset,
            |b, charset| b.iter(|| black_box(charset.transcode(black_box(text)))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_country_codes,
    bench_country_projection,
    bench_city_projection,
    bench_transcode
);
criterion_main!(benches);
