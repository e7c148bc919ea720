use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use orgdesk_core::{Column, RecordId, RecordSchema, Row};
use orgdesk_infra::storage::{Filter, InMemoryStore, Storer};
use tokio::runtime::Runtime;

static COLUMNS: [Column; 2] = [
    Column::text("name"),
    Column::uuid("org_uuid"),
];
static TAGS: RecordSchema = RecordSchema::new("tags", &COLUMNS).scoped_by("org_uuid");

fn tag_row(org: RecordId, i: usize) -> Row {
    Row::new()
        .with("uuid", RecordId::new())
        .with("name", format!("tag-{i}"))
        .with("org_uuid", org)
}

/// Store with `per_org` tags under each of `orgs` organizations.
fn seeded(rt: &Runtime, orgs: usize, per_org: usize) -> (InMemoryStore, Vec<RecordId>) {
    let store = InMemoryStore::new();
    let ids: Vec<RecordId> = (0..orgs).map(|_| RecordId::new()).collect();
    rt.block_on(async {
        store.migrate(&[&TAGS]).await.unwrap();
        for org in &ids {
            for i in 0..per_org {
                store.insert(&TAGS, tag_row(*org, i)).await.unwrap();
            }
        }
    });
    (store, ids)
}

fn bench_scoped_list(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("scoped_list");

    for per_org in [10, 100, 1000].iter() {
        let (store, orgs) = seeded(&rt, 10, *per_org);
        let filter = Filter::scoped("org_uuid", orgs[0]);

        group.throughput(Throughput::Elements(*per_org as u64));
        group.bench_with_input(BenchmarkId::new("find_all", per_org), per_org, |b, _| {
            b.iter(|| black_box(rt.block_on(store.find_all(&TAGS, &filter)).unwrap()));
        });
    }

    group.finish();
}

fn bench_keyed_get(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (store, orgs) = seeded(&rt, 10, 1000);
    let target = rt
        .block_on(store.find_all(&TAGS, &Filter::scoped("org_uuid", orgs[5])))
        .unwrap()
        .pop()
        .and_then(|row| row.opt_record_id("uuid").ok().flatten())
        .unwrap();
    let filter = Filter::scoped("org_uuid", orgs[5]).eq("uuid", target.to_string());

    c.bench_function("keyed_get/find_first", |b| {
        b.iter(|| black_box(rt.block_on(store.find_first(&TAGS, &filter)).unwrap()));
    });
}

fn bench_filter_resolve(c: &mut Criterion) {
    let filter = Filter::from_query([("name", "tag-1"), ("uuid", "not-a-uuid")])
        .scoped_to("org_uuid", RecordId::new());

    c.bench_function("filter/resolve", |b| {
        b.iter(|| black_box(filter.resolve(black_box(&TAGS)).unwrap()));
    });
}

criterion_group!(benches, bench_scoped_list, bench_keyed_get, bench_filter_resolve);
criterion_main!(benches);
