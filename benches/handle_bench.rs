use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loadstone::io::ByteFetch;
use loadstone::prelude::*;

use std::path::{Path, PathBuf};

struct EmptyIo;

impl AssetIo for EmptyIo {
    fn load_path(&self, _path: &Path) -> ByteFetch {
        Box::new(|| Ok(Vec::new()))
    }

    fn root_path(&self) -> PathBuf {
        PathBuf::new()
    }
}

struct UnitLoader;

impl AssetLoader for UnitLoader {
    fn extensions(&self) -> &[&str] {
        &["bin"]
    }

    fn load(&self, _path: &Path, bytes: &[u8]) -> Option<LoadedAsset> {
        Some(LoadedAsset::new(bytes.to_vec()))
    }
}

fn bench_path_id_hash(c: &mut Criterion) {
    let path = Path::new("textures/environment/skybox/cloudy_noon.png");
    c.bench_function("handle_id_from_path", |b| {
        b.iter(|| HandleId::from_path(black_box(path)));
    });
}

fn bench_coalesced_admission(c: &mut Criterion) {
    let server = AssetServer::new(EmptyIo, TaskPool::new());
    server.add_asset_loader(UnitLoader);
    let _assets: Assets<Vec<u8>> = server.register_asset_type();

    // First call claims and loads; every iteration after hits the
    // coalescing fast path.
    server.load_sync("blob.bin").unwrap();

    c.bench_function("load_sync_coalesced", |b| {
        b.iter(|| server.load_sync(black_box("blob.bin")).unwrap());
    });
}

fn bench_ref_count_drain(c: &mut Criterion) {
    let server = AssetServer::new(EmptyIo, TaskPool::new());
    let mut assets: Assets<Vec<u8>> = server.register_asset_type();

    c.bench_function("ref_count_tick_100_handles", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..100)
                .map(|_| assets.get_handle(HandleId::random::<Vec<u8>>()))
                .collect();
            drop(handles);
            server.update_asset_ref_count();
            server.update_assets(&mut assets);
        });
    });
}

criterion_group!(
    benches,
    bench_path_id_hash,
    bench_coalesced_admission,
    bench_ref_count_drain
);
criterion_main!(benches);
